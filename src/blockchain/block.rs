use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::pow::ProofOfWork;
use crate::error::{Error, Result};

/// Block identity fixed before mining: everything except `nonce` and `hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsealedBlock {
    pub height: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub parent_hash: Vec<u8>,
    pub payload: Vec<u8>,
}

impl UnsealedBlock {
    /// Build an unsealed block. Height is not checked against the parent.
    pub fn new(height: u64, parent_hash: Vec<u8>, payload: Vec<u8>, timestamp: i64) -> Self {
        Self {
            height,
            timestamp,
            parent_hash,
            payload,
        }
    }

    /// Same as [`UnsealedBlock::new`], stamped with the current time.
    pub fn now(height: u64, parent_hash: Vec<u8>, payload: Vec<u8>) -> Self {
        Self::new(height, parent_hash, payload, Utc::now().timestamp())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(self.height, self.timestamp, &self.parent_hash, &self.payload)
    }

    pub fn content_hash(&self) -> [u8; 32] {
        Sha256::digest(self.canonical_bytes()).into()
    }
}

/// Concatenates `height || timestamp || parent_hash || payload` with both
/// integers as 8 big-endian bytes and no separators.
fn canonical_bytes(height: u64, timestamp: i64, parent_hash: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(16 + parent_hash.len() + payload.len());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&timestamp.to_be_bytes());
    bytes.extend_from_slice(parent_hash);
    bytes.extend_from_slice(payload);
    bytes
}

/// A sealed block in the chain.
///
/// `hash` is the winning proof-of-work digest, which covers the nonce. The
/// nonce-free digest of the identity fields is available as
/// [`Block::content_hash`]. Fields are read-only once sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    height: u64,
    timestamp: i64,
    nonce: u64,
    #[serde(with = "hex::serde")]
    parent_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    hash: [u8; 32],
    #[serde(with = "hex::serde")]
    payload: Vec<u8>,
}

impl Block {
    /// Create and seal the genesis block (height 0, empty parent hash).
    pub fn genesis(payload: impl AsRef<[u8]>, pow: &ProofOfWork) -> Self {
        Self::new(0, Vec::new(), payload.as_ref().to_vec(), pow)
    }

    /// Create a block stamped with the current time and mine it.
    /// Blocks until a nonce meeting the engine's target is found.
    pub fn new(height: u64, parent_hash: Vec<u8>, payload: Vec<u8>, pow: &ProofOfWork) -> Self {
        pow.seal(UnsealedBlock::now(height, parent_hash, payload))
    }

    pub(crate) fn from_sealed(block: UnsealedBlock, nonce: u64, hash: [u8; 32]) -> Self {
        Self {
            height: block.height,
            timestamp: block.timestamp,
            nonce,
            parent_hash: block.parent_hash,
            hash,
            payload: block.payload,
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn parent_hash(&self) -> &[u8] {
        &self.parent_hash
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.parent_hash.is_empty()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(self.height, self.timestamp, &self.parent_hash, &self.payload)
    }

    /// SHA-256 of the canonical bytes. Does not depend on the nonce.
    pub fn content_hash(&self) -> [u8; 32] {
        Sha256::digest(self.canonical_bytes()).into()
    }

    /// Encode every field (hashes and payload as hex) for storage or transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::Encode)
    }

    /// Decode a block produced by [`Block::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Error::Decode)
    }
}
