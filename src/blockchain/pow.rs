//! Proof-of-work engine.
//!
//! Sealing searches nonces from 0 upward for one whose digest
//! `SHA-256(canonical_bytes || difficulty_bits || nonce)` (both integers as
//! 8 big-endian bytes), read as a 256-bit big-endian integer, is below
//! `2^(256 - difficulty_bits)`. That digest becomes the block's `hash`.

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use super::block::{Block, UnsealedBlock};
use crate::config::MiningConfig;
use crate::error::{Error, Result};

/// Difficulty target expressed as a number of leading zero bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    bits: u32,
}

impl Target {
    pub const MAX_BITS: u32 = 256;

    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits > Self::MAX_BITS {
            return Err(Error::InvalidDifficulty(bits));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// `digest < 2^(256 - bits)`, which holds exactly when the digest
    /// starts with at least `bits` zero bits.
    pub fn is_met_by(&self, digest: &[u8; 32]) -> bool {
        leading_zero_bits(digest) >= self.bits
    }
}

/// Number of leading zero bits of a big-endian byte string.
pub fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut zeros = 0;
    for byte in bytes {
        if *byte != 0 {
            return zeros + byte.leading_zeros();
        }
        zeros += 8;
    }
    zeros
}

/// One tried nonce and the digest it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub nonce: u64,
    pub digest: [u8; 32],
}

/// Lazy, endless stream of candidates for one block, starting at nonce 0.
///
/// Dropping the iterator is the only way to stop a search early.
#[derive(Clone, Debug)]
pub struct NonceSearch {
    prefix: Sha256,
    next_nonce: u64,
}

impl NonceSearch {
    fn new(block_bytes: &[u8], target: Target) -> Self {
        let mut prefix = Sha256::new();
        prefix.update(block_bytes);
        prefix.update(u64::from(target.bits).to_be_bytes());
        Self {
            prefix,
            next_nonce: 0,
        }
    }

    /// Hash the next nonce. Never runs dry; wraps after `u64::MAX`.
    pub fn next_candidate(&mut self) -> Candidate {
        let nonce = self.next_nonce;
        self.next_nonce = nonce.wrapping_add(1);

        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_be_bytes());
        Candidate {
            nonce,
            digest: hasher.finalize().into(),
        }
    }
}

impl Iterator for NonceSearch {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        Some(self.next_candidate())
    }
}

/// Digest for a single nonce, as computed during the search.
pub fn search_digest(block_bytes: &[u8], target: Target, nonce: u64) -> [u8; 32] {
    NonceSearch {
        next_nonce: nonce,
        ..NonceSearch::new(block_bytes, target)
    }
    .next_candidate()
    .digest
}

/// Seals blocks against a fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    target: Target,
}

impl ProofOfWork {
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    pub fn from_config(config: &MiningConfig) -> Result<Self> {
        Ok(Self::new(Target::from_bits(config.difficulty_bits)?))
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Candidate stream for `block`; callers may consume it with their own stop rule.
    pub fn search(&self, block: &UnsealedBlock) -> NonceSearch {
        NonceSearch::new(&block.canonical_bytes(), self.target)
    }

    /// Search until a candidate meets the target. Returns `(hash, nonce)`.
    pub fn run(&self, block: &UnsealedBlock) -> ([u8; 32], u64) {
        debug!(
            "mining block #{} (target {} bits)",
            block.height, self.target.bits
        );
        let mut search = self.search(block);
        loop {
            let candidate = search.next_candidate();
            if self.target.is_met_by(&candidate.digest) {
                return (candidate.digest, candidate.nonce);
            }
        }
    }

    /// Like [`ProofOfWork::run`], giving up after `max_attempts` nonces.
    pub fn run_bounded(&self, block: &UnsealedBlock, max_attempts: u64) -> Result<([u8; 32], u64)> {
        debug!(
            "mining block #{} (target {} bits, at most {} attempts)",
            block.height, self.target.bits, max_attempts
        );
        let mut search = self.search(block);
        for _ in 0..max_attempts {
            let candidate = search.next_candidate();
            if self.target.is_met_by(&candidate.digest) {
                return Ok((candidate.digest, candidate.nonce));
            }
        }
        warn!(
            "gave up on block #{} after {} attempts",
            block.height, max_attempts
        );
        Err(Error::Exhausted {
            attempts: max_attempts,
        })
    }

    pub fn seal(&self, block: UnsealedBlock) -> Block {
        let (hash, nonce) = self.run(&block);
        Self::finish(block, hash, nonce)
    }

    pub fn seal_bounded(&self, block: UnsealedBlock, max_attempts: u64) -> Result<Block> {
        let (hash, nonce) = self.run_bounded(&block, max_attempts)?;
        Ok(Self::finish(block, hash, nonce))
    }

    fn finish(block: UnsealedBlock, hash: [u8; 32], nonce: u64) -> Block {
        info!(
            "sealed block #{} nonce={} hash={}",
            block.height,
            nonce,
            hex::encode(hash)
        );
        Block::from_sealed(block, nonce, hash)
    }

    /// Recompute the digest from the stored nonce and identity fields; it
    /// must equal the stored hash and meet the target.
    /// (Does NOT validate chain linkage.)
    pub fn validate(&self, block: &Block) -> bool {
        let digest = search_digest(&block.canonical_bytes(), self.target, block.nonce());
        block.hash() == digest.as_slice() && self.target.is_met_by(&digest)
    }
}
