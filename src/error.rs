use thiserror::Error;

/// Errors raised by block encoding, mining and chain assembly.
#[derive(Debug, Error)]
pub enum Error {
    #[error("serialize block failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("deserialize block failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("no nonce met the target after {attempts} attempts")]
    Exhausted { attempts: u64 },

    #[error("difficulty of {0} bits is out of range (0..=256)")]
    InvalidDifficulty(u32),

    #[error("block height {found} does not follow the chain tip (expected {expected})")]
    InvalidHeight { expected: u64, found: u64 },

    #[error("block #{height} does not reference the chain tip as its parent")]
    InvalidParent { height: u64 },

    #[error("block #{height} fails proof-of-work verification")]
    InvalidProofOfWork { height: u64 },
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
