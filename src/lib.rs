//! Single-node proof-of-work block sealing.
//!
//! [`UnsealedBlock`] fixes a block's identity, [`ProofOfWork`] searches for a
//! nonce meeting a [`Target`] and returns a sealed, immutable [`Block`].
//! [`Blockchain`] is a small in-memory chain built on top of those pieces.

pub mod blockchain;
pub mod config;
pub mod error;

pub use blockchain::{Block, Blockchain, ProofOfWork, Target, UnsealedBlock};
pub use config::MiningConfig;
pub use error::{Error, Result};
