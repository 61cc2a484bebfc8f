pub mod block;
pub mod model;
pub mod pow;

pub use block::{Block, UnsealedBlock};
pub use model::Blockchain;
pub use pow::{Candidate, NonceSearch, ProofOfWork, Target};

/// Default Proof-of-Work difficulty (number of leading zero bits).
pub const DEFAULT_DIFFICULTY_BITS: u32 = 16;

/// Payload sealed into the genesis block when the caller has none.
pub const GENESIS_PAYLOAD: &str = "genesis";
