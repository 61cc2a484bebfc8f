//! Mining parameters passed explicitly into the proof-of-work engine.

use serde::{Deserialize, Serialize};

use crate::blockchain::DEFAULT_DIFFICULTY_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Required number of leading zero bits in the sealing digest.
    #[serde(default = "default_difficulty_bits")]
    pub difficulty_bits: u32,
    /// Upper bound on nonces tried per block. `None` searches until a match.
    #[serde(default)]
    pub max_attempts: Option<u64>,
}

impl MiningConfig {
    pub fn with_difficulty(difficulty_bits: u32) -> Self {
        Self {
            difficulty_bits,
            ..Self::default()
        }
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            max_attempts: None,
        }
    }
}

fn default_difficulty_bits() -> u32 {
    DEFAULT_DIFFICULTY_BITS
}
