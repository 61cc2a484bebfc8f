use log::{info, warn};

use super::{Block, ProofOfWork, UnsealedBlock};
use crate::config::MiningConfig;
use crate::error::{Error, Result};

/// Simple in-memory blockchain with Proof-of-Work.
#[derive(Debug)]
pub struct Blockchain {
    genesis: Block,
    blocks: Vec<Block>,
    pow: ProofOfWork,
    max_attempts: Option<u64>,
}

impl Blockchain {
    /// Initialize a new blockchain by mining a genesis block.
    pub fn new(config: &MiningConfig, genesis_payload: impl AsRef<[u8]>) -> Result<Self> {
        let pow = ProofOfWork::from_config(config)?;
        let unsealed = UnsealedBlock::now(0, Vec::new(), genesis_payload.as_ref().to_vec());
        let genesis = seal(&pow, config.max_attempts, unsealed)?;
        info!("new chain, genesis hash={}", hex::encode(genesis.hash()));
        Ok(Self {
            genesis,
            blocks: Vec::new(),
            pow,
            max_attempts: config.max_attempts,
        })
    }

    /// Resume from an already sealed genesis block (e.g. one read back from storage).
    pub fn from_genesis(config: &MiningConfig, genesis: Block) -> Result<Self> {
        let pow = ProofOfWork::from_config(config)?;
        if genesis.height() != 0 {
            return Err(Error::InvalidHeight {
                expected: 0,
                found: genesis.height(),
            });
        }
        if !genesis.parent_hash().is_empty() {
            return Err(Error::InvalidParent { height: 0 });
        }
        if !pow.validate(&genesis) {
            return Err(Error::InvalidProofOfWork { height: 0 });
        }
        Ok(Self {
            genesis,
            blocks: Vec::new(),
            pow,
            max_attempts: config.max_attempts,
        })
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.blocks.last().unwrap_or(&self.genesis)
    }

    /// Mine and append a new block carrying `payload`.
    pub fn mine_block(&mut self, payload: Vec<u8>) -> Result<&Block> {
        let tip = self.last_block();
        let unsealed = UnsealedBlock::now(tip.height() + 1, tip.hash().to_vec(), payload);
        let block = seal(&self.pow, self.max_attempts, unsealed)?;
        self.blocks.push(block);
        Ok(self.last_block())
    }

    /// Append a block sealed elsewhere after checking height, parent link and PoW.
    pub fn append(&mut self, block: Block) -> Result<()> {
        if let Err(e) = check_successor(&self.pow, self.last_block(), &block) {
            warn!("rejected block #{}: {}", block.height(), e);
            return Err(e);
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Validate the entire chain: genesis shape, linkage, hashes and PoW.
    pub fn is_valid_chain(&self) -> bool {
        if !self.genesis.is_genesis() || !self.pow.validate(&self.genesis) {
            return false;
        }
        let mut prev = &self.genesis;
        for current in &self.blocks {
            if check_successor(&self.pow, prev, current).is_err() {
                return false;
            }
            prev = current;
        }
        true
    }

    pub fn genesis(&self) -> &Block {
        &self.genesis
    }

    /// Blocks from genesis to tip.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.genesis).chain(self.blocks.iter())
    }

    /// Number of blocks including genesis; never zero.
    pub fn len(&self) -> usize {
        self.blocks.len() + 1
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.pow.target().bits()
    }

    pub fn proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }
}

fn seal(pow: &ProofOfWork, max_attempts: Option<u64>, block: UnsealedBlock) -> Result<Block> {
    match max_attempts {
        Some(limit) => pow.seal_bounded(block, limit),
        None => Ok(pow.seal(block)),
    }
}

fn check_successor(pow: &ProofOfWork, prev: &Block, block: &Block) -> Result<()> {
    let expected = prev.height() + 1;
    if block.height() != expected {
        return Err(Error::InvalidHeight {
            expected,
            found: block.height(),
        });
    }
    if block.parent_hash() != prev.hash() {
        return Err(Error::InvalidParent {
            height: block.height(),
        });
    }
    if !pow.validate(block) {
        return Err(Error::InvalidProofOfWork {
            height: block.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Blockchain;
    use crate::blockchain::{Block, GENESIS_PAYLOAD, ProofOfWork, Target};
    use crate::config::MiningConfig;
    use crate::error::Error;

    fn config() -> MiningConfig {
        MiningConfig::with_difficulty(8)
    }

    #[test]
    fn starts_with_genesis() {
        let bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        assert_eq!(bc.len(), 1);
        assert_eq!(bc.last_block(), bc.genesis());
        assert!(bc.genesis().is_genesis());
        assert_eq!(bc.difficulty_bits(), 8);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn mined_blocks_link_to_tip() {
        let mut bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        for i in 0..3 {
            let prev_hash = bc.last_block().hash().to_vec();
            let b = bc.mine_block(format!("tx {i}").into_bytes()).unwrap();
            assert_eq!(b.parent_hash(), prev_hash.as_slice());
        }
        assert_eq!(bc.len(), 4);
        let heights: Vec<u64> = bc.iter().map(Block::height).collect();
        assert_eq!(heights, vec![0, 1, 2, 3]);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn append_accepts_externally_sealed_block() {
        let mut bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        let tip = bc.last_block();
        let b = Block::new(1, tip.hash().to_vec(), b"external".to_vec(), bc.proof_of_work());
        bc.append(b).unwrap();
        assert_eq!(bc.len(), 2);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn append_rejects_wrong_height() {
        let mut bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        let tip_hash = bc.last_block().hash().to_vec();
        let b = Block::new(5, tip_hash, b"skip".to_vec(), bc.proof_of_work());
        let err = bc.append(b).unwrap_err();
        assert!(matches!(err, Error::InvalidHeight { expected: 1, found: 5 }));
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn append_rejects_wrong_parent() {
        let mut bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        let b = Block::new(1, vec![0xee; 32], b"orphan".to_vec(), bc.proof_of_work());
        assert!(matches!(
            bc.append(b),
            Err(Error::InvalidParent { height: 1 })
        ));
    }

    #[test]
    fn append_rejects_block_sealed_at_another_difficulty() {
        let mut bc = Blockchain::new(&config(), GENESIS_PAYLOAD).unwrap();
        let easy = ProofOfWork::new(Target::from_bits(1).unwrap());
        let tip_hash = bc.last_block().hash().to_vec();
        let b = Block::new(1, tip_hash, b"cheap".to_vec(), &easy);
        assert!(matches!(
            bc.append(b),
            Err(Error::InvalidProofOfWork { height: 1 })
        ));
    }

    #[test]
    fn resumes_from_decoded_genesis() {
        let cfg = config();
        let original = Blockchain::new(&cfg, GENESIS_PAYLOAD).unwrap();
        let bytes = original.genesis().to_bytes().unwrap();
        let genesis = Block::from_bytes(&bytes).unwrap();

        let resumed = Blockchain::from_genesis(&cfg, genesis).unwrap();
        assert_eq!(resumed.genesis(), original.genesis());
        assert!(resumed.is_valid_chain());
    }

    #[test]
    fn from_genesis_rejects_non_genesis_block() {
        let cfg = config();
        let pow = ProofOfWork::from_config(&cfg).unwrap();
        let b = Block::new(1, vec![1; 32], b"x".to_vec(), &pow);
        assert!(matches!(
            Blockchain::from_genesis(&cfg, b),
            Err(Error::InvalidHeight { expected: 0, found: 1 })
        ));
    }

    #[test]
    fn bounded_config_surfaces_exhaustion() {
        let cfg = MiningConfig {
            difficulty_bits: 64,
            max_attempts: Some(8),
        };
        assert!(matches!(
            Blockchain::new(&cfg, GENESIS_PAYLOAD),
            Err(Error::Exhausted { attempts: 8 })
        ));
    }
}
