use std::env;

use pow_blockchain::blockchain::GENESIS_PAYLOAD;
use pow_blockchain::{Blockchain, MiningConfig};

fn main() -> pow_blockchain::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let mut config = MiningConfig::default();
    if let Some(bits) = env::var("DIFFICULTY_BITS").ok().and_then(|v| v.parse().ok()) {
        config.difficulty_bits = bits;
    }
    config.max_attempts = env::var("MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok());

    println!("⛓️ Mining a demo chain at {} bits", config.difficulty_bits);

    let mut chain = Blockchain::new(&config, GENESIS_PAYLOAD)?;
    for payload in ["alice -> bob: 1", "bob -> carol: 2"] {
        chain.mine_block(payload.as_bytes().to_vec())?;
    }

    for block in chain.iter() {
        println!(
            "#{} nonce={} parent={} hash={} payload={:?}",
            block.height(),
            block.nonce(),
            hex::encode(block.parent_hash()),
            hex::encode(block.hash()),
            String::from_utf8_lossy(block.payload()),
        );
    }
    println!("valid: {}", chain.is_valid_chain());
    Ok(())
}
