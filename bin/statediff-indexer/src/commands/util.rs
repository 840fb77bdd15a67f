//! `util` — peripheral helper, out of the core indexing path: fetches
//! block and receipt RLP for a height range and writes each pair to files
//! named by height.

use std::path::Path;

use indexer_config::Config;
use indexer_rpc::{fetcher::MIN_TIMEOUT, Fetcher};

const CHUNK_SIZE: usize = 100;

pub async fn run(config: &Config, start: u64, end: u64, out_dir: &Path) -> eyre::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let fetcher = Fetcher::connect(&config.ethereum.http_path, MIN_TIMEOUT)?;

    let heights: Vec<u64> = (start..=end).collect();
    for chunk in heights.chunks(CHUNK_SIZE) {
        let payloads = fetcher.fetch_batch(chunk).await?;
        for (height, payload) in chunk.iter().zip(payloads) {
            std::fs::write(out_dir.join(format!("{height}.block.rlp")), payload.block_rlp.as_ref())?;
            std::fs::write(out_dir.join(format!("{height}.receipts.rlp")), payload.receipts_rlp.as_ref())?;
        }
        tracing::info!(from = chunk[0], to = chunk[chunk.len() - 1], "util: wrote chunk");
    }

    Ok(())
}
