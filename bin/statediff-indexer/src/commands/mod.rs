pub mod backfill;
pub mod resync;
pub mod sync;
pub mod util;

use std::time::Duration;

use indexer_config::{DatabaseConfig, DatabasePoolOverride};
use indexer_db::{rows::NodeInfoRow, PoolConfig};
use indexer_rpc::NodeInfo;

pub(crate) fn database_url(database: &DatabaseConfig) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}",
        database.user, database.password, database.hostname, database.port, database.name
    )
}

pub(crate) fn pool_config(database: &DatabaseConfig, over: &DatabasePoolOverride) -> PoolConfig {
    PoolConfig {
        max_connections: over.max_open.unwrap_or(database.max_open),
        min_connections: over.max_idle.unwrap_or(database.max_idle),
        max_lifetime: Duration::from_secs(over.max_lifetime.unwrap_or(database.max_lifetime)),
    }
}

pub(crate) fn node_info_row(node_info: NodeInfo) -> NodeInfoRow {
    NodeInfoRow {
        genesis_block: node_info.genesis_block,
        network_id: node_info.network_id,
        node_id: node_info.node_id,
        client_name: node_info.client_name,
        chain_id: node_info.chain_id as i64,
    }
}
