use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use indexer_metrics::Metrics;

use crate::{
    error::GatewayError,
    rows::{
        HeaderRow, NodeInfoRow, ReceiptRow, StateAccountRow, StateNodeRow, StorageNodeRow,
        TransactionRow, UncleRow,
    },
};

/// Per-mode pool sizing, per §6 `database.{sync|backfill|resync|server}`.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_connections: 10, min_connections: 0, max_lifetime: Duration::from_secs(1800) }
    }
}

/// The transactional unit of work over the relational store. Holds the
/// shared connection pool and the node-info row id, written once at
/// startup and read-only thereafter.
pub struct Gateway {
    pool: PgPool,
    node_id: i32,
    metrics: Metrics,
}

impl Gateway {
    pub async fn connect(database_url: &str, config: PoolConfig) -> Result<PgPool, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections = config.max_connections, "connected to postgres");
        Ok(pool)
    }

    /// Upserts the node-info row and caches its id. Must be called exactly
    /// once at startup before any other gateway method.
    pub async fn ensure_node_info(
        pool: PgPool,
        node: NodeInfoRow,
        metrics: Metrics,
    ) -> Result<Self, GatewayError> {
        let row = sqlx::query(
            r#"
            INSERT INTO public.nodes (genesis_block, network_id, node_id, client_name, chain_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (genesis_block, network_id, node_id, chain_id)
            DO UPDATE SET client_name = EXCLUDED.client_name
            RETURNING id
            "#,
        )
        .bind(&node.genesis_block)
        .bind(&node.network_id)
        .bind(&node.node_id)
        .bind(&node.client_name)
        .bind(node.chain_id)
        .fetch_one(&pool)
        .await?;

        let node_id: i32 = row.try_get("id")?;
        Ok(Self { pool, node_id, metrics })
    }

    pub fn node_id(&self) -> i32 {
        self.node_id
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, GatewayError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert-or-ignore into the raw-bytes table. Safe to call repeatedly
    /// for the same key; the first insertion wins.
    pub async fn publish_bytes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mh_key: &str,
        bytes: &[u8],
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO public.blocks (key, data) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(mh_key)
        .bind(bytes)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Conflict on `(block_number, block_hash)`; updates every field except
    /// `times_validated`, which increments by one. Initial insert sets it
    /// to 1.
    pub async fn upsert_header(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        header: &HeaderRow,
    ) -> Result<i32, GatewayError> {
        let row = sqlx::query(
            r#"
            INSERT INTO eth.header_cids
                (block_number, block_hash, parent_hash, cid, mh_key, total_difficulty, reward,
                 state_root, tx_root, receipt_root, uncle_root, bloom, timestamp, times_validated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 1)
            ON CONFLICT (block_number, block_hash) DO UPDATE SET
                parent_hash = EXCLUDED.parent_hash,
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                total_difficulty = EXCLUDED.total_difficulty,
                reward = EXCLUDED.reward,
                state_root = EXCLUDED.state_root,
                tx_root = EXCLUDED.tx_root,
                receipt_root = EXCLUDED.receipt_root,
                uncle_root = EXCLUDED.uncle_root,
                bloom = EXCLUDED.bloom,
                timestamp = EXCLUDED.timestamp,
                times_validated = eth.header_cids.times_validated + 1
            RETURNING id
            "#,
        )
        .bind(header.block_number)
        .bind(&header.block_hash)
        .bind(&header.parent_hash)
        .bind(&header.cid)
        .bind(&header.mh_key)
        .bind(&header.total_difficulty)
        .bind(&header.reward)
        .bind(&header.state_root)
        .bind(&header.tx_root)
        .bind(&header.receipt_root)
        .bind(&header.uncle_root)
        .bind(&header.bloom)
        .bind(&header.timestamp)
        .fetch_one(&mut **tx)
        .await?;

        self.metrics.blocks.increment(1);
        Ok(row.try_get("id")?)
    }

    pub async fn upsert_uncle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uncle: &UncleRow,
        header_id: i32,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO eth.uncle_cids (header_id, block_hash, parent_hash, cid, mh_key, reward)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (header_id, block_hash) DO UPDATE SET
                parent_hash = EXCLUDED.parent_hash,
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                reward = EXCLUDED.reward
            "#,
        )
        .bind(header_id)
        .bind(&uncle.block_hash)
        .bind(&uncle.parent_hash)
        .bind(&uncle.cid)
        .bind(&uncle.mh_key)
        .bind(&uncle.reward)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn upsert_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &TransactionRow,
        header_id: i32,
    ) -> Result<i32, GatewayError> {
        let row = sqlx::query(
            r#"
            INSERT INTO eth.transaction_cids
                (header_id, tx_hash, index, src, dst, cid, mh_key, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (header_id, tx_hash) DO UPDATE SET
                index = EXCLUDED.index,
                src = EXCLUDED.src,
                dst = EXCLUDED.dst,
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                data = EXCLUDED.data
            RETURNING id
            "#,
        )
        .bind(header_id)
        .bind(&transaction.tx_hash)
        .bind(transaction.index)
        .bind(&transaction.src)
        .bind(&transaction.dst)
        .bind(&transaction.cid)
        .bind(&transaction.mh_key)
        .bind(&transaction.data)
        .fetch_one(&mut **tx)
        .await?;

        self.metrics.transactions.increment(1);
        Ok(row.try_get("id")?)
    }

    pub async fn upsert_receipt(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        receipt: &ReceiptRow,
        tx_id: i32,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO eth.receipt_cids
                (tx_id, cid, mh_key, contract, contract_hash,
                 topic0s, topic1s, topic2s, topic3s, log_contracts,
                 post_state, post_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (tx_id) DO UPDATE SET
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                contract = EXCLUDED.contract,
                contract_hash = EXCLUDED.contract_hash,
                topic0s = EXCLUDED.topic0s,
                topic1s = EXCLUDED.topic1s,
                topic2s = EXCLUDED.topic2s,
                topic3s = EXCLUDED.topic3s,
                log_contracts = EXCLUDED.log_contracts,
                post_state = EXCLUDED.post_state,
                post_status = EXCLUDED.post_status
            "#,
        )
        .bind(tx_id)
        .bind(&receipt.cid)
        .bind(&receipt.mh_key)
        .bind(&receipt.contract)
        .bind(&receipt.contract_hash)
        .bind(&receipt.topic0s)
        .bind(&receipt.topic1s)
        .bind(&receipt.topic2s)
        .bind(&receipt.topic3s)
        .bind(&receipt.log_contracts)
        .bind(&receipt.post_state)
        .bind(receipt.post_status)
        .execute(&mut **tx)
        .await?;

        self.metrics.receipts.increment(1);
        Ok(())
    }

    pub async fn upsert_state_node(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        state: &StateNodeRow,
        header_id: i32,
    ) -> Result<i32, GatewayError> {
        let row = sqlx::query(
            r#"
            INSERT INTO eth.state_cids
                (header_id, state_path, cid, mh_key, state_leaf_key, node_type, diff)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (header_id, state_path) DO UPDATE SET
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                state_leaf_key = EXCLUDED.state_leaf_key,
                node_type = EXCLUDED.node_type,
                diff = EXCLUDED.diff
            RETURNING id
            "#,
        )
        .bind(header_id)
        .bind(&state.state_path)
        .bind(&state.cid)
        .bind(&state.mh_key)
        .bind(&state.state_leaf_key)
        .bind(state.node_type)
        .bind(state.diff)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.try_get("id")?)
    }

    pub async fn upsert_state_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: &StateAccountRow,
        state_id: i32,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO eth.state_accounts (state_id, balance, nonce, code_hash, storage_root)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (state_id) DO UPDATE SET
                balance = EXCLUDED.balance,
                nonce = EXCLUDED.nonce,
                code_hash = EXCLUDED.code_hash,
                storage_root = EXCLUDED.storage_root
            "#,
        )
        .bind(state_id)
        .bind(&account.balance)
        .bind(account.nonce)
        .bind(&account.code_hash)
        .bind(&account.storage_root)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn upsert_storage_node(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        storage: &StorageNodeRow,
        state_id: i32,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO eth.storage_cids
                (state_id, storage_path, cid, mh_key, storage_leaf_key, node_type, diff)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (state_id, storage_path) DO UPDATE SET
                cid = EXCLUDED.cid,
                mh_key = EXCLUDED.mh_key,
                storage_leaf_key = EXCLUDED.storage_leaf_key,
                node_type = EXCLUDED.node_type,
                diff = EXCLUDED.diff
            "#,
        )
        .bind(state_id)
        .bind(&storage.storage_path)
        .bind(&storage.cid)
        .bind(&storage.mh_key)
        .bind(&storage.storage_leaf_key)
        .bind(storage.node_type)
        .bind(storage.diff)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Commits the transaction. Callers structure the indexing closure so
    /// this is only ever reached on the `Ok` path; every error path returns
    /// before this, leaving the transaction to be dropped (and rolled back
    /// by sqlx) without an explicit rollback call.
    pub async fn commit(&self, tx: Transaction<'_, Postgres>) -> Result<(), GatewayError> {
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_default_matches_sqlx_conservative_defaults() {
        let config = PoolConfig::default();
        assert!(config.max_connections >= config.min_connections);
    }

    /// Requires a live Postgres reachable at `DATABASE_URL`; run with
    /// `--ignored` once a test database is available.
    #[tokio::test]
    #[ignore]
    async fn header_upsert_increments_times_validated() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = Gateway::connect(&database_url, PoolConfig::default()).await.unwrap();
        let gateway = Gateway::ensure_node_info(
            pool,
            NodeInfoRow {
                genesis_block: "0xabc".into(),
                network_id: "1".into(),
                node_id: "test-node".into(),
                client_name: "test".into(),
                chain_id: 1,
            },
            Metrics::noop(),
        )
        .await
        .unwrap();

        let header = HeaderRow {
            block_number: 1,
            block_hash: "0x1".into(),
            parent_hash: "0x0".into(),
            cid: "cid".into(),
            mh_key: "mh".into(),
            total_difficulty: bigdecimal::BigDecimal::from(0),
            reward: bigdecimal::BigDecimal::from(0),
            state_root: "0x1".into(),
            tx_root: "0x1".into(),
            receipt_root: "0x1".into(),
            uncle_root: "0x1".into(),
            bloom: vec![0; 256],
            timestamp: bigdecimal::BigDecimal::from(0),
        };

        let mut tx = gateway.begin().await.unwrap();
        gateway.publish_bytes(&mut tx, "mh", b"bytes").await.unwrap();
        let id1 = gateway.upsert_header(&mut tx, &header).await.unwrap();
        gateway.commit(tx).await.unwrap();

        let mut tx = gateway.begin().await.unwrap();
        let id2 = gateway.upsert_header(&mut tx, &header).await.unwrap();
        gateway.commit(tx).await.unwrap();

        assert_eq!(id1, id2);
    }
}
