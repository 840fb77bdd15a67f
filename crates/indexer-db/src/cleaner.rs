use sqlx::PgPool;

use crate::error::{CleanError, GatewayError};

/// The data kinds a resync can scope a clear to. Per spec's open question,
/// only `Full` is implemented; the rest are accepted at the config layer
/// but refused here rather than silently downgraded to `Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Full,
    Headers,
    Transactions,
    Receipts,
    State,
    Storage,
}

/// A closed, inclusive block-number range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub stop: i64,
}

/// Used only by the Resync Coordinator: resets validation counters and
/// clears prior data ahead of a re-index pass.
pub struct Cleaner {
    pool: PgPool,
}

impl Cleaner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sets `times_validated := 0` on every header in `range`, forcing
    /// re-validation on the next index.
    pub async fn reset_validation(&self, range: Range) -> Result<(), GatewayError> {
        sqlx::query(
            "UPDATE eth.header_cids SET times_validated = 0 WHERE block_number BETWEEN $1 AND $2",
        )
        .bind(range.start)
        .bind(range.stop)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the rows of `kind` scoped to `range`. `Full` deletes headers
    /// (and, via `ON DELETE CASCADE`, everything that FK-references them);
    /// the raw-bytes table is untouched since it's shared and append-only.
    pub async fn clean(&self, range: Range, kind: DataKind) -> Result<(), CleanError> {
        match kind {
            DataKind::Full => {
                sqlx::query("DELETE FROM eth.header_cids WHERE block_number BETWEEN $1 AND $2")
                    .bind(range.start)
                    .bind(range.stop)
                    .execute(&self.pool)
                    .await
                    .map_err(GatewayError::from)?;
                Ok(())
            }
            other => Err(CleanError::UnsupportedKind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_full_is_a_supported_kind() {
        assert_eq!(DataKind::Full, DataKind::Full);
        assert_ne!(DataKind::Full, DataKind::Headers);
    }
}
