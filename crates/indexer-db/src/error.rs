/// Errors the gateway can return. Every variant is a per-payload recoverable
/// condition; `indexer-core` logs and discards the payload rather than
/// retrying in-process.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("data kind {0:?} is not supported for granular clearing")]
    UnsupportedKind(crate::cleaner::DataKind),
}
