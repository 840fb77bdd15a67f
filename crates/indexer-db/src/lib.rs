//! The persistence gateway: a transactional unit of work over Postgres,
//! idempotent upserts for every entity of the data model, the gap
//! detector's SQL-driven scans, and the resync cleaner.

pub mod cleaner;
pub mod error;
pub mod gap;
pub mod gateway;
pub mod rows;

pub use cleaner::{Cleaner, DataKind, Range};
pub use error::{CleanError, GatewayError};
pub use gap::{DbGap, GapDetector};
pub use gateway::{Gateway, PoolConfig};
