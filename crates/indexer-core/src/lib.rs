//! The indexing pipeline: decode-and-store transform, worker pool,
//! live subscriber, and the gap-driven backfill and resync coordinators.

pub mod backfill;
pub mod error;
pub mod live;
pub mod resync;
pub mod reward;
pub mod ring;
pub mod transformer;
pub mod trie;
pub mod worker;

pub use backfill::{BackfillCoordinator, BackfillConfig};
pub use error::{BackfillError, ResyncError, TransformError};
pub use resync::{ResyncCoordinator, ResyncConfig};
pub use transformer::transform;
pub use worker::{Batch, Dispatcher, WorkerPool};
