//! The upstream chain RPC contracts of §6: a duplex subscription client for
//! `statediff_stream` and a batched HTTP client for `statediff_stateDiffAt`,
//! plus the node-identifying call.

pub mod error;
pub mod fetcher;
pub mod node_info;
pub mod subscriber;

pub use error::RpcError;
pub use fetcher::Fetcher;
pub use node_info::NodeInfo;
pub use subscriber::{Subscriber, SubscriptionParams};
