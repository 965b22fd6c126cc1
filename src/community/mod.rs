//! Community Scan
//!
//! Aggregates published pet artifacts across a repository's fork network.

pub mod aggregator;
pub mod snapshot;
pub mod types;

pub use aggregator::{ForkNetworkAggregator, ScanSettings};
pub use snapshot::SnapshotSource;
pub use types::*;
