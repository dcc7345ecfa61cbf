//! Synchronization core: plan what to transfer, then drive the transfer.

pub mod engine;
pub mod planner;

pub use engine::{SyncEngine, SyncReport, SyncStatus};
pub use planner::plan;
