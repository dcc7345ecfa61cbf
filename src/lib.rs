// Library module for archivist
// Re-exports modules for use in integration tests and external crates

pub mod config;
pub mod dest;
pub mod identity;
pub mod limit;
pub mod object_store;
pub mod record;
pub mod source;
pub mod sync;
