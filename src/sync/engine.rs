//! Sync engine: the scan -> diff -> transfer run driver.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::RunMode;
use crate::dest::MediaDestination;
use crate::record::MediaRecord;
use crate::source::MediaSource;
use crate::sync::planner;

/// Where a run currently stands.
///
/// `Idle -> Scanning -> Diffing -> (Halted | Transferring) -> Done`. A run
/// that fails is simply re-invoked from `Idle`; re-scanning and re-diffing
/// are idempotent because identity is content-hash based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Scanning,
    Diffing,
    /// A dry mode stopped the run before any bytes moved.
    Halted,
    Transferring,
    Done,
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub status: SyncStatus,
    /// Records found at the source.
    pub source_records: usize,
    /// Records already present at the destination.
    pub destination_records: usize,
    /// Records the destination lacked.
    pub planned: usize,
    /// Transfers completed (saves invoked, including write-time no-ops).
    pub transferred: usize,
}

/// Drives one end-to-end run: scan source and destination, plan, transfer.
///
/// Transfers are strictly sequential, in plan order, so the destination's
/// index update from one save is visible before the next save's existence
/// check. There is no retry and no resumption point across runs.
pub struct SyncEngine {
    source: Box<dyn MediaSource>,
    dest: Box<dyn MediaDestination>,
    mode: RunMode,
    status: SyncStatus,
}

impl SyncEngine {
    pub fn new(
        source: Box<dyn MediaSource>,
        dest: Box<dyn MediaDestination>,
        mode: RunMode,
    ) -> Self {
        Self { source, dest, mode, status: SyncStatus::Idle }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub async fn run(&mut self) -> Result<SyncReport> {
        if self.mode == RunMode::UltraDry {
            // Configuration wiring is validated; stop with zero I/O against
            // real storage, before either side is enumerated.
            info!("ultra-dry run, halting before scan");
            self.status = SyncStatus::Halted;
            return Ok(SyncReport {
                status: self.status,
                source_records: 0,
                destination_records: 0,
                planned: 0,
                transferred: 0,
            });
        }

        self.status = SyncStatus::Scanning;
        let source_records = self
            .source
            .enumerate()
            .await
            .context("Failed to enumerate source")?;
        info!(count = source_records.len(), "source scan complete");

        let destination_records = self
            .dest
            .enumerate()
            .await
            .context("Failed to enumerate destination")?;
        info!(count = destination_records.len(), "destination scan complete");

        self.status = SyncStatus::Diffing;
        let planned = planner::plan(&source_records, &destination_records);
        info!(planned = planned.len(), "plan computed");

        if self.mode == RunMode::Dry {
            info!("dry run, halting before transfer");
            self.status = SyncStatus::Halted;
            return Ok(SyncReport {
                status: self.status,
                source_records: source_records.len(),
                destination_records: destination_records.len(),
                planned: planned.len(),
                transferred: 0,
            });
        }

        self.status = SyncStatus::Transferring;
        let transferred = self.transfer(&planned).await?;

        self.status = SyncStatus::Done;
        Ok(SyncReport {
            status: self.status,
            source_records: source_records.len(),
            destination_records: destination_records.len(),
            planned: planned.len(),
            transferred,
        })
    }

    /// Execute the plan one record at a time. The payload handed to the
    /// destination is the source's unresolved fetch future, so bytes for a
    /// record are only read if the destination actually writes them.
    async fn transfer(&mut self, planned: &[MediaRecord]) -> Result<usize> {
        let mut transferred = 0;
        for record in planned {
            info!(name = %record.display_name, "saving to destination");
            let payload = self.source.fetch(record);
            self.dest
                .save(record, payload)
                .await
                .with_context(|| format!("Transfer failed for {}", record.display_name))?;
            transferred += 1;
        }
        Ok(transferred)
    }
}
