//! Output sinks for finished records.

use std::io;
use std::sync::{Mutex, PoisonError};

use crate::record::JobRecord;

/// Receives each record exactly once, as soon as it is ready.
///
/// Pushes may arrive from several in-flight fetches; implementations
/// serialize them internally.
pub trait RecordSink: Send + Sync {
    /// # Errors
    ///
    /// Returns the underlying write error. The crawl treats it as fatal.
    fn push(&self, record: &JobRecord) -> io::Result<()>;
}

/// Keeps records in memory, in push order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<JobRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<JobRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordSink for MemorySink {
    fn push(&self, record: &JobRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
