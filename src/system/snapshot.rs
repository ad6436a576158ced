use thiserror::Error;

use super::process::ProcessTable;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemMemory {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl SystemMemory {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }
}

/// One observation of the host: memory totals first, then the process table.
#[derive(Clone, Debug)]
pub struct SystemSnapshot {
    pub memory: SystemMemory,
    /// Host uptime in milliseconds.
    pub uptime_ms: u64,
    pub table: ProcessTable,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("process enumeration is not supported on this platform")]
    Unsupported,
    #[error("process table could not be enumerated: no processes visible")]
    EmptyProcessTable,
}

/// Anything that can enumerate the live process table.
///
/// Each call must take its own snapshot; implementations may not share mutable
/// state between concurrent calls.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> Result<SystemSnapshot, SnapshotError>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for std::sync::Arc<T> {
    fn snapshot(&self) -> Result<SystemSnapshot, SnapshotError> {
        (**self).snapshot()
    }
}
