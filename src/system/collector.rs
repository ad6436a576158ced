use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, ThreadKind, UpdateKind};

use super::platform;
use super::process::{MemoryContext, MemoryUsage, ProcessRecord, ProcessTable};
use super::snapshot::{SnapshotError, SnapshotSource, SystemMemory, SystemSnapshot};

/// `SnapshotSource` backed by sysinfo.
///
/// Holds no `System` between calls: every snapshot refreshes a fresh one, so
/// concurrent reports never observe each other's state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Collector;

impl Collector {
    pub fn new() -> Self {
        Collector
    }

    fn refresh_kind() -> ProcessRefreshKind {
        Self::refresh_kind_for(platform::reads_arguments_live())
    }

    /// Argument vectors are only captured when the platform cannot read them
    /// per matched root later on.
    fn refresh_kind_for(live_arguments: bool) -> ProcessRefreshKind {
        let kind = ProcessRefreshKind::nothing().with_memory().with_cpu();
        if live_arguments {
            kind
        } else {
            kind.with_cmd(UpdateKind::OnlyIfNotSet)
        }
    }
}

impl SnapshotSource for Collector {
    fn snapshot(&self) -> Result<SystemSnapshot, SnapshotError> {
        let _span = tracing::debug_span!("collector.snapshot").entered();

        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SnapshotError::Unsupported);
        }

        let mut sys = System::new();
        // Denominators are fixed before any process is looked at.
        sys.refresh_memory();
        let memory = SystemMemory {
            total_bytes: sys.total_memory(),
            free_bytes: sys.free_memory(),
        };
        let uptime_ms = System::uptime().saturating_mul(1000);

        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());

        let mut flat = Vec::with_capacity(sys.processes().len());
        let mut skipped_threads = 0usize;
        for (pid, process) in sys.processes() {
            if process.thread_kind() == Some(ThreadKind::Userland) {
                skipped_threads += 1;
                continue;
            }
            flat.push(to_record(pid.as_u32(), process));
        }

        if flat.is_empty() {
            return Err(SnapshotError::EmptyProcessTable);
        }

        flat.sort_unstable_by_key(|p| p.pid);
        tracing::debug!(
            processes = flat.len(),
            skipped_threads,
            total_bytes = memory.total_bytes,
            "process table enumerated"
        );

        Ok(SystemSnapshot {
            memory,
            uptime_ms,
            table: ProcessTable::from_flat(flat),
        })
    }
}

fn to_record(pid: u32, process: &Process) -> ProcessRecord {
    let name = platform::process_comm(pid)
        .unwrap_or_else(|| process.name().to_string_lossy().to_string());

    let argv = process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect();

    ProcessRecord {
        pid,
        name,
        parent: process.parent().map(|p| p.as_u32()),
        children: Vec::new(),
        memory: memory_context(process.virtual_memory(), process.memory()),
        cpu_time_ms: process.accumulated_cpu_time(),
        run_time_ms: process.run_time().saturating_mul(1000),
        argv,
    }
}

/// A process without any mapped address space has no memory context.
fn memory_context(virtual_bytes: u64, resident_bytes: u64) -> MemoryContext {
    if virtual_bytes == 0 {
        MemoryContext::Absent
    } else {
        MemoryContext::Present(MemoryUsage {
            virtual_bytes,
            resident_bytes,
        })
    }
}
