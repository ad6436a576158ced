use super::aggregate::aggregate;
use super::identifier::IdentifierExtractor;
use super::metrics::{CpuTimeBase, cpu_percent, memory_percent};
use super::model::{ContainerRecord, Report, to_kb};
use crate::system::process::{ProcessRecord, ProcessTable};
use crate::system::snapshot::{SnapshotError, SnapshotSource, SystemMemory};

pub const DEFAULT_TARGET: &str = "containerd-shim";

#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Exact process name of the subtree roots to report.
    pub target_process_name: String,
    pub cpu_time_base: CpuTimeBase,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            target_process_name: DEFAULT_TARGET.to_string(),
            cpu_time_base: CpuTimeBase::default(),
        }
    }
}

/// Produces one report per call from a fresh snapshot.
///
/// Holds only read-only collaborators, so one builder can serve concurrent
/// requests.
pub struct ReportBuilder<S, E> {
    source: S,
    extractor: E,
    options: ReportOptions,
}

impl<S: SnapshotSource, E: IdentifierExtractor> ReportBuilder<S, E> {
    pub fn new(source: S, extractor: E, options: ReportOptions) -> Self {
        ReportBuilder {
            source,
            extractor,
            options,
        }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Fails only when the process table cannot be enumerated.
    pub fn build(&self) -> Result<Report, SnapshotError> {
        let _span = tracing::debug_span!(
            "report.build",
            target = %self.options.target_process_name
        )
        .entered();

        let snapshot = self.source.snapshot()?;
        let processes: Vec<ContainerRecord> = snapshot
            .table
            .iter()
            .filter(|p| p.name == self.options.target_process_name)
            .map(|root| {
                self.container_record(root, &snapshot.table, snapshot.memory, snapshot.uptime_ms)
            })
            .collect();

        tracing::debug!(
            scanned = snapshot.table.len(),
            matched = processes.len(),
            "report built"
        );
        Ok(Report::new(snapshot.memory, processes))
    }

    fn container_record(
        &self,
        root: &ProcessRecord,
        table: &ProcessTable,
        memory: SystemMemory,
        uptime_ms: u64,
    ) -> ContainerRecord {
        if !root.memory.is_present() {
            tracing::debug!(pid = root.pid, "target process has no memory context");
            return ContainerRecord::without_memory(root.pid, root.name.clone());
        }

        let totals = aggregate(table, root.pid);
        let extraction = self.extractor.extract(root);
        let base_ms = match self.options.cpu_time_base {
            CpuTimeBase::Uptime => uptime_ms,
            CpuTimeBase::Lifetime => root.run_time_ms,
        };

        tracing::trace!(
            pid = root.pid,
            descendants = totals.visited.saturating_sub(1),
            rss_bytes = totals.rss_bytes,
            "subtree aggregated"
        );

        ContainerRecord {
            process_name: root.name.clone(),
            pid: root.pid,
            container_id: extraction.id.to_string(),
            vsz_kb: to_kb(totals.vsz_bytes),
            rss_kb: to_kb(totals.rss_bytes),
            memory_usage_percent: memory_percent(totals.rss_bytes, memory.total_bytes),
            cpu_usage_percent: cpu_percent(totals.cpu_time_ms, base_ms),
            args_truncated: extraction.truncated,
        }
    }
}
