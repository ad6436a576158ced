use std::collections::HashSet;

use crate::system::process::ProcessTable;

/// Totals over a root process and every descendant reachable from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub vsz_bytes: u64,
    pub rss_bytes: u64,
    pub cpu_time_ms: u64,
    /// Distinct processes that contributed, root included.
    pub visited: usize,
}

/// Sum memory and CPU time over the subtree rooted at `root`.
///
/// Uses an explicit worklist with a visited set, so it terminates on any
/// child-link graph the source hands back, cycles included. A pid missing from
/// the table contributes nothing, and so does the memory of a process without
/// a memory context.
pub fn aggregate(table: &ProcessTable, root: u32) -> Aggregate {
    let mut totals = Aggregate::default();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(pid) = stack.pop() {
        if !seen.insert(pid) {
            continue;
        }
        let Some(process) = table.get(pid) else {
            tracing::trace!(pid, "process vanished before aggregation");
            continue;
        };

        totals.visited += 1;
        if let Some(usage) = process.memory.usage() {
            totals.vsz_bytes = totals.vsz_bytes.saturating_add(usage.virtual_bytes);
            totals.rss_bytes = totals.rss_bytes.saturating_add(usage.resident_bytes);
        }
        totals.cpu_time_ms = totals.cpu_time_ms.saturating_add(process.cpu_time_ms);

        stack.extend(
            process
                .children
                .iter()
                .copied()
                .filter(|child| !seen.contains(child)),
        );
    }

    totals
}
