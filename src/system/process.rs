use std::collections::HashMap;

/// Virtual and resident size of one address space, in bytes.
///
/// Sources do not guarantee `resident_bytes <= virtual_bytes`, so nothing here
/// relies on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub virtual_bytes: u64,
    pub resident_bytes: u64,
}

/// Whether a process owns an address space at snapshot time.
///
/// Kernel threads never have one, and a process that is exiting may already
/// have torn its own down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryContext {
    Present(MemoryUsage),
    Absent,
}

impl MemoryContext {
    pub fn usage(&self) -> Option<MemoryUsage> {
        match self {
            MemoryContext::Present(usage) => Some(*usage),
            MemoryContext::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, MemoryContext::Present(_))
    }
}

#[derive(Clone, Debug)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    pub memory: MemoryContext,
    /// Accumulated user + system CPU time, in milliseconds.
    pub cpu_time_ms: u64,
    /// Time since the process started, in milliseconds.
    pub run_time_ms: u64,
    /// Argument vector as captured during enumeration. Used only where the
    /// platform cannot re-read it at extraction time.
    pub argv: Vec<String>,
}

/// All processes of one snapshot, in enumeration order, indexed by pid.
#[derive(Clone, Debug, Default)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
    index: HashMap<u32, usize>,
}

impl ProcessTable {
    /// Build a table from flat records, deriving child links from parent ids.
    ///
    /// Existing `children` are discarded. The first record wins when a pid is
    /// listed twice, and orphans (unknown parent) are kept without linkage.
    pub fn from_flat(processes: Vec<ProcessRecord>) -> Self {
        let mut records = Vec::with_capacity(processes.len());
        let mut index = HashMap::with_capacity(processes.len());
        for mut process in processes {
            if index.contains_key(&process.pid) {
                continue;
            }
            process.children.clear();
            index.insert(process.pid, records.len());
            records.push(process);
        }

        let links: Vec<(u32, u32)> = records
            .iter()
            .filter_map(|p| p.parent.map(|ppid| (ppid, p.pid)))
            .filter(|(ppid, pid)| ppid != pid)
            .collect();
        for (ppid, pid) in links {
            if let Some(&slot) = index.get(&ppid) {
                records[slot].children.push(pid);
            }
        }

        for process in &mut records {
            process.children.sort_unstable();
        }

        ProcessTable { records, index }
    }

    /// Build a table that keeps the given child links verbatim.
    ///
    /// Lets callers reproduce inconsistent views of a mutating process table,
    /// including cycles.
    pub fn from_linked(processes: Vec<ProcessRecord>) -> Self {
        let mut records = Vec::with_capacity(processes.len());
        let mut index = HashMap::with_capacity(processes.len());
        for process in processes {
            if index.contains_key(&process.pid) {
                continue;
            }
            index.insert(process.pid, records.len());
            records.push(process);
        }
        ProcessTable { records, index }
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.index.get(&pid).map(|&slot| &self.records[slot])
    }

    /// Records in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, parent: Option<u32>, rss: u64) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: format!("p{pid}"),
            parent,
            children: vec![],
            memory: MemoryContext::Present(MemoryUsage {
                virtual_bytes: rss * 4,
                resident_bytes: rss,
            }),
            cpu_time_ms: 0,
            run_time_ms: 0,
            argv: vec![],
        }
    }

    #[test]
    fn links_children_from_parent_ids() {
        let table = ProcessTable::from_flat(vec![
            record(1, None, 100),
            record(3, Some(1), 50),
            record(2, Some(1), 50),
            record(4, Some(2), 25),
        ]);
        assert_eq!(table.get(1).unwrap().children, vec![2, 3]);
        assert_eq!(table.get(2).unwrap().children, vec![4]);
        assert!(table.get(4).unwrap().children.is_empty());
    }

    #[test]
    fn keeps_enumeration_order() {
        let table = ProcessTable::from_flat(vec![
            record(30, None, 1),
            record(10, None, 1),
            record(20, None, 1),
        ]);
        let order: Vec<u32> = table.iter().map(|p| p.pid).collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[test]
    fn self_parent_is_not_a_child() {
        let table = ProcessTable::from_flat(vec![record(0, Some(0), 0)]);
        assert!(table.get(0).unwrap().children.is_empty());
    }

    #[test]
    fn duplicate_pid_keeps_first() {
        let table = ProcessTable::from_flat(vec![record(5, None, 10), record(5, None, 99)]);
        assert_eq!(table.len(), 1);
        let usage = table.get(5).unwrap().memory.usage().unwrap();
        assert_eq!(usage.resident_bytes, 10);
    }

    #[test]
    fn absent_memory_has_no_usage() {
        assert_eq!(MemoryContext::Absent.usage(), None);
        assert!(!MemoryContext::Absent.is_present());
    }
}
