use serde::{Deserialize, Serialize};

use super::identifier::SENTINEL;
use super::metrics::Percent;
use crate::system::snapshot::SystemMemory;

/// Report wire format. Field names and order are the compatibility contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total_memory_kb: u64,
    pub free_memory_kb: u64,
    pub used_memory_kb: u64,
    pub processes: Vec<ContainerRecord>,
}

impl Report {
    pub fn new(memory: SystemMemory, processes: Vec<ContainerRecord>) -> Self {
        Report {
            total_memory_kb: to_kb(memory.total_bytes),
            free_memory_kb: to_kb(memory.free_bytes),
            used_memory_kb: to_kb(memory.used_bytes()),
            processes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub process_name: String,
    pub pid: u32,
    pub container_id: String,
    pub vsz_kb: u64,
    pub rss_kb: u64,
    pub memory_usage_percent: Percent,
    pub cpu_usage_percent: Percent,
    #[serde(default, skip_serializing_if = "is_false")]
    pub args_truncated: bool,
}

impl ContainerRecord {
    /// Record for a matched root that has no memory context.
    pub fn without_memory(pid: u32, process_name: impl Into<String>) -> Self {
        ContainerRecord {
            process_name: process_name.into(),
            pid,
            container_id: SENTINEL.to_string(),
            vsz_kb: 0,
            rss_kb: 0,
            memory_usage_percent: Percent::ZERO,
            cpu_usage_percent: Percent::ZERO,
            args_truncated: false,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

pub fn to_kb(bytes: u64) -> u64 {
    bytes / 1024
}
