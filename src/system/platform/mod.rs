use std::io;

/// Raw argument vector of one process, bounded to a caller-chosen length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentBytes {
    pub bytes: Vec<u8>,
    /// Set when the process had more argument bytes than the limit allowed.
    pub truncated: bool,
}

impl ArgumentBytes {
    /// Cap `bytes` at `limit`, recording whether anything was cut.
    pub fn bounded(mut bytes: Vec<u8>, limit: usize) -> Self {
        let truncated = bytes.len() > limit;
        if truncated {
            bytes.truncate(limit);
        }
        ArgumentBytes { bytes, truncated }
    }
}

pub trait PlatformExtensions {
    /// Kernel-side short name of the process, if the platform exposes one.
    fn process_comm(pid: u32) -> Option<String>;
    /// Fresh read of the NUL-separated argument vector. `None` means the
    /// platform has no direct reader and the snapshot copy must be used.
    fn process_arguments(pid: u32, limit: usize) -> Option<io::Result<ArgumentBytes>>;
    /// Whether `process_arguments` is a real reader. When it is, the
    /// snapshot does not need to capture argument vectors itself.
    fn reads_arguments_live() -> bool;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;

pub fn process_comm(pid: u32) -> Option<String> {
    platform_impl::Platform::process_comm(pid)
}

pub fn process_arguments(pid: u32, limit: usize) -> Option<io::Result<ArgumentBytes>> {
    platform_impl::Platform::process_arguments(pid, limit)
}

pub fn reads_arguments_live() -> bool {
    platform_impl::Platform::reads_arguments_live()
}
