use std::fs::File;
use std::io::{self, Read};

use super::{ArgumentBytes, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_comm(pid: u32) -> Option<String> {
        // /proc/{pid}/comm holds the TASK_COMM_LEN bounded name plus a newline
        let path = format!("/proc/{pid}/comm");
        let contents = std::fs::read_to_string(path).ok()?;
        let name = contents.trim_end_matches('\n');
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    fn process_arguments(pid: u32, limit: usize) -> Option<io::Result<ArgumentBytes>> {
        // Empty for kernel threads and for processes that already released their mm
        let path = format!("/proc/{pid}/cmdline");
        Some(read_bounded(&path, limit))
    }

    fn reads_arguments_live() -> bool {
        true
    }
}

fn read_bounded(path: &str, limit: usize) -> io::Result<ArgumentBytes> {
    let file = File::open(path)?;
    // One byte past the limit is enough to know the vector was cut.
    let cap = (limit as u64).saturating_add(1);
    let mut bytes = Vec::with_capacity(limit.min(4096) + 1);
    file.take(cap).read_to_end(&mut bytes)?;
    Ok(ArgumentBytes::bounded(bytes, limit))
}
