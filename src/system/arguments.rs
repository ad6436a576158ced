use std::io;

use super::platform::{self, ArgumentBytes};
use super::process::ProcessRecord;

/// Fetches the raw argument vector of a process at call time.
///
/// Reads may fail because the process exited or denies access; callers treat
/// that as "no identifier", never as a report failure.
pub trait ArgumentReader: Send + Sync {
    fn read_arguments(&self, process: &ProcessRecord, limit: usize) -> io::Result<ArgumentBytes>;
}

/// Reads from the platform when it can, otherwise from the snapshot copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemArgumentReader;

impl ArgumentReader for SystemArgumentReader {
    fn read_arguments(&self, process: &ProcessRecord, limit: usize) -> io::Result<ArgumentBytes> {
        match platform::process_arguments(process.pid, limit) {
            Some(result) => result,
            None => Ok(join_argv(&process.argv, limit)),
        }
    }
}

/// Re-encode a split argument vector the way the kernel stores it.
pub fn join_argv(argv: &[String], limit: usize) -> ArgumentBytes {
    let mut bytes = Vec::new();
    for arg in argv {
        bytes.extend_from_slice(arg.as_bytes());
        bytes.push(0);
        if bytes.len() > limit {
            break;
        }
    }
    ArgumentBytes::bounded(bytes, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_argv_is_nul_terminated() {
        let argv = vec!["shim".to_string(), "-id".to_string(), "abc".to_string()];
        let args = join_argv(&argv, 350);
        assert_eq!(args.bytes, b"shim\0-id\0abc\0");
        assert!(!args.truncated);
    }

    #[test]
    fn join_argv_stops_past_limit() {
        let argv = vec!["x".repeat(10), "y".repeat(10)];
        let args = join_argv(&argv, 5);
        assert_eq!(args.bytes, b"xxxxx");
        assert!(args.truncated);
    }
}
