use std::fmt;

use crate::system::arguments::ArgumentReader;
use crate::system::platform::ArgumentBytes;
use crate::system::process::ProcessRecord;

/// Rendered in place of an identifier that could not be determined.
pub const SENTINEL: &str = "N/A";
pub const DEFAULT_FLAG: &str = "-id";
pub const DEFAULT_MAX_SCAN_BYTES: usize = 350;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerId {
    Found(String),
    NotFound,
}

impl ContainerId {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerId::Found(id) => id,
            ContainerId::NotFound => SENTINEL,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub id: ContainerId,
    /// The argument vector was longer than the scan limit.
    pub truncated: bool,
}

impl Extraction {
    pub fn not_found() -> Self {
        Extraction {
            id: ContainerId::NotFound,
            truncated: false,
        }
    }
}

/// Derives a subtree identifier from a root process. Never fails.
pub trait IdentifierExtractor: Send + Sync {
    fn extract(&self, process: &ProcessRecord) -> Extraction;
}

/// Finds the token that follows a command-line flag such as `-id`.
///
/// A plain token scan, not a shell-aware parser.
#[derive(Clone, Debug)]
pub struct FlagExtractor<R> {
    reader: R,
    flag: String,
    max_scan_bytes: usize,
}

impl<R: ArgumentReader> FlagExtractor<R> {
    pub fn new(reader: R, flag: impl Into<String>, max_scan_bytes: usize) -> Self {
        FlagExtractor {
            reader,
            flag: flag.into(),
            max_scan_bytes,
        }
    }

    pub fn max_scan_bytes(&self) -> usize {
        self.max_scan_bytes
    }
}

impl<R: ArgumentReader> IdentifierExtractor for FlagExtractor<R> {
    fn extract(&self, process: &ProcessRecord) -> Extraction {
        let mut args = match self.reader.read_arguments(process, self.max_scan_bytes) {
            Ok(args) => args,
            Err(err) => {
                tracing::debug!(pid = process.pid, error = %err, "argument vector unreadable");
                return Extraction::not_found();
            }
        };
        if args.bytes.len() > self.max_scan_bytes {
            args.truncated = true;
        }
        if args.truncated {
            tracing::debug!(
                pid = process.pid,
                limit = self.max_scan_bytes,
                "argument vector exceeds scan limit"
            );
        }
        Extraction {
            id: identify(&args, &self.flag),
            truncated: args.truncated,
        }
    }
}

/// Identifier carried by `args`, or `NotFound` if the bytes are empty,
/// truncated or lack the flag.
pub fn identify(args: &ArgumentBytes, flag: &str) -> ContainerId {
    if args.truncated || args.bytes.is_empty() {
        return ContainerId::NotFound;
    }
    let normalized = normalize_arguments(&args.bytes);
    match scan_flag(&normalized, flag) {
        Some(token) => ContainerId::Found(token.to_string()),
        None => ContainerId::NotFound,
    }
}

/// Collapse NUL terminators and spaces into single spaces.
pub fn normalize_arguments(bytes: &[u8]) -> String {
    bytes
        .split(|&b| b == 0 || b == b' ')
        .filter(|token| !token.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The token right after a whole-token occurrence of `flag`.
pub fn scan_flag<'a>(normalized: &'a str, flag: &str) -> Option<&'a str> {
    let mut tokens = normalized.split(' ');
    while let Some(token) = tokens.next() {
        if token == flag {
            return tokens.next().filter(|value| !value.is_empty());
        }
    }
    None
}
