use std::io;

use super::{ArgumentBytes, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_comm(_pid: u32) -> Option<String> {
        // No kernel comm outside Linux; sysinfo's name is used instead
        None
    }

    fn process_arguments(_pid: u32, _limit: usize) -> Option<io::Result<ArgumentBytes>> {
        None
    }

    fn reads_arguments_live() -> bool {
        false
    }
}
