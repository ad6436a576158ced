use std::str::FromStr;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;

/// Parse a level name such as `info` or `DEBUG`.
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| eyre!("unknown log level {level:?}"))
}

/// Install the global subscriber. Logs go to stderr so stdout carries only the
/// report.
pub fn init(level: Level, json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.with_ansi(false).json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_level(" DEBUG ").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("trace").unwrap(), Level::TRACE);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(parse_level("loud").is_err());
    }
}
