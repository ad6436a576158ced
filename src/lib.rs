pub mod config;
pub mod format;
pub mod logging;
pub mod report;
pub mod server;
pub mod system;

use report::builder::{ReportBuilder, ReportOptions};
use report::identifier::FlagExtractor;
use system::arguments::SystemArgumentReader;
use system::collector::Collector;

/// Builder wired to the live host.
pub type SystemReportBuilder = ReportBuilder<Collector, FlagExtractor<SystemArgumentReader>>;

pub fn system_report_builder(
    options: ReportOptions,
    identifier_flag: &str,
    max_arg_scan_bytes: usize,
) -> SystemReportBuilder {
    ReportBuilder::new(
        Collector::new(),
        FlagExtractor::new(SystemArgumentReader, identifier_flag, max_arg_scan_bytes),
        options,
    )
}
