use std::fmt::Write;

use super::model::Report;
use crate::format::{fit_columns, human_kb};

const ID_WIDTH: usize = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON document.
    #[default]
    Json,
    /// Indented JSON document.
    Pretty,
    /// Human-readable table.
    Text,
}

pub fn render(report: &Report, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(report),
        OutputFormat::Pretty => serde_json::to_string_pretty(report),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Memory: total {}  free {}  used {}",
        human_kb(report.total_memory_kb),
        human_kb(report.free_memory_kb),
        human_kb(report.used_memory_kb),
    );

    if report.processes.is_empty() {
        out.push_str("No matching processes\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>8}  {:<16}  {:<12}  {:>10}  {:>10}  {:>7}  {:>7}",
        "PID", "NAME", "CONTAINER", "VSZ", "RSS", "MEM%", "CPU%"
    );
    for p in &report.processes {
        let mut id = fit_columns(&p.container_id, ID_WIDTH);
        if p.args_truncated {
            id.push('*');
        }
        let _ = writeln!(
            out,
            "{:>8}  {:<16}  {:<12}  {:>10}  {:>10}  {:>7}  {:>7}",
            p.pid,
            fit_columns(&p.process_name, 16),
            id,
            human_kb(p.vsz_kb),
            human_kb(p.rss_kb),
            p.memory_usage_percent.to_string(),
            p.cpu_usage_percent.to_string(),
        );
    }
    out
}
