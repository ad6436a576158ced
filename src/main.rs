use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use shimstat::config::{self, Config, load_config, load_config_from_path};
use shimstat::report::metrics::CpuTimeBase;
use shimstat::report::render::{OutputFormat, render};
use shimstat::server::{ServerState, serve};
use shimstat::{logging, system_report_builder};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "shimstat",
    about = "Memory and CPU report for container shim process trees"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exact process name of the subtree roots to report
    #[arg(long)]
    target: Option<String>,

    /// Upper bound on argument-vector bytes inspected per process
    #[arg(long)]
    max_arg_scan_bytes: Option<usize>,

    /// Command-line flag whose value is the container identifier
    #[arg(long, allow_hyphen_values = true)]
    id_flag: Option<String>,

    /// What accumulated CPU time is divided by
    #[arg(long, value_enum)]
    cpu_base: Option<CpuTimeBase>,

    /// Output format for one-shot reports
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Serve reports over HTTP instead of printing one
    #[arg(long, default_value_t = false)]
    serve: bool,

    /// Listen address for --serve
    #[arg(long)]
    listen: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli)?;

    let level = logging::parse_level(&config.logging.level)?;
    logging::init(level, config.logging.json)?;
    tracing::debug!(
        path = ?cli.config.clone().or_else(config::config_path),
        target = %config.report.target_process_name,
        max_arg_scan_bytes = config.report.max_arg_scan_bytes,
        cpu_base = config.report.cpu_time_base.label(),
        "configuration loaded"
    );

    let builder = system_report_builder(
        config.report.options(),
        &config.report.identifier_flag,
        config.report.max_arg_scan_bytes,
    );

    if cli.serve {
        let listener = TcpListener::bind(config.server.listen.as_str())
            .await
            .wrap_err_with(|| format!("failed to bind {}", config.server.listen))?;
        tracing::info!(listen = %config.server.listen, "serving reports on /report");
        let state = ServerState::new(builder, config.server.max_concurrent_reports);
        return serve(listener, state).await;
    }

    let report = builder.build().wrap_err("failed to build report")?;
    println!("{}", render(&report, cli.format)?.trim_end());
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };

    if let Some(ref target) = cli.target {
        config.report.target_process_name = target.clone();
    }
    if let Some(bytes) = cli.max_arg_scan_bytes {
        config.report.max_arg_scan_bytes = bytes;
    }
    if let Some(ref flag) = cli.id_flag {
        config.report.identifier_flag = flag.clone();
    }
    if let Some(base) = cli.cpu_base {
        config.report.cpu_time_base = base;
    }
    if let Some(ref listen) = cli.listen {
        config.server.listen = listen.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }

    Ok(config)
}
