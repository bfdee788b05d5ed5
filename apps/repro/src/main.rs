//! repro - reproducible build verification
//!
//! Rebuilds archived Debian packages inside disposable sandboxes pinned to
//! the snapshot archive of their original build date, and reports whether
//! the rebuilt artifacts match the published digests.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use repro_buildinfo::HttpReportService;
use repro_config::{Config, RuntimeKind};
use repro_events::{EventReceiver, EventSender};
use repro_net::{NetClient, NetConfig};
use repro_ops::{OpsContextBuilder, OpsCtx, RunReport};
use repro_platform::PlatformContext;
use repro_sandbox::{DigestBehaviour, DockerRuntime, SimulatedRuntime};
use repro_snapshot::HttpSnapshotCatalog;
use repro_types::{ColorChoice, OutputFormat, PackageSet};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    let set = PackageSet::from_mode(&cli.mode, cli.package.as_deref())?;

    // File config (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    // the debug log file lives in the configured logs dir
    init_tracing(cli.global.json, cli.global.debug, &config.logs_dir());
    info!("Starting repro v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = repro_events::channel();
    let ops_ctx = build_ops_context(event_sender, config.clone())?;

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let color = cli.global.color.unwrap_or(config.general.color);
    let renderer = OutputRenderer::new(json_output, color)
        .verdict_only(matches!(set, PackageSet::Cli(_)));

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler =
        EventHandler::new(colors_enabled, cli.global.debug).quiet(json_output);

    let report = execute_with_events(&set, ops_ctx, event_receiver, &mut event_handler).await?;

    renderer.render_report(&report)?;

    info!("Run completed");
    Ok(())
}

/// Run the pipeline while draining its events
async fn execute_with_events(
    set: &PackageSet,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<RunReport, CliError> {
    let mut run_future = Box::pin(async {
        let report = repro_ops::run(&ops_ctx, set).await?;
        Ok::<_, CliError>(report)
    });

    loop {
        select! {
            result = &mut run_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Wire the HTTP collaborators and the sandbox runtime into an ops context
fn build_ops_context(event_sender: EventSender, config: Config) -> Result<OpsCtx, CliError> {
    let client = NetClient::new(NetConfig::from(&config.network))?;

    let catalog = HttpSnapshotCatalog::new(client.clone(), &config.mirror)
        .with_events(event_sender.clone());
    let reports =
        HttpReportService::new(client, config.report.clone()).with_events(event_sender.clone());

    let builder = OpsContextBuilder::new()
        .with_catalog(Arc::new(catalog))
        .with_reports(Arc::new(reports))
        .with_event_sender(event_sender.clone());

    let builder = match config.sandbox.runtime {
        RuntimeKind::Simulated => {
            info!("Using simulated sandbox runtime");
            builder.with_simulated_runtime(Arc::new(SimulatedRuntime::new(
                DigestBehaviour::Registered,
            )))
        }
        RuntimeKind::Docker => builder.with_runtime(Arc::new(DockerRuntime::on_host(
            PlatformContext::new(Some(event_sender)),
        ))),
    };

    Ok(builder.with_config(config).build()?)
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        // Keep stdout clean for the JSON document
        if debug_enabled {
            if let Some(file) = create_log_file(log_dir) {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(env_filter("info,repro=debug,repro_ops=debug"))
                    .init();
                return;
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        match create_log_file(log_dir) {
            Some(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(env_filter("info,repro=debug,repro_ops=debug"))
                    .init();
            }
            None => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(env_filter("debug"))
                    .init();
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            // Status lines already cover the app's own event logs
            .with_env_filter(env_filter("info,repro=warn"))
            .init();
    }
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Open `<dir>/repro-<timestamp>.log`, reporting where debug output goes
fn create_log_file(log_dir: &Path) -> Option<std::fs::File> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create log directory: {e}");
        return None;
    }

    let log_file = log_dir.join(format!(
        "repro-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));

    match std::fs::File::create(&log_file) {
        Ok(file) => {
            eprintln!("Debug logging enabled: {}", log_file.display());
            Some(file)
        }
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {e}");
            None
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(output) = &global.output {
        config.paths.results_csv = Some(output.clone());
    }
    if global.simulate {
        config.sandbox.runtime = RuntimeKind::Simulated;
    }
    if let Some(jobs) = global.jobs {
        config.build.jobs = jobs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "repro",
            "popular",
            "--simulate",
            "--output",
            "out/table.csv",
            "--jobs",
            "3",
        ])
        .unwrap();

        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global);

        assert_eq!(config.sandbox.runtime, RuntimeKind::Simulated);
        assert_eq!(config.results_csv(), PathBuf::from("out/table.csv"));
        assert_eq!(config.build.jobs, 3);
    }

    #[test]
    fn test_debug_log_goes_to_configured_logs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.logs_dir = Some(dir.path().join("debug-logs"));

        let file = create_log_file(&config.logs_dir());
        assert!(file.is_some());

        let names: Vec<String> = std::fs::read_dir(dir.path().join("debug-logs"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("repro-") && names[0].ends_with(".log"));
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let cli = Cli::try_parse_from(["repro", "required"]).unwrap();
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global);

        assert_eq!(config.sandbox.runtime, RuntimeKind::Docker);
        assert_eq!(config.results_csv(), PathBuf::from(repro_config::constants::RESULTS_CSV));
    }
}
