//! rdbviz - snapshot dump statistics as an SVG dashboard
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use rdbviz::aggregator::Aggregator;
use rdbviz::cli::{CliArgs, Delivery, RunPlan, StatsInput, USAGE};
use rdbviz::config::Config;
use rdbviz::dashboard::{read_stats_file, start_dashboard_server, write_stats_file, write_svg_file, DashboardState};
use rdbviz::source::JsonLinesSource;
use rdbviz::stats::Stats;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            eprintln!("\n{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let plan = match RunPlan::from_args(&args) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(args.verbose, plan) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(verbose: bool, plan: RunPlan) -> Result<()> {
    let config = Config::load().context("Invalid configuration")?;

    setup_logging(&config.server.log_level, verbose)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(run_async(config, plan))
}

async fn run_async(config: Config, plan: RunPlan) -> Result<()> {
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, shutting down...");
            signal.cancel();
        }
    });

    let stats = load_stats(&config, plan.input, shutdown.clone()).await?;

    if let Some(path) = &plan.stats_output {
        write_stats_file(&stats, path).context("unable to write stats")?;
    }

    let layout = config.render.layout();
    match plan.delivery {
        Delivery::File(path) => {
            info!("Generating SVG file...");
            write_svg_file(&stats, &layout, &path).context("unable to render stats")?;
        }
        Delivery::Serve(addr) => {
            start_dashboard_server(DashboardState::new(stats, layout), addr, shutdown)
                .await
                .context("unable to render stats")?;
        }
        Delivery::None => {}
    }

    Ok(())
}

async fn load_stats(config: &Config, input: StatsInput, shutdown: CancellationToken) -> Result<Stats> {
    match input {
        StatsInput::Parse(path) => {
            let file = File::open(&path)
                .with_context(|| format!("unable to open file '{}'", path.display()))?;

            info!("Parsing event log {}", path.display());
            let report = Aggregator::new(config.aggregator.clone())
                .with_cancellation(shutdown)
                .run(JsonLinesSource::new(BufReader::new(file)))
                .await
                .context("Aggregation failed")?;

            info!(
                databases = report.stats.database.count,
                keys = report.stats.keys.count,
                anomalies = report.anomalies,
                "Statistics ready"
            );
            Ok(report.stats)
        }
        StatsInput::Load(path) => read_stats_file(&path)
            .with_context(|| format!("unable to read stats from '{}'", path.display())),
    }
}

fn setup_logging(level: &str, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("rdbviz=debug,warn")
    } else {
        EnvFilter::try_new(level).context("Invalid RDBVIZ_LOG filter")?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
