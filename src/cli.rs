//! Command line surface.
//!
//! `rdbviz (-o <file> | -l <listen address>) <input>`, plus debug flags to
//! dump the stats, skip rendering, or render a previously dumped snapshot.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const USAGE: &str = "\
Usage: rdbviz (-o <output svg file>|-l <listen address>) <event log>

There's two running modes:
 - run and then output a SVG file on disk (with -o)
 - run and then launch a web server which will serve the SVG graph (with -l)";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rdbviz",
    version,
    about = "Aggregate a decoded snapshot dump into statistics and draw them as SVG",
    override_usage = "rdbviz (-o <FILE> | -l <ADDR>) <INPUT>",
    after_help = "EXAMPLES:\n    \
        rdbviz -o dump.svg dump.events.jsonl\n    \
        rdbviz -l :8080 dump.events.jsonl\n    \
        rdbviz --debug-only-stats --debug-stats-output stats.json dump.events.jsonl\n    \
        rdbviz --debug-render stats.json -o dump.svg"
)]
pub struct CliArgs {
    /// Decoded snapshot event log, one JSON record per line
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// The SVG output file
    #[arg(short = 'o', value_name = "FILE", conflicts_with = "listen")]
    pub output: Option<PathBuf>,

    /// The listen address of the web server (host:port or :port)
    #[arg(short = 'l', value_name = "ADDR")]
    pub listen: Option<String>,

    /// DEBUG: write the statistics as JSON to this file
    #[arg(long = "debug-stats-output", value_name = "FILE")]
    pub debug_stats_output: Option<PathBuf>,

    /// DEBUG: only generate statistics after parsing, without visualization
    #[arg(long = "debug-only-stats")]
    pub debug_only_stats: bool,

    /// DEBUG: skip parsing and render the stats from the provided JSON file
    #[arg(long = "debug-render", value_name = "FILE")]
    pub debug_render: Option<PathBuf>,

    /// Verbose output (debug logs)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsInput {
    /// Aggregate an event log
    Parse(PathBuf),
    /// Reload a JSON stats dump
    Load(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    File(PathBuf),
    Serve(SocketAddr),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub input: StatsInput,
    pub stats_output: Option<PathBuf>,
    pub delivery: Delivery,
}

impl RunPlan {
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let delivery = match (&args.output, &args.listen) {
            (Some(path), _) => Delivery::File(path.clone()),
            (None, Some(addr)) => Delivery::Serve(parse_listen_addr(addr)?),
            (None, None) => Delivery::None,
        };

        if let Some(stats_file) = &args.debug_render {
            if delivery == Delivery::None {
                return Err(ConfigError::Usage(
                    "With --debug-render you need to also pass the -o or -l option".to_string(),
                ));
            }
            return Ok(Self {
                input: StatsInput::Load(stats_file.clone()),
                stats_output: args.debug_stats_output.clone(),
                delivery,
            });
        }

        let input = args
            .input
            .clone()
            .ok_or_else(|| ConfigError::Usage("missing input file".to_string()))?;

        let requires_render = !args.debug_only_stats && args.debug_stats_output.is_none();
        if requires_render && delivery == Delivery::None {
            return Err(ConfigError::Usage("one of -o or -l is required".to_string()));
        }

        Ok(Self {
            input: StatsInput::Parse(input),
            stats_output: args.debug_stats_output.clone(),
            delivery: if args.debug_only_stats { Delivery::None } else { delivery },
        })
    }
}

/// Accepts `host:port`, or `:port` for every interface.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    let candidate = if raw.starts_with(':') {
        format!("0.0.0.0{}", raw)
    } else {
        raw.to_string()
    };
    candidate
        .parse()
        .map_err(|_| ConfigError::Usage(format!("invalid listen address '{}'", raw)))
}
