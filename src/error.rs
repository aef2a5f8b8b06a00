//! Error types for rdbviz
//!
//! One enum per stage of a run:
//! - scanning the event source
//! - aggregating the streams into a snapshot
//! - rendering the dashboard image
//! - delivering it (file, HTTP, JSON dump)
//! - configuration and command line validation

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::source::StreamKind;

/// Errors raised while the event source scans its input
#[derive(Error, Debug)]
pub enum SourceError {
    /// The input could not be read
    #[error("I/O error while scanning input: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled while the scan was in progress
    #[error("scan cancelled")]
    Cancelled,

    /// A consumer went away before the scan finished
    #[error("stream '{0}' closed before the scan finished")]
    StreamClosed(StreamKind),
}

/// Errors raised by the aggregation phase
#[derive(Error, Debug)]
pub enum AggregateError {
    /// The scan failed, partial statistics were discarded
    #[error("unable to parse input: {0}")]
    Source(#[from] SourceError),

    /// A consumer task panicked or was aborted
    #[error(
        "consumer for stream '{}' failed: {reason}",
        .stream.map_or("unknown", |s| s.name())
    )]
    Worker { stream: Option<StreamKind>, reason: String },

    /// The scan thread itself panicked
    #[error("scan thread failed: {0}")]
    Scan(String),

    /// Something still holds the live statistics after the barrier
    #[error("statistics are still shared after every consumer finished")]
    SnapshotStillShared,
}

/// Errors raised while building the SVG document
#[derive(Error, Debug)]
pub enum RenderError {
    /// The configured canvas cannot host the panel grid
    #[error("invalid layout: {0}")]
    Layout(String),

    /// Writing into the output buffer failed
    #[error("unable to format SVG: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Errors raised while delivering the dashboard or the stats dump
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to (de)serialize stats: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to render dashboard: {0}")]
    Render(#[from] RenderError),

    #[error("unable to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

impl DashboardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration and command line errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse
    #[error("config error: {key} must be valid (got '{value}')")]
    InvalidValue { key: String, value: String },

    /// The command line combination is not a valid run mode
    #[error("{0}")]
    Usage(String),
}
