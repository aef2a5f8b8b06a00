//! One-shot file outputs: the rendered SVG and the JSON stats dump.
//!
//! Both are written to a temporary file next to the target and renamed onto
//! it only once complete, so a failed run never leaves a truncated file.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::DashboardError;
use crate::render::{render, Layout};
use crate::stats::Stats;

pub fn write_svg_file(stats: &Stats, layout: &Layout, path: &Path) -> Result<(), DashboardError> {
    let svg = render(stats, layout)?;
    write_atomically(path, svg.as_bytes())?;
    info!("[Dashboard] SVG written to {}", path.display());
    Ok(())
}

pub fn write_stats_file(stats: &Stats, path: &Path) -> Result<(), DashboardError> {
    let data = serde_json::to_string_pretty(stats)?;
    write_atomically(path, data.as_bytes())?;
    info!("[Dashboard] Stats written to {}", path.display());
    Ok(())
}

pub fn read_stats_file(path: &Path) -> Result<Stats, DashboardError> {
    let data = fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
    Ok(serde_json::from_str(&data)?)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), DashboardError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DashboardError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| DashboardError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| DashboardError::io(path, e))?;
    tmp.persist(path).map_err(|e| DashboardError::io(path, e.error))?;
    Ok(())
}
