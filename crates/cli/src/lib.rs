use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

pub mod commands;

/// Serialize `value` as pretty-printed JSON and write it atomically.
///
/// The document is staged in a temporary file in the destination directory
/// and renamed into place, so a crash mid-write leaves either the previous
/// file or nothing. Missing parent directories are created first.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {}", parent.display()))?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to stage output in {}", parent.display()))?;
    serde_json::to_writer_pretty(&mut staged, value)
        .with_context(|| format!("Failed to serialize output for {}", path.display()))?;
    staged
        .write_all(b"\n")
        .with_context(|| format!("Failed to write output for {}", path.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;
    Ok(())
}
