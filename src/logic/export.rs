//! Flat-file writers for run artifacts.
//!
//! Simple I/O wrappers around the in-memory structures the pipeline hands
//! over: a JSON-lines snapshot of the normalized events, the detection
//! sequence as JSON lines, the consolidated markdown report, and the manifest.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::logic::report::RunManifest;

/// Write one JSON object per line. An empty collection still produces the
/// file, so downstream consumers never have to special-case a missing one.
pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for item in items {
        let json = serde_json::to_string(item)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()
}

pub fn write_markdown(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, json)
}
