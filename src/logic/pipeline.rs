//! End-to-end pipeline.
//!
//! Batch model: all raw records are in memory before the first stage runs,
//! and every stage executes sequentially over the full collections. The
//! normalized collection is sorted once here and read-only afterwards.

use serde_json::{json, Value};
use thiserror::Error;

use crate::logic::case::{Case, Orchestrator};
use crate::logic::config::{ConfigError, PipelineConfig};
use crate::logic::detect::{BaselineDetector, Detection};
use crate::logic::event::{sort_by_timestamp, NormalizeStats, NormalizedEvent};
use crate::logic::normalize::normalize_all;
use crate::logic::trace::TraceLog;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no input events found (searched {zeek} and {suricata})")]
    NoInput { zeek: String, suricata: String },
}

/// Everything a run produces, handed to the collaborators that persist it.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The run collection: ts-sorted, immutable after normalization.
    pub events: Vec<NormalizedEvent>,
    pub stats: NormalizeStats,
    pub detections: Vec<Detection>,
    pub cases: Vec<Case>,
}

/// Run normalize -> detect -> case assembly over raw sensor records.
///
/// Empty input is a valid run that produces empty outputs; the binary is
/// responsible for treating total input absence as a user-facing error.
pub fn run(
    zeek_raw: &[Value],
    suricata_raw: &[Value],
    config: &PipelineConfig,
    trace: &TraceLog,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;

    trace.record(
        "normalize",
        "start",
        json!({"zeek_records": zeek_raw.len(), "suricata_records": suricata_raw.len()}),
    );
    let (mut events, stats) = normalize_all(zeek_raw, suricata_raw);
    sort_by_timestamp(&mut events);
    trace.record(
        "normalize",
        "complete",
        json!({"parsed": stats.total_parsed(), "dropped": stats.total_dropped()}),
    );

    trace.record("detect", "start", json!({"event_count": events.len()}));
    let detector = BaselineDetector::new(config.detectors.clone());
    let detections = detector.detect(&events);
    trace.record(
        "detect",
        "complete",
        json!({"detection_count": detections.len()}),
    );

    let cases = Orchestrator::new(&events, config, trace).run(&detections);

    Ok(PipelineOutput {
        events,
        stats,
        detections,
        cases,
    })
}

// ============================================================================
// TESTS
// ============================================================================
