//! Event normalization.
//!
//! One normalizer per sensor behind a single interface; each maps the raw
//! JSON record into the canonical [`NormalizedEvent`] schema. Mapping is
//! deterministic and total: every recognized raw field lands in exactly one
//! canonical column, everything else goes into `metadata`. Records without a
//! parseable timestamp are dropped and counted, never fatal.

use serde_json::Value;

use crate::logic::event::{NormalizeStats, NormalizedEvent, Sensor, SensorStats};

pub mod suricata;
pub mod zeek;

pub use suricata::SuricataNormalizer;
pub use zeek::ZeekNormalizer;

/// Sensor-specific mapping into the canonical schema.
///
/// `normalize` returns `None` for records the sensor mapping cannot place on
/// the timeline; callers count those as dropped.
pub trait SensorNormalizer {
    fn sensor(&self) -> Sensor;
    fn normalize(&self, raw: &Value) -> Option<NormalizedEvent>;
}

/// Run both sensor normalizers over their raw batches.
///
/// Output preserves input order (Zeek first, then Suricata) and is NOT
/// sorted; callers sort by timestamp before any time-windowed computation.
pub fn normalize_all(
    zeek_raw: &[Value],
    suricata_raw: &[Value],
) -> (Vec<NormalizedEvent>, NormalizeStats) {
    let mut events = Vec::with_capacity(zeek_raw.len() + suricata_raw.len());
    let stats = NormalizeStats {
        zeek: normalize_batch(&ZeekNormalizer, zeek_raw, &mut events),
        suricata: normalize_batch(&SuricataNormalizer, suricata_raw, &mut events),
    };

    log::info!(
        "normalized {} events ({} dropped)",
        stats.total_parsed(),
        stats.total_dropped()
    );
    (events, stats)
}

fn normalize_batch<N: SensorNormalizer>(
    normalizer: &N,
    raw: &[Value],
    out: &mut Vec<NormalizedEvent>,
) -> SensorStats {
    let mut stats = SensorStats::default();
    for record in raw {
        match normalizer.normalize(record) {
            Some(event) => {
                out.push(event);
                stats.parsed += 1;
            }
            None => {
                log::warn!("dropped unmappable {} record", normalizer.sensor());
                stats.dropped += 1;
            }
        }
    }
    stats
}

/// Parse a raw timestamp value into UTC epoch seconds.
///
/// Accepts numeric epoch values, RFC 3339 strings (Suricata writes
/// `+0000`-style offsets, also accepted), and numeric strings.
pub(crate) fn parse_timestamp(value: &Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }

    let s = value.as_str()?;
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(to_epoch(dt));
    }
    // Suricata emits offsets without a colon, e.g. "+0000".
    if let Ok(dt) = chrono::DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(to_epoch(dt));
    }
    s.parse::<f64>().ok()
}

fn to_epoch(dt: chrono::DateTime<chrono::FixedOffset>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
}

/// Valid port range is 1-65535; anything else normalizes to `None`.
pub(crate) fn parse_port(value: Option<&Value>) -> Option<u16> {
    let n = match value? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.parse::<u64>().ok()?,
        _ => return None,
    };
    if (1..=65535).contains(&n) {
        Some(n as u16)
    } else {
        None
    }
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
