//! Zeek field mapping.
//!
//! Zeek JSON logs carry the connection 4-tuple under `id.*` keys and an
//! epoch-float `ts`. Zeek has no per-record severity or signature; those
//! columns stay empty.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{parse_port, parse_timestamp, SensorNormalizer};
use crate::logic::event::{NormalizedEvent, Sensor};

/// Raw keys consumed into canonical columns; everything else is metadata.
const CONSUMED: &[&str] = &[
    "ts",
    "sensor",
    "event_type",
    "id.orig_h",
    "id.resp_h",
    "id.orig_p",
    "id.resp_p",
    "proto",
    "uid",
];

pub struct ZeekNormalizer;

impl SensorNormalizer for ZeekNormalizer {
    fn sensor(&self) -> Sensor {
        Sensor::Zeek
    }

    fn normalize(&self, raw: &Value) -> Option<NormalizedEvent> {
        let obj = raw.as_object()?;
        let ts = parse_timestamp(obj.get("ts")?)?;

        let mut metadata: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in obj {
            if !CONSUMED.contains(&key.as_str()) {
                metadata.insert(key.clone(), value.clone());
            }
        }

        Some(NormalizedEvent {
            ts,
            sensor: Sensor::Zeek,
            event_type: obj
                .get("event_type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            src_ip: obj
                .get("id.orig_h")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            dst_ip: obj
                .get("id.resp_h")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            src_port: parse_port(obj.get("id.orig_p")),
            dst_port: parse_port(obj.get("id.resp_p")),
            proto: obj
                .get("proto")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_lowercase(),
            correlation_id: obj.get("uid").and_then(|v| v.as_str()).map(str::to_string),
            severity: None,
            signature: None,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conn_mapping() {
        let raw = json!({
            "ts": 1705312200.123,
            "sensor": "zeek",
            "event_type": "conn",
            "uid": "CtPZjS20juxkUvg1Jd",
            "id.orig_h": "192.168.1.10",
            "id.orig_p": 54321,
            "id.resp_h": "10.0.0.9",
            "id.resp_p": 443,
            "proto": "TCP",
            "service": "ssl",
            "duration": 1.5
        });

        let ev = ZeekNormalizer.normalize(&raw).unwrap();

        assert_eq!(ev.ts, 1705312200.123);
        assert_eq!(ev.sensor, Sensor::Zeek);
        assert_eq!(ev.event_type, "conn");
        assert_eq!(ev.src_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(ev.dst_ip.as_deref(), Some("10.0.0.9"));
        assert_eq!(ev.src_port, Some(54321));
        assert_eq!(ev.dst_port, Some(443));
        assert_eq!(ev.proto, "tcp");
        assert_eq!(ev.correlation_id.as_deref(), Some("CtPZjS20juxkUvg1Jd"));
        assert_eq!(ev.severity, None);
        assert_eq!(ev.signature, None);
        // Unmapped fields land in metadata; consumed ones do not.
        assert_eq!(ev.metadata.get("service"), Some(&json!("ssl")));
        assert_eq!(ev.metadata.get("duration"), Some(&json!(1.5)));
        assert!(!ev.metadata.contains_key("id.orig_h"));
    }

    #[test]
    fn test_dns_query_reachable_via_metadata() {
        let raw = json!({
            "ts": 1705312300.0,
            "event_type": "dns",
            "id.orig_h": "192.168.1.10",
            "query": "beacon.example.test",
            "rcode_name": "NXDOMAIN"
        });

        let ev = ZeekNormalizer.normalize(&raw).unwrap();

        assert_eq!(ev.domain(), Some("beacon.example.test"));
        assert!(ev.is_nxdomain());
    }

    #[test]
    fn test_missing_ts_is_dropped() {
        assert!(ZeekNormalizer
            .normalize(&json!({"event_type": "conn", "id.orig_h": "10.0.0.1"}))
            .is_none());
        assert!(ZeekNormalizer
            .normalize(&json!({"ts": "not a time", "event_type": "conn"}))
            .is_none());
        assert!(ZeekNormalizer.normalize(&json!("just a string")).is_none());
    }
}
