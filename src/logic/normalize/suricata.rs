//! Suricata EVE field mapping.
//!
//! EVE records come in two address shapes: flat `src_ip`/`dest_ip` columns
//! and the nested `source`/`dest` objects used by flow records. Alert
//! severity and signature are hoisted out of the `alert` object; the fields
//! of the `dns` object are hoisted into metadata so the queried domain and
//! rcode are reachable the same way for both sensors.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{parse_port, parse_timestamp, value_to_string, SensorNormalizer};
use crate::logic::event::{NormalizedEvent, Sensor};

const CONSUMED: &[&str] = &[
    "timestamp",
    "time",
    "sensor",
    "event_type",
    "src_ip",
    "dest_ip",
    "src_port",
    "dest_port",
    "source",
    "dest",
    "proto",
    "flow_id",
    "dns",
];

pub struct SuricataNormalizer;

impl SensorNormalizer for SuricataNormalizer {
    fn sensor(&self) -> Sensor {
        Sensor::Suricata
    }

    fn normalize(&self, raw: &Value) -> Option<NormalizedEvent> {
        let obj = raw.as_object()?;
        let ts = parse_timestamp(obj.get("timestamp").or_else(|| obj.get("time"))?)?;

        let (src_ip, dst_ip, src_port, dst_port) = extract_endpoints(obj);

        let alert = obj.get("alert").and_then(|v| v.as_object());
        let severity = alert
            .and_then(|a| a.get("severity"))
            .and_then(|v| v.as_u64())
            .and_then(|n| u8::try_from(n).ok());
        let signature = alert
            .and_then(|a| a.get("signature"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut metadata: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in obj {
            if !CONSUMED.contains(&key.as_str()) {
                metadata.insert(key.clone(), value.clone());
            }
        }
        // Hoist dns.* so domain()/is_nxdomain() work without digging.
        if let Some(dns) = obj.get("dns").and_then(|v| v.as_object()) {
            for (key, value) in dns {
                metadata.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        Some(NormalizedEvent {
            ts,
            sensor: Sensor::Suricata,
            event_type: obj
                .get("event_type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            src_ip,
            dst_ip,
            src_port,
            dst_port,
            proto: obj
                .get("proto")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_lowercase(),
            correlation_id: obj.get("flow_id").and_then(value_to_string),
            severity,
            signature,
            metadata,
        })
    }
}

type Endpoints = (
    Option<String>,
    Option<String>,
    Option<u16>,
    Option<u16>,
);

fn extract_endpoints(obj: &serde_json::Map<String, Value>) -> Endpoints {
    if obj.contains_key("src_ip") {
        (
            obj.get("src_ip").and_then(|v| v.as_str()).map(str::to_string),
            obj.get("dest_ip").and_then(|v| v.as_str()).map(str::to_string),
            parse_port(obj.get("src_port")),
            parse_port(obj.get("dest_port")),
        )
    } else if let Some(source) = obj.get("source").and_then(|v| v.as_object()) {
        // Flow format nests the endpoints.
        let dest = obj.get("dest").and_then(|v| v.as_object());
        (
            source.get("ip").and_then(|v| v.as_str()).map(str::to_string),
            dest.and_then(|d| d.get("ip"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            parse_port(source.get("port")),
            parse_port(dest.and_then(|d| d.get("port"))),
        )
    } else {
        (None, None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_mapping() {
        let raw = json!({
            "timestamp": "2024-01-15T10:30:00.000000+0000",
            "sensor": "suricata",
            "event_type": "alert",
            "flow_id": 1234567890_u64,
            "src_ip": "10.0.0.5",
            "src_port": 44123,
            "dest_ip": "203.0.113.7",
            "dest_port": 80,
            "proto": "TCP",
            "alert": {
                "signature": "ET SCAN Suspicious inbound",
                "severity": 2,
                "category": "Attempted Recon"
            }
        });

        let ev = SuricataNormalizer.normalize(&raw).unwrap();

        assert_eq!(ev.sensor, Sensor::Suricata);
        assert_eq!(ev.event_type, "alert");
        assert_eq!(ev.src_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(ev.dst_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(ev.dst_port, Some(80));
        assert_eq!(ev.severity, Some(2));
        assert_eq!(ev.signature.as_deref(), Some("ET SCAN Suspicious inbound"));
        assert_eq!(ev.correlation_id.as_deref(), Some("1234567890"));
        // The alert object itself stays available to reporting.
        assert!(ev.metadata.contains_key("alert"));
    }

    #[test]
    fn test_flow_format_endpoints() {
        let raw = json!({
            "timestamp": "2024-01-15T10:31:00+0000",
            "event_type": "flow",
            "source": {"ip": "10.0.0.5", "port": 50000},
            "dest": {"ip": "10.0.0.40", "port": 22},
            "proto": "TCP"
        });

        let ev = SuricataNormalizer.normalize(&raw).unwrap();

        assert_eq!(ev.src_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(ev.dst_ip.as_deref(), Some("10.0.0.40"));
        assert_eq!(ev.src_port, Some(50000));
        assert_eq!(ev.dst_port, Some(22));
        assert!(ev.is_connection());
    }

    #[test]
    fn test_dns_fields_hoisted() {
        let raw = json!({
            "timestamp": "2024-01-15T10:32:00+0000",
            "event_type": "dns",
            "src_ip": "10.0.0.5",
            "dest_ip": "10.0.0.53",
            "proto": "UDP",
            "dns": {"type": "answer", "rrname": "c2.example.test", "rcode": "NXDOMAIN"}
        });

        let ev = SuricataNormalizer.normalize(&raw).unwrap();

        assert_eq!(ev.domain(), Some("c2.example.test"));
        assert!(ev.is_nxdomain());
        assert!(!ev.metadata.contains_key("dns"));
    }

    #[test]
    fn test_unparseable_timestamp_is_dropped() {
        let raw = json!({
            "timestamp": "last tuesday",
            "event_type": "dns",
            "src_ip": "10.0.0.5"
        });
        assert!(SuricataNormalizer.normalize(&raw).is_none());
    }
}
