//! External Event Types
//!
//! Telemetry, activity, and attention events consumed by the engine, plus the
//! payload extraction rules that normalize duck-typed JSON payloads at the
//! boundary. Downstream code only ever sees `Option<f64>` / `Option<f32>`,
//! never a raw payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single sensor reading pushed by the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Sensor the reading belongs to
    pub sensor_id: String,

    /// Attribute within the sensor
    pub attribute_id: String,

    /// Raw payload; shape varies by device firmware
    pub payload: Value,

    /// Wall-clock time the reading was taken
    pub timestamp: DateTime<Utc>,
}

/// A burst of activity on a sensor and some of its attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub sensor_id: String,
    pub attribute_ids: Vec<String>,
}

/// Attention level assigned to a sensor by an external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionLevel {
    High,
    Medium,
    Low,
    None,
}

/// Attention change for a sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionEvent {
    pub sensor_id: String,
    pub level: AttentionLevel,
}

/// Extract a plain numeric value from a telemetry payload.
///
/// Rules tried in order: bare number, numeric string, then a `value` field
/// holding either. Anything else is malformed and yields `None`.
pub fn extract_number(payload: &Value) -> Option<f64> {
    match payload {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => match map.get("value") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        },
        _ => None,
    }
}

/// Nested field names that may carry a heart rate, tried in order.
const BPM_KEYS: [&str; 3] = ["bpm", "heart_rate", "heartRate"];

/// Plausible human heart-rate range; readings outside it are noise.
const BPM_RANGE: std::ops::RangeInclusive<f64> = 20.0..=250.0;

/// Extract a BPM value from a heart-rate attribute payload.
///
/// A bare number in the plausible range wins; otherwise nested
/// `bpm`/`heart_rate`/`heartRate` fields are tried in order.
pub fn extract_bpm(payload: &Value) -> Option<f32> {
    if let Value::Number(n) = payload {
        let v = n.as_f64()?;
        return BPM_RANGE.contains(&v).then_some(v as f32);
    }

    if let Value::Object(map) = payload {
        for key in BPM_KEYS {
            if let Some(v) = map.get(key).and_then(extract_number) {
                if BPM_RANGE.contains(&v) {
                    return Some(v as f32);
                }
            }
        }
    }

    None
}

/// Normalize any telemetry payload to a single numeric value.
///
/// The plain rules are tried first, then the heart-rate field names, so a
/// payload is "well-formed" exactly when one of the ordered extraction rules
/// matches.
pub fn normalized_value(payload: &Value) -> Option<f64> {
    extract_number(payload).or_else(|| extract_bpm(payload).map(f64::from))
}

/// Whether an attribute id names a heart-rate channel.
///
/// Gates which telemetry the heartbeat overlay listens to, so a temperature
/// reading of 25.0 is not mistaken for a pulse.
pub fn is_heart_rate_attribute(attribute_id: &str) -> bool {
    let lower = attribute_id.to_lowercase();
    lower.contains("heart") || lower.contains("bpm") || lower == "hr"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_number_shapes() {
        assert_eq!(extract_number(&json!(42.5)), Some(42.5));
        assert_eq!(extract_number(&json!("17")), Some(17.0));
        assert_eq!(extract_number(&json!({"value": 3})), Some(3.0));
        assert_eq!(extract_number(&json!({"value": "9.5"})), Some(9.5));
        assert_eq!(extract_number(&json!({"other": 3})), None);
        assert_eq!(extract_number(&json!(null)), None);
        assert_eq!(extract_number(&json!("not a number")), None);
    }

    #[test]
    fn test_extract_bpm_bare_number() {
        assert_eq!(extract_bpm(&json!(72)), Some(72.0));
        // Out of plausible range
        assert_eq!(extract_bpm(&json!(10)), None);
        assert_eq!(extract_bpm(&json!(400)), None);
    }

    #[test]
    fn test_extract_bpm_nested_keys_in_order() {
        assert_eq!(extract_bpm(&json!({"bpm": 65})), Some(65.0));
        assert_eq!(extract_bpm(&json!({"heart_rate": 80})), Some(80.0));
        assert_eq!(extract_bpm(&json!({"heartRate": 95})), Some(95.0));
        // bpm wins over heartRate when both present
        assert_eq!(extract_bpm(&json!({"heartRate": 95, "bpm": 60})), Some(60.0));
        assert_eq!(extract_bpm(&json!({"bpm": "junk"})), None);
    }

    #[test]
    fn test_heart_rate_attribute_names() {
        assert!(is_heart_rate_attribute("heart_rate"));
        assert!(is_heart_rate_attribute("heartRate"));
        assert!(is_heart_rate_attribute("bpm"));
        assert!(is_heart_rate_attribute("hr"));
        assert!(!is_heart_rate_attribute("temperature"));
    }

    #[test]
    fn test_normalized_value_covers_both_rule_sets() {
        assert_eq!(normalized_value(&json!(3.5)), Some(3.5));
        assert_eq!(normalized_value(&json!({"bpm": 72})), Some(72.0));
        assert_eq!(normalized_value(&json!({"weird": true})), None);
    }

    #[test]
    fn test_attention_level_wire_format() {
        let level: AttentionLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, AttentionLevel::High);
        let level: AttentionLevel = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(level, AttentionLevel::None);
    }
}
