//! Inbound payload decoding.
//!
//! The relay sends JSON frames such as
//! `{"magneticField":12.50,"rpm":1200,"peakRpm":1500}`; the sensor board
//! sends `{"analog":0,"hall_mT":2310}` with raw ADC counts. Input that is
//! not JSON at all is scanned for the first decimal number instead.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?|\.\d+").expect("number pattern is valid")
});

/// Structured telemetry frame. Every field is optional; a field holding
/// anything but a JSON number reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelemetryFrame {
    /// Field strength in mT, already converted by the relay.
    #[serde(rename = "magneticField", default, deserialize_with = "number")]
    pub magnetic_field: Option<f64>,
    /// Averaged RPM.
    #[serde(default, deserialize_with = "number")]
    pub rpm: Option<f64>,
    /// Highest RPM seen by the relay.
    #[serde(rename = "peakRpm", default, deserialize_with = "number")]
    pub peak_rpm: Option<f64>,
    /// Motor kV rating.
    #[serde(rename = "kV", default, deserialize_with = "number")]
    pub kv: Option<f64>,
    /// Raw hall sensor ADC counts.
    #[serde(rename = "hall_mT", default, deserialize_with = "number")]
    pub hall_raw: Option<f64>,
}

fn number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

impl TelemetryFrame {
    /// Read a frame out of parsed JSON. Values other than objects carry no
    /// fields.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_else(|e| {
            tracing::trace!("Unreadable telemetry frame ({})", e);
            Self::default()
        })
    }
}

/// Decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON telemetry frame.
    Frame(TelemetryFrame),
    /// Plain text; holds the first number found, if any.
    Text(Option<f64>),
}

impl Payload {
    /// Decode a raw message. Never fails: any valid JSON is a frame (possibly
    /// empty), and only text that is not JSON is scanned for a number.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::Frame(TelemetryFrame::from_value(value)),
            Err(e) => {
                tracing::trace!("Payload is not JSON ({}), scanning text", e);
                Self::Text(first_number(text))
            },
        }
    }

    /// The value this payload contributes to the chart, before any raw
    /// sensor conversion.
    pub fn sample(&self) -> Option<f64> {
        match self {
            Self::Frame(frame) => frame.magnetic_field,
            Self::Text(value) => *value,
        }
    }

    /// Raw sensor counts that still need calibration.
    pub fn raw_reading(&self) -> Option<f64> {
        match self {
            Self::Frame(frame) if frame.magnetic_field.is_none() => frame.hall_raw,
            _ => None,
        }
    }
}

/// First unsigned decimal number in `text`.
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_relay_frame() {
        let payload = Payload::parse(r#"{"magneticField":12.5,"rpm":1200,"peakRpm":1500}"#);
        let Payload::Frame(frame) = &payload else {
            panic!("expected a frame, got {payload:?}");
        };
        assert_eq!(frame.rpm, Some(1200.0));
        assert_eq!(frame.peak_rpm, Some(1500.0));
        assert_eq!(frame.kv, None);
        assert_eq!(payload.sample(), Some(12.5));
        assert_eq!(payload.raw_reading(), None);
    }

    #[test]
    fn frame_without_field_has_no_sample() {
        let payload = Payload::parse(r#"{"rpm":900,"kV":2300}"#);
        assert_eq!(payload.sample(), None);
        match payload {
            Payload::Frame(frame) => assert_eq!(frame.kv, Some(2300.0)),
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn sensor_frame_exposes_raw_reading() {
        let payload = Payload::parse(r#"{"analog":0,"hall_mT":2310}"#);
        assert_eq!(payload.sample(), None);
        assert_eq!(payload.raw_reading(), Some(2310.0));
    }

    #[test]
    fn plain_text_falls_back_to_first_number() {
        let payload = Payload::parse("garbage 42.3 text");
        assert_eq!(payload, Payload::Text(Some(42.3)));
        assert_eq!(payload.sample(), Some(42.3));
    }

    #[test]
    fn json_scalars_and_arrays_carry_no_sample() {
        for text in ["42.3", "[7,8]", r#""5""#, "null", "true"] {
            let payload = Payload::parse(text);
            assert_eq!(payload, Payload::Frame(TelemetryFrame::default()), "{text}");
            assert_eq!(payload.sample(), None, "{text}");
        }
    }

    #[test]
    fn wrongly_typed_fields_read_as_absent() {
        let payload = Payload::parse(r#"{"rpm":"1200"}"#);
        assert_eq!(payload, Payload::Frame(TelemetryFrame::default()));
        assert_eq!(payload.sample(), None);

        let payload = Payload::parse(r#"{"magneticField":"12.5","kV":920,"hall_mT":null}"#);
        let Payload::Frame(frame) = &payload else {
            panic!("expected a frame, got {payload:?}");
        };
        assert_eq!(frame.magnetic_field, None);
        assert_eq!(frame.kv, Some(920.0));
        assert_eq!(payload.raw_reading(), None);
    }

    #[test]
    fn malformed_json_is_scanned_as_text() {
        assert_eq!(Payload::parse(r#"{"magneticField": 3.5"#), Payload::Text(Some(3.5)));
    }

    #[test]
    fn text_without_number_yields_nothing() {
        assert_eq!(Payload::parse("no digits here").sample(), None);
        assert_eq!(Payload::parse("...").sample(), None);
        assert_eq!(Payload::parse("").sample(), None);
    }

    #[test]
    fn first_number_ignores_sign_and_takes_first_match() {
        assert_eq!(first_number("field=-3.5 next=9"), Some(3.5));
        assert_eq!(first_number("v.75"), Some(0.75));
        assert_eq!(first_number("12 then 13"), Some(12.0));
    }
}
