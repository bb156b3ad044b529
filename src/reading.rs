//! Sensor reading record and block parser.
//!
//! The radio bridge prints one reading as a block of `key=value` lines plus
//! a single timestamp-shaped line, terminated by the `battery` line:
//!
//! ```text
//! type=F007TH
//! channel=3
//! rolling code=0x60 (96)
//! temperature=35.0F
//! humidity=40%
//! 2025-09-14 12:00:00-0600
//! battery=OK
//! ```
//!
//! Parsing is lossy by policy: a malformed field is dropped, the rest of the
//! record survives. A block never fails as a whole.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Wire timestamp format, e.g. `2025-09-14 12:00:00-0600`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}[-+]\d{4}").expect("timestamp pattern")
});

/// One structured sensor observation, immutable after creation.
///
/// Field names mirror the collector's wire format (`type`, `time`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    /// Whole degrees as printed by the bridge (`35.0F` parses to 35).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_ok: Option<bool>,
    #[serde(
        rename = "time",
        default,
        with = "wire_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_code: Option<u32>,
    /// Relay state at ingestion time.
    #[serde(default)]
    pub relay: bool,
    /// Occupancy-window state at ingestion time.
    #[serde(default)]
    pub occupied: bool,
}

impl Reading {
    pub fn empty() -> Self {
        Self {
            model: None,
            channel: None,
            temperature: None,
            humidity: None,
            battery_ok: None,
            timestamp: None,
            rolling_code: None,
            relay: false,
            occupied: false,
        }
    }
}

/// True if this line closes a reading block (its key is `battery`).
pub fn is_block_terminator(line: &str) -> bool {
    match line.split_once('=') {
        Some((key, _)) => key.trim().eq_ignore_ascii_case("battery"),
        None => false,
    }
}

/// Parse one block of bridge output into a [`Reading`].
///
/// Unrecognised lines and malformed values are skipped; the record keeps
/// whatever fields did parse.
pub fn parse_block<S: AsRef<str>>(lines: &[S]) -> Reading {
    let mut reading = Reading::empty();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(m) = TIMESTAMP_RE.find(line) {
            if let Ok(ts) = DateTime::parse_from_str(m.as_str(), TIMESTAMP_FORMAT) {
                reading.timestamp = Some(ts);
            }
            continue;
        }

        let Some((key, val)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let val = val.trim();

        match key.as_str() {
            "type" => reading.model = Some(val.to_string()),
            "channel" => reading.channel = val.parse().ok(),
            // e.g. `rolling code=0x60 (96)` — the decimal inside the parens.
            "rolling code" => {
                if let Some(open) = val.rfind('(') {
                    reading.rolling_code =
                        val[open + 1..].trim_end_matches(')').trim().parse().ok();
                }
            }
            "temperature" => {
                reading.temperature = val
                    .trim_end_matches(['F', 'f'])
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|t| t as i32);
            }
            "humidity" => {
                reading.humidity = val.trim_end_matches('%').trim().parse().ok();
            }
            "battery" => reading.battery_ok = Some(val.eq_ignore_ascii_case("ok")),
            _ => {}
        }
    }

    reading
}

/// Serde helpers for the `time` field in the collector wire format.
mod wire_time {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<FixedOffset>>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(t) => ser.serialize_str(&t.format(TIMESTAMP_FORMAT).to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        match raw {
            Some(s) => DateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_block_round_trips() {
        let lines = [
            "type=F007TH",
            "channel=3",
            "temperature=35.0F",
            "humidity=40%",
            "2025-09-14 12:00:00-0600",
            "battery=OK",
        ];
        let r = parse_block(&lines);
        assert_eq!(r.model.as_deref(), Some("F007TH"));
        assert_eq!(r.channel, Some(3));
        assert_eq!(r.temperature, Some(35));
        assert_eq!(r.humidity, Some(40));
        assert_eq!(r.battery_ok, Some(true));
        let ts = r.timestamp.expect("timestamp parsed");
        assert_eq!(
            ts.format(TIMESTAMP_FORMAT).to_string(),
            "2025-09-14 12:00:00-0600"
        );
    }

    #[test]
    fn rolling_code_takes_parenthesised_decimal() {
        let r = parse_block(&["rolling code=0x60 (96)", "battery=OK"]);
        assert_eq!(r.rolling_code, Some(96));
    }

    #[test]
    fn malformed_fields_are_omitted_not_fatal() {
        let lines = [
            "channel=garden",
            "temperature=cold",
            "humidity=lots",
            "battery=LOW",
        ];
        let r = parse_block(&lines);
        assert_eq!(r.channel, None);
        assert_eq!(r.temperature, None);
        assert_eq!(r.humidity, None);
        assert_eq!(r.battery_ok, Some(false));
    }

    #[test]
    fn terminator_matches_battery_key_only() {
        assert!(is_block_terminator("battery=OK"));
        assert!(is_block_terminator("  Battery = Low"));
        assert!(!is_block_terminator("battery_level=5"));
        assert!(!is_block_terminator("temperature=35.0F"));
        assert!(!is_block_terminator("battery"));
    }

    #[test]
    fn json_matches_wire_format() {
        let lines = [
            "type=F007TH",
            "channel=1",
            "temperature=72F",
            "2025-09-14 12:00:00-0600",
            "battery=OK",
        ];
        let r = parse_block(&lines);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "F007TH");
        assert_eq!(json["time"], "2025-09-14 12:00:00-0600");
        assert_eq!(json["temperature"], 72);
        assert_eq!(json["relay"], false);

        let back: Reading = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn timestamp_survives_serde() {
        let r = parse_block(&["2025-01-02 03:04:05+0130", "battery=OK"]);
        let line = serde_json::to_string(&r).unwrap();
        let back: Reading = serde_json::from_str(&line).unwrap();
        assert_eq!(back.timestamp, r.timestamp);
    }
}
