//! `date_used` serde helpers.
//!
//! Timestamps are local wall-clock times written without an offset
//! (`2026-01-15T08:00:00.123456`). Reading is lenient: anything that does not
//! parse as a timestamp becomes `None` instead of failing the whole record.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time, as stamped on newly saved records.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse an ISO-8601 timestamp with or without offset, or a bare date.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<NaiveDateTime>() {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse))
}
