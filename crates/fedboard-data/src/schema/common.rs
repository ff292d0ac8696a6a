use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::error;

/// Convert a `YYYY-MM-DD` string to a chrono::NaiveDate.
pub fn convert_date_type(str_date: &str) -> anyhow::Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(str_date, "%Y-%m-%d").map_err(|e| {
        error!("failed to parse date string; expected form YYYY-MM-DD - received: {str_date}");
        e
    })?;
    Ok(date)
}

/// FRED sends every value as a string and marks gaps with "."; anything that
/// is not a number comes out as `None`.
pub fn de_fred_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
        serde_json::Value::Number(num) => Ok(num.as_f64()),
        _ => Ok(None),
    }
}

/// Trading Economics reports importance as an integer, but older payloads
/// carry it as a string and some as a float. Anything else is `None`.
pub fn de_importance<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(num) => Ok(num
            .as_i64()
            .or_else(|| num.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))),
        serde_json::Value::String(s) => {
            let s = s.trim();
            Ok(s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64)))
        }
        _ => Ok(None),
    }
}

/// Calendar fields that are sometimes numbers, sometimes strings, often blank.
pub fn de_loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(num) => Ok(Some(num.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Ok(None),
    }
}

/// Timestamps with an offset are honoured; bare ones are taken as UTC.
pub fn parse_utc_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| {
            error!("failed to parse timestamp: {raw}");
            e
        })?;
    Ok(naive.and_utc())
}

/// First `limit` characters of an upstream body, for error messages.
pub fn excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
