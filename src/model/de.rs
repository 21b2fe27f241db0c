//! Field deserializers for backend payloads that are looser than the types they fill.
//!
//! A malformed optional field degrades to its default with a warning so that one odd row never
//! fails the whole snapshot.

use crate::model::BudgetPeriod;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `2025-10-20`, an RFC 3339 timestamp, or a timestamp without an offset, and keeps the
/// calendar date.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// A required date in any of the forms `parse_date` knows.
pub(super) fn date_or_datetime<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'")))
}

/// An optional date. Null is `None`; anything unparseable is `None` with a warning.
pub(super) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => {
            let date = parse_date(&s);
            if date.is_none() {
                warn!("Unable to parse '{s}' as a date, ignoring it");
            }
            date
        }
        other => {
            warn!("Non-string date {other} ignored");
            None
        }
    })
}

/// A budget period in any case. Null is the default; an unknown value is the default with a
/// warning.
pub(super) fn lenient_budget_period<'de, D>(deserializer: D) -> Result<BudgetPeriod, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => BudgetPeriod::default(),
        Value::String(s) => BudgetPeriod::from_str(&s.trim().to_uppercase()).unwrap_or_else(|_| {
            warn!("Unknown budget period '{s}', using {}", BudgetPeriod::default());
            BudgetPeriod::default()
        }),
        other => {
            warn!("Unknown budget period {other}, using {}", BudgetPeriod::default());
            BudgetPeriod::default()
        }
    })
}

/// A boolean flag that is `true` unless the backend clearly says `false`.
pub(super) fn true_unless_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Null => true,
        Value::String(s) if s.eq_ignore_ascii_case("false") => false,
        Value::String(s) if s.eq_ignore_ascii_case("true") => true,
        other => {
            warn!("Unexpected flag value {other}, treating it as true");
            true
        }
    })
}
