//! ISO-8601 timestamp (de)serialization for persisted state.
//!
//! Written as RFC 3339 in UTC with as many fractional digits as the value
//! needs, so sub-second precision survives a save/load cycle. Read back from
//! either an offset-carrying RFC 3339 string or a naive
//! `YYYY-MM-DDTHH:MM:SS[.ffffff]` string, which is taken as local time.
//!
//! Use with `#[serde(with = "crate::timestamp")]`.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format a timestamp for persistence.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a persisted timestamp. Returns `None` for unrecognized input.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = s.parse::<NaiveDateTime>().ok()?;
    let offset = Local.offset_from_utc_datetime(&naive).local_minus_utc();
    Some(resolve_local(Local.from_local_datetime(&naive), naive, offset))
}

/// Pick the instant for a local wall-clock time. Ambiguous times take the
/// earlier instant; times skipped by a clock change use `offset_secs`.
fn resolve_local<Tz: TimeZone>(
    local: LocalResult<DateTime<Tz>>,
    naive: NaiveDateTime,
    offset_secs: i32,
) -> DateTime<Utc> {
    match local.earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => naive.and_utc() - Duration::seconds(i64::from(offset_secs)),
    }
}

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
