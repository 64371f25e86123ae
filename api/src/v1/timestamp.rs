//! Serde helpers for server timestamps.
//!
//! The server sends some instants as RFC 3339 and some as naive ISO 8601
//! without an offset, e.g. `2026-10-16T12:00:00.123000`. Naive values are
//! UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::Error, Deserialize, Deserializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn parse(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(input, NAIVE_FORMAT).ok()?;
    Some(naive.and_utc())
}

pub(crate) fn utc_or_naive<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = String::deserialize(deserializer)?;
    parse(&input).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{}`", input)))
}

pub(crate) fn option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(input) => match parse(&input) {
            Some(instant) => Ok(Some(instant)),
            None => Err(D::Error::custom(format!("invalid timestamp `{}`", input))),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn accepts_rfc3339_with_any_offset() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

        assert_eq!(parse("2026-10-16T12:00:00Z"), Some(expected));
        assert_eq!(parse("2026-10-16T14:00:00+02:00"), Some(expected));
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);

        assert_eq!(parse("2026-10-16T12:00:00.123000"), Some(expected));
        assert_eq!(
            parse("2026-10-16T12:00:00"),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("2026-10-16"), None);
    }
}
