//! Timestamp handling for stored records.
//!
//! Timestamps are kept as RFC 3339 text in stored records and parsed on
//! demand. Writing is infallible; parsing maps failure to
//! [`VaultError::MalformedTimestamp`] so report paths can degrade instead of
//! crashing on a damaged record.

use crate::error::VaultError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall-clock time as stored-record text.
pub fn now() -> String {
    format(Utc::now())
}

/// Render a timestamp the way the store writes it.
pub fn format(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// # Errors
///
/// `MalformedTimestamp` carrying the raw text when it is not valid RFC 3339.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, VaultError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| VaultError::MalformedTimestamp {
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_round_trips() {
        let raw = now();
        parse(&raw).unwrap();
    }

    #[test]
    fn format_is_stable() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format(at), "2026-03-14T09:26:53.000000Z");
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse("last tuesday").unwrap_err();
        match err {
            VaultError::MalformedTimestamp { raw } => assert_eq!(raw, "last tuesday"),
            other => panic!("expected MalformedTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn successive_now_calls_non_decreasing() {
        let a = parse(&now()).unwrap();
        let b = parse(&now()).unwrap();
        assert!(b >= a);
    }
}
