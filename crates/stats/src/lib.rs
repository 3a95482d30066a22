//! Derived statistics over the vault ledger.
//!
//! A stateless, read-only view: nothing here mutates the ledger, and nothing
//! here fails. Against an ephemeral or empty store every query returns the
//! "none / 0" degraded result, because these numbers feed an advisory report,
//! not a safety decision.

#![warn(missing_docs)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use vaultguard_core::{timestamp, EventKind, VaultError, VaultEvent};
use vaultguard_ledger::Ledger;

/// Length of the rolling window used for the weekly open count.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Snapshot of access statistics derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessReport {
    /// Most recent `Opened` event, if the vault was ever opened.
    pub last_opened: Option<VaultEvent>,
    /// Number of `Opened` events in the trailing seven days.
    pub weekly_open_count: u64,
}

impl AccessReport {
    /// Usage classification for this report's weekly count.
    pub fn usage_level(&self) -> UsageLevel {
        UsageLevel::classify(self.weekly_open_count)
    }
}

/// Compute the access report from the ledger.
///
/// Never mutates and never errs: a store with no (readable) data yields
/// `last_opened: None, weekly_open_count: 0`.
pub fn access_report(ledger: &Ledger) -> AccessReport {
    AccessReport {
        last_opened: ledger.latest(EventKind::Opened),
        weekly_open_count: ledger.count_since(
            EventKind::Opened,
            Duration::days(WEEKLY_WINDOW_DAYS),
        ),
    }
}

/// Advisory classification of weekly vault usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageLevel {
    /// More than 10 opens in the window.
    Excessive,
    /// 6 to 10 opens inclusive.
    Moderate,
    /// 5 or fewer opens.
    Minimal,
}

impl UsageLevel {
    /// Classify a weekly open count.
    pub fn classify(weekly_open_count: u64) -> Self {
        if weekly_open_count > 10 {
            UsageLevel::Excessive
        } else if weekly_open_count > 5 {
            UsageLevel::Moderate
        } else {
            UsageLevel::Minimal
        }
    }

    /// Upper-case label used in the rendered report.
    pub fn label(&self) -> &'static str {
        match self {
            UsageLevel::Excessive => "EXCESSIVE",
            UsageLevel::Moderate => "MODERATE",
            UsageLevel::Minimal => "MINIMAL",
        }
    }
}

impl fmt::Display for UsageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whole-day / whole-hour decomposition of time since the last open.
///
/// Plain duration math, not calendar-aware: `days` is the whole-day count of
/// the elapsed duration and `hours` is the remaining `hours mod 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elapsed {
    /// Whole days elapsed.
    pub days: i64,
    /// Remaining whole hours past the day boundary.
    pub hours: i64,
}

impl Elapsed {
    /// Decompose the time between a stored timestamp and now.
    ///
    /// # Errors
    ///
    /// `MalformedTimestamp` when the stored text cannot be parsed. The
    /// report path renders that as "unknown" rather than propagating.
    pub fn since(raw: &str) -> Result<Elapsed, VaultError> {
        Ok(Self::between(timestamp::parse(raw)?, Utc::now()))
    }

    /// Decompose the duration between two instants.
    pub fn between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> Elapsed {
        let hours = (later - earlier).num_hours();
        Elapsed {
            days: hours / 24,
            hours: hours % 24,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days, {} hours", self.days, self.hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn classification_thresholds() {
        assert_eq!(UsageLevel::classify(0), UsageLevel::Minimal);
        assert_eq!(UsageLevel::classify(5), UsageLevel::Minimal);
        assert_eq!(UsageLevel::classify(6), UsageLevel::Moderate);
        assert_eq!(UsageLevel::classify(10), UsageLevel::Moderate);
        assert_eq!(UsageLevel::classify(11), UsageLevel::Excessive);
    }

    #[test]
    fn labels_render_upper_case() {
        assert_eq!(UsageLevel::Excessive.to_string(), "EXCESSIVE");
        assert_eq!(UsageLevel::Moderate.to_string(), "MODERATE");
        assert_eq!(UsageLevel::Minimal.to_string(), "MINIMAL");
    }

    #[test]
    fn report_on_empty_ledger_is_degraded() {
        let ledger = Ledger::ephemeral();
        let report = access_report(&ledger);
        assert!(report.last_opened.is_none());
        assert_eq!(report.weekly_open_count, 0);
        assert_eq!(report.usage_level(), UsageLevel::Minimal);
    }

    #[test]
    fn report_counts_only_opens() {
        let ledger = Ledger::ephemeral();
        ledger.append(EventKind::Opened, "fix alarm", "set alarm").unwrap();
        ledger.append(EventKind::Secured, "", "").unwrap();

        let report = access_report(&ledger);
        assert_eq!(report.weekly_open_count, 1);
        assert_eq!(report.last_opened.unwrap().details, "fix alarm");
    }

    #[test]
    fn report_never_mutates() {
        let ledger = Ledger::ephemeral();
        ledger.append(EventKind::Opened, "", "").unwrap();
        let before = ledger.events();
        access_report(&ledger);
        access_report(&ledger);
        assert_eq!(ledger.events(), before);
    }

    #[test]
    fn elapsed_decomposes_days_and_hours() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 20, 6, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 22, 9, 30, 0).unwrap();
        let elapsed = Elapsed::between(earlier, later);
        assert_eq!(elapsed, Elapsed { days: 2, hours: 3 });
        assert_eq!(elapsed.to_string(), "2 days, 3 hours");
    }

    #[test]
    fn elapsed_under_a_day() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 22, 6, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 22, 9, 0, 0).unwrap();
        assert_eq!(Elapsed::between(earlier, later), Elapsed { days: 0, hours: 3 });
    }

    #[test]
    fn elapsed_from_malformed_timestamp_is_typed_error() {
        match Elapsed::since("yesterday-ish") {
            Err(VaultError::MalformedTimestamp { raw }) => assert_eq!(raw, "yesterday-ish"),
            other => panic!("expected MalformedTimestamp, got {other:?}"),
        }
    }
}
