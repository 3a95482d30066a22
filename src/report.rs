//! Renders the statistics engine's output into the advisory report.
//!
//! Pure formatting; no side effects. The only failure mode in its inputs is
//! a malformed stored timestamp, which renders as "unknown".

use vaultguard_stats::{AccessReport, Elapsed};

/// Render an [`AccessReport`] as the fixed-format advisory string.
pub fn render_report(report: &AccessReport) -> String {
    let last = match &report.last_opened {
        Some(event) => event,
        None => {
            return "The vault remains unopened. The device is safely secured.".to_string();
        }
    };

    let since = match Elapsed::since(&last.timestamp) {
        Ok(elapsed) => elapsed.to_string(),
        Err(_) => "unknown".to_string(),
    };

    format!(
        "Vault Access Report:\n\
         Last opened: {timestamp}\n\
         Purpose: {purpose}\n\
         Time since last access: {since}\n\
         Weekly access count: {count} times\n\
         \n\
         Analysis: {level} vault usage this week.",
        timestamp = last.timestamp,
        purpose = last.usage_intent,
        since = since,
        count = report.weekly_open_count,
        level = report.usage_level(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultguard_core::{timestamp, EventId, EventKind, VaultEvent};

    fn opened_event(timestamp: String) -> VaultEvent {
        VaultEvent {
            id: EventId(1),
            kind: EventKind::Opened,
            timestamp,
            details: "fix alarm".to_string(),
            usage_intent: "set morning alarm".to_string(),
        }
    }

    #[test]
    fn empty_history_reports_unopened() {
        let report = AccessReport {
            last_opened: None,
            weekly_open_count: 0,
        };
        assert!(render_report(&report).contains("remains unopened"));
    }

    #[test]
    fn report_includes_purpose_count_and_level() {
        let report = AccessReport {
            last_opened: Some(opened_event(timestamp::now())),
            weekly_open_count: 1,
        };
        let rendered = render_report(&report);
        assert!(rendered.contains("Purpose: set morning alarm"));
        assert!(rendered.contains("Weekly access count: 1 times"));
        assert!(rendered.contains("Analysis: MINIMAL vault usage this week."));
    }

    #[test]
    fn moderate_and_excessive_levels_render() {
        for (count, label) in [(7, "MODERATE"), (12, "EXCESSIVE")] {
            let report = AccessReport {
                last_opened: Some(opened_event(timestamp::now())),
                weekly_open_count: count,
            };
            assert!(render_report(&report).contains(label));
        }
    }

    #[test]
    fn malformed_timestamp_renders_unknown() {
        let report = AccessReport {
            last_opened: Some(opened_event("garbage".to_string())),
            weekly_open_count: 2,
        };
        let rendered = render_report(&report);
        assert!(rendered.contains("Time since last access: unknown"));
        // The rest of the report still renders.
        assert!(rendered.contains("Weekly access count: 2 times"));
    }

    #[test]
    fn elapsed_line_uses_days_and_hours() {
        let two_days_ago = chrono::Utc::now() - chrono::Duration::hours(51);
        let report = AccessReport {
            last_opened: Some(opened_event(timestamp::format(two_days_ago))),
            weekly_open_count: 3,
        };
        assert!(render_report(&report).contains("Time since last access: 2 days, 3 hours"));
    }
}
