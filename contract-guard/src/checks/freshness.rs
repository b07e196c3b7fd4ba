//! Freshness check: age of the newest value in a timestamp column.

use crate::checks::Check;
use crate::engine::CheckRecord;
use crate::results::CheckResultDetail;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Time unit of a freshness threshold, encoded in the check-type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessUnit {
    Days,
    Hours,
    Minutes,
}

impl FreshnessUnit {
    /// Maps a check-type token onto its unit, e.g. `freshness_in_hours`.
    pub fn from_check_type(check_type: &str) -> Option<Self> {
        match check_type {
            "freshness_in_days" => Some(FreshnessUnit::Days),
            "freshness_in_hours" => Some(FreshnessUnit::Hours),
            "freshness_in_minutes" => Some(FreshnessUnit::Minutes),
            _ => None,
        }
    }

    /// The unit suffix appended to the rendered threshold.
    pub fn suffix(&self) -> &'static str {
        match self {
            FreshnessUnit::Days => "d",
            FreshnessUnit::Hours => "h",
            FreshnessUnit::Minutes => "m",
        }
    }
}

/// Timestamp diagnostics reported by the engine for a freshness check.
///
/// Values are kept verbatim as the engine rendered them so the report stays
/// byte-stable; `parsed_*` accessors expose the UTC timestamps as typed
/// values where callers need arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FreshnessDiagnostics {
    /// Measured freshness, e.g. `"0:06:00"`.
    pub freshness: Option<String>,
    pub max_column_timestamp: Option<String>,
    pub max_column_timestamp_utc: Option<String>,
    pub now_timestamp: Option<String>,
    pub now_timestamp_utc: Option<String>,
}

impl FreshnessDiagnostics {
    /// The newest column value as a typed UTC timestamp, when parseable.
    pub fn parsed_max_column_timestamp_utc(&self) -> Option<DateTime<Utc>> {
        parse_utc(self.max_column_timestamp_utc.as_deref()?)
    }

    /// The engine's "now" as a typed UTC timestamp, when parseable.
    pub fn parsed_now_timestamp_utc(&self) -> Option<DateTime<Utc>> {
        parse_utc(self.now_timestamp_utc.as_deref()?)
    }
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Reduces a freshness check record into its result detail. Missing
/// diagnostics entries reduce to `None`, never a failure.
pub(crate) fn reduce(check: &Check, record: &CheckRecord) -> CheckResultDetail {
    CheckResultDetail::Freshness {
        expected: check.expected_str(),
        metric: check.metric_str(),
        diagnostics: FreshnessDiagnostics {
            freshness: record.diagnostic_str("freshness"),
            max_column_timestamp: record.diagnostic_str("maxColumnTimestamp"),
            max_column_timestamp_utc: record.diagnostic_str("maxColumnTimestampUtc"),
            now_timestamp: record.diagnostic_str("nowTimestamp"),
            now_timestamp_utc: record.diagnostic_str("nowTimestampUtc"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{create_identity, CheckVariant};
    use crate::diagnostics::Logs;
    use crate::results::CheckOutcome;
    use crate::threshold::Threshold;
    use serde_json::json;

    fn freshness_check(check_type: &str) -> Check {
        let unit = FreshnessUnit::from_check_type(check_type).unwrap();
        Check {
            verification_context: "ds/public/orders".to_string(),
            check_type: check_type.to_string(),
            identity: create_identity("ds/public/orders", check_type, None),
            name: None,
            dataset: "orders".to_string(),
            column: Some("created_at".to_string()),
            skip: false,
            threshold: Threshold {
                less_than: Some(1.into()),
                ..Default::default()
            },
            missing_configurations: None,
            valid_configurations: None,
            variant: CheckVariant::Freshness { unit },
        }
    }

    #[test]
    fn test_unit_from_check_type() {
        assert_eq!(
            FreshnessUnit::from_check_type("freshness_in_days"),
            Some(FreshnessUnit::Days)
        );
        assert_eq!(
            FreshnessUnit::from_check_type("freshness_in_hours"),
            Some(FreshnessUnit::Hours)
        );
        assert_eq!(
            FreshnessUnit::from_check_type("freshness_in_minutes"),
            Some(FreshnessUnit::Minutes)
        );
        assert_eq!(FreshnessUnit::from_check_type("freshness"), None);
    }

    #[test]
    fn test_compiles_line_with_unit_suffix() {
        let check = freshness_check("freshness_in_days");
        assert_eq!(check.check_line(), "freshness(created_at) < 1d");
        let expression = check.to_check_expression();
        assert_eq!(expression.key, "freshness(created_at) < 1d");
    }

    #[test]
    fn test_reduce_reads_all_timestamp_diagnostics() {
        let mut logs = Logs::new();
        let check = freshness_check("freshness_in_hours");
        let record: CheckRecord = serde_json::from_value(json!({
            "outcome": "pass",
            "diagnostics": {
                "freshness": "0:06:00",
                "maxColumnTimestamp": "2026-08-26 20:51:32",
                "maxColumnTimestampUtc": "2026-08-26T18:51:32+00:00",
                "nowTimestamp": "2026-08-26 20:57:32",
                "nowTimestampUtc": "2026-08-26T18:57:32+00:00"
            }
        }))
        .unwrap();
        let result = check.create_check_result(&record, &mut logs);
        assert_eq!(result.outcome, CheckOutcome::Pass);
        match result.detail {
            CheckResultDetail::Freshness { diagnostics, .. } => {
                assert_eq!(diagnostics.freshness.as_deref(), Some("0:06:00"));
                let max_utc = diagnostics.parsed_max_column_timestamp_utc().unwrap();
                let now_utc = diagnostics.parsed_now_timestamp_utc().unwrap();
                assert_eq!((now_utc - max_utc).num_minutes(), 6);
            }
            other => panic!("expected freshness detail, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_tolerates_absent_diagnostics() {
        let mut logs = Logs::new();
        let check = freshness_check("freshness_in_minutes");
        let record = CheckRecord::default();
        let result = check.create_check_result(&record, &mut logs);
        assert_eq!(result.outcome, CheckOutcome::Unknown);
        match result.detail {
            CheckResultDetail::Freshness { diagnostics, .. } => {
                assert_eq!(diagnostics, FreshnessDiagnostics::default());
            }
            other => panic!("expected freshness detail, got {other:?}"),
        }
    }
}
