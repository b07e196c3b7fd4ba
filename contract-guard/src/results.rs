//! Typed check outcomes, result payloads and the text report.
//!
//! The multi-line text rendering produced here is the primary human-facing
//! report. Its format is fixed: an outcome/name header line followed by
//! detail lines with a leading two-space indent. Existing log scraping
//! depends on these exact shapes, so changes here are breaking.

use crate::checks::freshness::FreshnessDiagnostics;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Pass/Fail/Unknown classification of a check result.
///
/// Derived exclusively from the engine's raw outcome token; the threshold is
/// never re-evaluated on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
    Unknown,
}

impl CheckOutcome {
    /// Maps the engine's raw outcome token: `"pass"` and `"fail"` map to
    /// their outcomes, anything else (including absent) is `Unknown`.
    pub fn from_engine_outcome(outcome: Option<&str>) -> Self {
        match outcome {
            Some("pass") => CheckOutcome::Pass,
            Some("fail") => CheckOutcome::Fail,
            _ => CheckOutcome::Unknown,
        }
    }

    /// The outcome word used in report header lines.
    pub fn report_str(&self) -> &'static str {
        match self {
            CheckOutcome::Fail => "FAILED",
            CheckOutcome::Pass => "passed",
            CheckOutcome::Unknown => "unverified",
        }
    }
}

/// A column present in the measured schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredColumn {
    pub name: String,
    pub data_type: Option<String>,
}

/// A column whose measured type differs from the declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTypeMismatch {
    pub column: String,
    pub expected_data_type: Option<String>,
    pub actual_data_type: Option<String>,
}

/// Variant-specific measured payload of a check result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckResultDetail {
    /// A measured metric value, for all metric-shaped checks.
    Metric {
        /// Rendered metric reference, e.g. `duplicate_count(one)`.
        metric: String,
        /// Rendered expected predicate, e.g. `duplicate_count(one) = 0`.
        expected: String,
        /// The value the engine reported, when it reported one.
        metric_value: Option<Value>,
    },
    /// Measured schema and the column-level mismatches.
    Schema {
        expected_schema: String,
        measured_schema: Vec<MeasuredColumn>,
        columns_not_allowed_and_present: Vec<String>,
        columns_required_and_not_present: Vec<String>,
        columns_having_wrong_type: Vec<DataTypeMismatch>,
    },
    /// Freshness measurement and its timestamp diagnostics.
    Freshness {
        /// Rendered expected line, e.g. `freshness(updated_at) < 1d`.
        expected: String,
        /// Rendered metric reference, e.g. `freshness(updated_at)`.
        metric: String,
        diagnostics: FreshnessDiagnostics,
    },
}

/// The result of one check for one verification run.
///
/// Carries copies of the originating check's reporting fields rather than a
/// reference, so results can outlive the parsed contract.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check_identity: String,
    pub check_name: Option<String>,
    pub check_type: String,
    pub outcome: CheckOutcome,
    pub detail: CheckResultDetail,
}

/// Renders an engine value for the report: strings unquoted, everything else
/// in its JSON form, absent values as `None`.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn render_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "None".to_string())
}

impl CheckResult {
    /// The outcome/name header line, e.g. `Check FAILED [row count]`.
    pub fn outcome_and_name_line(&self) -> String {
        let name_str = match &self.check_name {
            Some(name) => format!(" [{name}]"),
            None => String::new(),
        };
        format!("Check {}{name_str}", self.outcome.report_str())
    }

    /// The multi-line text report for this result.
    pub fn report_lines(&self) -> Vec<String> {
        match &self.detail {
            CheckResultDetail::Metric {
                metric,
                expected,
                metric_value,
            } => vec![
                self.outcome_and_name_line(),
                format!("  Expected {expected}"),
                format!("  Actual {metric} was {}", render_value(metric_value.as_ref())),
            ],
            CheckResultDetail::Schema {
                expected_schema,
                measured_schema,
                columns_not_allowed_and_present,
                columns_required_and_not_present,
                columns_having_wrong_type,
            } => {
                let actual_schema: Vec<String> = measured_schema
                    .iter()
                    .map(|column| match &column.data_type {
                        Some(data_type) => format!("{}={data_type}", column.name),
                        None => column.name.clone(),
                    })
                    .collect();
                let mut lines = vec![
                    format!("Schema check {}", self.outcome.report_str()),
                    format!("  Expected schema: {expected_schema}"),
                    format!("  Actual schema: {}", actual_schema.join(",")),
                ];
                lines.extend(
                    columns_not_allowed_and_present
                        .iter()
                        .map(|column| format!("  Column '{column}' was present and not allowed")),
                );
                lines.extend(
                    columns_required_and_not_present
                        .iter()
                        .map(|column| format!("  Column '{column}' was missing")),
                );
                lines.extend(columns_having_wrong_type.iter().map(|mismatch| {
                    format!(
                        "  Column '{}': Expected type '{}', but was '{}'",
                        mismatch.column,
                        render_opt(&mismatch.expected_data_type),
                        render_opt(&mismatch.actual_data_type)
                    )
                }));
                lines
            }
            CheckResultDetail::Freshness {
                expected,
                metric,
                diagnostics,
            } => vec![
                self.outcome_and_name_line(),
                format!("  Expected {expected}"),
                format!("  Actual {metric} was {}", render_opt(&diagnostics.freshness)),
                format!(
                    "  Max value in column was ...... {}",
                    render_opt(&diagnostics.max_column_timestamp)
                ),
                format!(
                    "  Max value in column in UTC was {}",
                    render_opt(&diagnostics.max_column_timestamp_utc)
                ),
                format!(
                    "  Now was ...................... {}",
                    render_opt(&diagnostics.now_timestamp)
                ),
                format!(
                    "  Now in UTC was ............... {}",
                    render_opt(&diagnostics.now_timestamp_utc)
                ),
            ],
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report_lines().join("\n"))
    }
}
