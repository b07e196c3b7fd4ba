//! The factory chain turning a check-type token into a [`Check`].
//!
//! Factories are tried in a fixed order; the first one that recognizes the
//! token builds the check. Duplicate checks come before the generic
//! missing/invalid metric checks, and the free-form SQL-function fallback is
//! last. A token no factory recognizes is an explicit
//! [`CheckParse::Unrecognized`], never a silent skip.

use crate::checks::configurations::{MissingConfigurations, ValidConfigurations};
use crate::checks::freshness::FreshnessUnit;
use crate::checks::{create_identity, Check, CheckVariant};
use crate::config::ConfigNode;
use crate::diagnostics::Logs;
use crate::threshold::Threshold;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Number;

/// Everything the contract parser collected about one check entry before
/// dispatching it to the factory chain.
pub struct CheckArgs<'a> {
    pub verification_context: &'a str,
    pub check_type: &'a str,
    pub check_node: &'a ConfigNode,
    pub dataset: &'a str,
    pub column: Option<&'a str>,
    /// Multi-column list of a dataset-level duplicate check.
    pub columns: Option<Vec<String>>,
    pub missing_configurations: Option<MissingConfigurations>,
    pub valid_configurations: Option<ValidConfigurations>,
    pub threshold: Threshold,
}

impl CheckArgs<'_> {
    fn build(&self, variant: CheckVariant, threshold: Threshold, logs: &mut Logs) -> Check {
        let identity_suffix = self.check_node.read_string_opt("identity_suffix", logs);
        Check {
            verification_context: self.verification_context.to_string(),
            check_type: self.check_type.to_string(),
            identity: create_identity(
                self.verification_context,
                self.check_type,
                identity_suffix.as_deref(),
            ),
            name: self.check_node.read_string_opt("name", logs),
            dataset: self.dataset.to_string(),
            column: self.column.map(str::to_string),
            skip: self
                .check_node
                .read_bool_opt("skip", logs)
                .unwrap_or(false),
            threshold,
            missing_configurations: self.missing_configurations.clone(),
            valid_configurations: self.valid_configurations.clone(),
            variant,
        }
    }

    /// The fixed `= 0` threshold of the `no_*` check forms. User-supplied
    /// threshold keys conflict with it and are reported.
    fn implicit_zero_threshold(&self, logs: &mut Logs) -> Threshold {
        if !self.threshold.is_empty() {
            logs.error_at(
                format!(
                    "Check type '{}' does not allow threshold configuration",
                    self.check_type
                ),
                self.check_node.location.clone(),
            );
        }
        Threshold {
            equal: Some(Number::from(0)),
            ..Default::default()
        }
    }
}

/// Outcome of dispatching one check entry through the factory chain.
#[derive(Debug)]
pub enum CheckParse {
    Recognized(Check),
    /// No factory recognized the token; the caller reports it as an error.
    Unrecognized { check_type: String },
}

trait CheckFactory: Sync {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check>;
}

/// Dispatches one check entry through the factory chain.
pub fn build_check(args: &CheckArgs, logs: &mut Logs) -> CheckParse {
    static FACTORIES: &[&dyn CheckFactory] = &[
        &DuplicateCheckFactory,
        &MissingCheckFactory,
        &InvalidCheckFactory,
        &FreshnessCheckFactory,
        &UserDefinedExpressionCheckFactory,
        &UserDefinedQueryCheckFactory,
        &SqlFunctionCheckFactory,
    ];
    for factory in FACTORIES {
        if let Some(check) = factory.create_check(args, logs) {
            return CheckParse::Recognized(check);
        }
    }
    CheckParse::Unrecognized {
        check_type: args.check_type.to_string(),
    }
}

struct DuplicateCheckFactory;

impl CheckFactory for DuplicateCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        let (metric, threshold) = match args.check_type {
            "no_duplicate_values" => ("duplicate_count", args.implicit_zero_threshold(logs)),
            "duplicate_count" => ("duplicate_count", args.threshold.clone()),
            "duplicate_percent" => ("duplicate_percent", args.threshold.clone()),
            _ => return None,
        };
        let variant = match &args.columns {
            Some(columns) => CheckVariant::MultiColumnDuplicate {
                metric: metric.to_string(),
                columns: columns.clone(),
            },
            None => CheckVariant::Metric {
                metric: metric.to_string(),
            },
        };
        Some(args.build(variant, threshold, logs))
    }
}

struct MissingCheckFactory;

impl CheckFactory for MissingCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        let (metric, threshold) = match args.check_type {
            "no_missing_values" => ("missing_count", args.implicit_zero_threshold(logs)),
            "missing_count" => ("missing_count", args.threshold.clone()),
            "missing_percent" => ("missing_percent", args.threshold.clone()),
            _ => return None,
        };
        // missing metrics only count NULLs and configured missing values
        if args.valid_configurations.is_some() {
            logs.warning_at(
                format!(
                    "Validity configurations are ignored for check type '{}'",
                    args.check_type
                ),
                args.check_node.location.clone(),
            );
        }
        Some(args.build(
            CheckVariant::Metric {
                metric: metric.to_string(),
            },
            threshold,
            logs,
        ))
    }
}

struct InvalidCheckFactory;

impl CheckFactory for InvalidCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        let (metric, threshold) = match args.check_type {
            "no_invalid_values" => ("invalid_count", args.implicit_zero_threshold(logs)),
            "invalid_count" => ("invalid_count", args.threshold.clone()),
            "invalid_percent" => ("invalid_percent", args.threshold.clone()),
            _ => return None,
        };

        let reference = args
            .valid_configurations
            .as_ref()
            .and_then(|valid| valid.valid_values_reference_data.clone());
        let variant = match reference {
            Some(reference) => {
                let has_other_validity = args
                    .valid_configurations
                    .as_ref()
                    .map(|valid| !valid.to_expression_entries().is_empty())
                    .unwrap_or(false);
                if has_other_validity {
                    logs.error_at(
                        "'valid_values_reference_data' cannot be combined with other validity configurations"
                            .to_string(),
                        args.check_node.location.clone(),
                    );
                }
                CheckVariant::Reference {
                    metric: metric.to_string(),
                    reference,
                }
            }
            None => CheckVariant::Metric {
                metric: metric.to_string(),
            },
        };
        Some(args.build(variant, threshold, logs))
    }
}

struct FreshnessCheckFactory;

impl CheckFactory for FreshnessCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        let unit = FreshnessUnit::from_check_type(args.check_type)?;
        if args.column.is_none() {
            logs.error_at(
                format!("Check type '{}' requires a column", args.check_type),
                args.check_node.location.clone(),
            );
        }
        Some(args.build(
            CheckVariant::Freshness { unit },
            args.threshold.clone(),
            logs,
        ))
    }
}

struct UserDefinedExpressionCheckFactory;

impl CheckFactory for UserDefinedExpressionCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        if args.check_type != "metric_expression" {
            return None;
        }
        // missing keys are reported and default empty; the collected errors
        // abort the run before anything executes
        let metric = args
            .check_node
            .read_string("metric", logs)
            .unwrap_or_default();
        let expression_sql = args
            .check_node
            .read_string("expression_sql", logs)
            .unwrap_or_default();
        Some(args.build(
            CheckVariant::UserDefinedExpression {
                metric,
                expression_sql,
            },
            args.threshold.clone(),
            logs,
        ))
    }
}

struct UserDefinedQueryCheckFactory;

impl CheckFactory for UserDefinedQueryCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        if args.check_type != "metric_query" {
            return None;
        }
        let metric = args
            .check_node
            .read_string("metric", logs)
            .unwrap_or_default();
        let query_sql = args
            .check_node
            .read_string("query_sql", logs)
            .unwrap_or_default();
        Some(args.build(
            CheckVariant::UserDefinedQuery { metric, query_sql },
            args.threshold.clone(),
            logs,
        ))
    }
}

/// Fallback for any identifier-shaped token: the token itself is the engine
/// metric name, optionally with a parenthesized argument list, e.g.
/// `row_count` or `percentile(0.7)`.
struct SqlFunctionCheckFactory;

static METRIC_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\(.*\))?$").expect("metric token regex")
});

impl CheckFactory for SqlFunctionCheckFactory {
    fn create_check(&self, args: &CheckArgs, logs: &mut Logs) -> Option<Check> {
        if !METRIC_TOKEN_RE.is_match(args.check_type) {
            return None;
        }
        Some(args.build(
            CheckVariant::Metric {
                metric: args.check_type.to_string(),
            },
            args.threshold.clone(),
            logs,
        ))
    }
}
