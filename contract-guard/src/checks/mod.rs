//! Check representation, compilation and result reduction.
//!
//! A [`Check`] is an immutable value object built once per parsed
//! configuration entry. Check kinds are a closed set modeled by the
//! [`CheckVariant`] sum type: compilation to an engine-native expression and
//! reduction of raw engine output are exhaustive matches over the variant,
//! so a new kind cannot be added without handling both sides.

pub mod configurations;
pub mod factory;
pub mod freshness;
pub mod schema;

use crate::diagnostics::Logs;
use crate::engine::CheckRecord;
use crate::results::{CheckOutcome, CheckResult, CheckResultDetail};
use crate::threshold::Threshold;
use configurations::{MissingConfigurations, ValidConfigurations, ValidValuesReferenceData};
use freshness::FreshnessUnit;
use schema::SchemaExpectation;
use serde_json::Value;

/// A single declarative expectation about a dataset or column.
#[derive(Debug, Clone)]
pub struct Check {
    /// Correlation context supplied by the caller (data source, schedule,
    /// dataset), the first component of the check identity.
    pub verification_context: String,
    /// The raw check-type token from the configuration.
    pub check_type: String,
    /// Stable correlation key; a pure function of verification context,
    /// check type and the optional user-supplied identity suffix.
    pub identity: String,
    /// Optional display label.
    pub name: Option<String>,
    /// Dataset the check applies to.
    pub dataset: String,
    /// Column the check applies to; absent for dataset-level checks.
    pub column: Option<String>,
    /// Skipped checks are parsed and keep their identity but are excluded
    /// from compilation.
    pub skip: bool,
    /// Numeric predicate for the measured metric.
    pub threshold: Threshold,
    pub missing_configurations: Option<MissingConfigurations>,
    pub valid_configurations: Option<ValidConfigurations>,
    /// The check kind with its variant-specific fields.
    pub variant: CheckVariant,
}

/// The closed set of check kinds.
#[derive(Debug, Clone)]
pub enum CheckVariant {
    /// A metric compared against the threshold, e.g. `missing_count(col) < 5`.
    Metric { metric: String },
    /// A duplicate metric over several columns, rendered `metric(a, b, ...)`.
    MultiColumnDuplicate { metric: String, columns: Vec<String> },
    /// Column values must exist in a reference dataset column.
    Reference {
        metric: String,
        reference: ValidValuesReferenceData,
    },
    /// A user-supplied SQL expression computing the metric.
    UserDefinedExpression {
        metric: String,
        expression_sql: String,
    },
    /// A user-supplied SQL query computing the metric.
    UserDefinedQuery { metric: String, query_sql: String },
    /// Freshness of the newest value in a timestamp column.
    Freshness { unit: FreshnessUnit },
    /// Expected dataset schema.
    Schema(SchemaExpectation),
}

/// Computes the stable check identity.
///
/// The identity must not change across runs on unchanged configuration:
/// historical correlation of results depends on it.
pub fn create_identity(
    verification_context: &str,
    check_type: &str,
    identity_suffix: Option<&str>,
) -> String {
    let mut identity = format!("{verification_context},type={check_type}");
    if let Some(suffix) = identity_suffix {
        identity.push_str(&format!(",identity_suffix={suffix}"));
    }
    identity
}

/// A compiled, engine-native check expression: a key naming the predicate
/// mapped to a configuration body.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckExpression {
    pub key: String,
    pub body: serde_json::Map<String, Value>,
}

impl CheckExpression {
    /// The single-entry dict form consumed by the query engine.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(self.key.clone(), Value::Object(self.body.clone()));
        Value::Object(map)
    }
}

impl Check {
    /// The metric reference as rendered into the check line, e.g.
    /// `duplicate_count(one)` or `row_count` for dataset-level metrics.
    pub fn metric_str(&self) -> String {
        match &self.variant {
            CheckVariant::Metric { metric }
            | CheckVariant::Reference { metric, .. }
            | CheckVariant::UserDefinedExpression { metric, .. }
            | CheckVariant::UserDefinedQuery { metric, .. } => match &self.column {
                Some(column) => format!("{metric}({column})"),
                None => metric.clone(),
            },
            CheckVariant::MultiColumnDuplicate { metric, columns } => {
                let column_str = match &self.column {
                    Some(column) => column.clone(),
                    None => columns.join(", "),
                };
                format!("{metric}({column_str})")
            }
            CheckVariant::Freshness { .. } => {
                format!("freshness({})", self.column.as_deref().unwrap_or_default())
            }
            CheckVariant::Schema(_) => "schema".to_string(),
        }
    }

    /// The rendered threshold, or the `"?"` placeholder when none is set.
    pub fn threshold_str(&self) -> String {
        self.threshold.render().unwrap_or_else(|| "?".to_string())
    }

    /// The check line: metric reference plus threshold.
    pub fn check_line(&self) -> String {
        match &self.variant {
            CheckVariant::Schema(_) => "schema".to_string(),
            CheckVariant::Freshness { unit } => {
                format!("{} {}{}", self.metric_str(), self.threshold_str(), unit.suffix())
            }
            _ => format!("{} {}", self.metric_str(), self.threshold_str()),
        }
    }

    /// The expected-value string used in the text report.
    pub fn expected_str(&self) -> String {
        self.check_line()
    }

    /// Compiles this check into its engine-native expression.
    ///
    /// Every expression body carries a `"contract check id"` entry equal to
    /// the check identity, so engine results can be correlated back, and a
    /// `"name"` entry when a display label is set.
    pub fn to_check_expression(&self) -> CheckExpression {
        let mut body = serde_json::Map::new();
        body.insert(
            "contract check id".to_string(),
            Value::String(self.identity.clone()),
        );
        if let Some(name) = &self.name {
            body.insert("name".to_string(), Value::String(name.clone()));
        }

        let key = match &self.variant {
            CheckVariant::Metric { .. } | CheckVariant::MultiColumnDuplicate { .. } => {
                self.push_configuration_entries(&mut body);
                self.check_line()
            }
            CheckVariant::Reference { reference, .. } => {
                self.push_configuration_entries(&mut body);
                format!(
                    "values in ({}) must exist in {} ({})",
                    self.column.as_deref().unwrap_or_default(),
                    reference.dataset,
                    reference.column
                )
            }
            CheckVariant::UserDefinedExpression {
                metric,
                expression_sql,
            } => {
                body.insert(
                    format!("{metric} expression"),
                    Value::String(expression_sql.clone()),
                );
                self.check_line()
            }
            CheckVariant::UserDefinedQuery { metric, query_sql } => {
                body.insert(format!("{metric} query"), Value::String(query_sql.clone()));
                self.check_line()
            }
            CheckVariant::Freshness { .. } => self.check_line(),
            CheckVariant::Schema(expectation) => {
                body.insert("fail".to_string(), expectation.fail_body());
                "schema".to_string()
            }
        };

        CheckExpression { key, body }
    }

    fn push_configuration_entries(&self, body: &mut serde_json::Map<String, Value>) {
        if let Some(valid) = &self.valid_configurations {
            for (key, value) in valid.to_expression_entries() {
                body.insert(key.to_string(), value);
            }
        }
        if let Some(missing) = &self.missing_configurations {
            for (key, value) in missing.to_expression_entries() {
                body.insert(key.to_string(), value);
            }
        }
    }

    /// Reduces the engine's raw result record into a typed check result.
    ///
    /// The outcome is derived exclusively from the engine's outcome token;
    /// the threshold is never re-evaluated here. A missing metric entry
    /// yields a `None` measured value, never a failure.
    pub fn create_check_result(&self, record: &CheckRecord, logs: &mut Logs) -> CheckResult {
        let outcome = CheckOutcome::from_engine_outcome(record.outcome.as_deref());
        let detail = match &self.variant {
            CheckVariant::Metric { metric }
            | CheckVariant::MultiColumnDuplicate { metric, .. }
            | CheckVariant::UserDefinedExpression { metric, .. } => {
                self.metric_detail(self.lookup_metric_value(record, metric, logs))
            }
            CheckVariant::Reference { .. } => {
                self.metric_detail(self.lookup_metric_value(record, "reference", logs))
            }
            CheckVariant::UserDefinedQuery { .. } => {
                let key = self.check_line();
                self.metric_detail(self.lookup_metric_value(record, &key, logs))
            }
            CheckVariant::Freshness { .. } => freshness::reduce(self, record),
            CheckVariant::Schema(expectation) => schema::reduce(expectation, record, logs),
        };
        CheckResult {
            check_identity: self.identity.clone(),
            check_name: self.name.clone(),
            check_type: self.check_type.clone(),
            outcome,
            detail,
        }
    }

    fn metric_detail(&self, metric_value: Option<Value>) -> CheckResultDetail {
        CheckResultDetail::Metric {
            metric: self.metric_str(),
            expected: self.expected_str(),
            metric_value,
        }
    }

    /// Looks a metric value up by name. A parameterized metric name, e.g.
    /// `percentile(distance, 0.7)`, is looked up by its prefix before `(`.
    fn lookup_metric_value(
        &self,
        record: &CheckRecord,
        metric: &str,
        logs: &mut Logs,
    ) -> Option<Value> {
        let lookup_name = match metric.find('(') {
            Some(index) => &metric[..index],
            None => metric,
        };
        match record.metric(lookup_name) {
            Some(metric_record) => metric_record.value.clone(),
            None => {
                logs.debug(format!(
                    "Engine returned no '{lookup_name}' metric for check {}",
                    self.identity
                ));
                None
            }
        }
    }
}
