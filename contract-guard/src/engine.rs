//! Contracts of the excluded query-engine collaborators.
//!
//! This crate never executes SQL or owns a connection. Check verification
//! consumes raw [`CheckRecord`]s that an engine adapter produced for the
//! compiled check expressions; profiling drives an engine adapter through the
//! [`ProfilingDataSource`] trait and reduces the row tuples it returns.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A named metric entry of a check's engine result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// The measured value; `None` when the engine computed nothing.
    #[serde(default)]
    pub value: Option<Value>,
}

/// The raw result record an engine adapter returns for one executed check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Echo of the `"contract check id"` entry of the compiled expression,
    /// used to correlate the record back to its check.
    #[serde(default)]
    pub contract_check_id: Option<String>,
    /// Raw outcome token, normally `"pass"` or `"fail"`.
    #[serde(default)]
    pub outcome: Option<String>,
    /// Check-specific diagnostics, e.g. schema mismatch details.
    #[serde(default)]
    pub diagnostics: serde_json::Map<String, Value>,
    /// Metric entries keyed by metric name.
    #[serde(default)]
    pub metrics: HashMap<String, MetricRecord>,
}

impl CheckRecord {
    /// Looks up a metric entry by name.
    pub fn metric(&self, name: &str) -> Option<&MetricRecord> {
        self.metrics.get(name)
    }

    /// Looks up a diagnostics value by key.
    pub fn diagnostic(&self, key: &str) -> Option<&Value> {
        self.diagnostics.get(key)
    }

    /// Reads a diagnostics value as a display string.
    pub fn diagnostic_str(&self, key: &str) -> Option<String> {
        match self.diagnostics.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Reads a diagnostics value as a list of strings; absent or mistyped
    /// entries reduce to an empty list.
    pub fn diagnostic_str_list(&self, key: &str) -> Vec<String> {
        match self.diagnostics.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A positional row tuple returned by a profiling query.
pub type Row = Vec<Value>;

/// First-column discriminator tag of value-frequency rows.
pub const ROW_TAG_MINS: &str = "mins";
/// See [`ROW_TAG_MINS`].
pub const ROW_TAG_MAXS: &str = "maxs";
/// See [`ROW_TAG_MINS`].
pub const ROW_TAG_FREQUENT_VALUES: &str = "frequent_values";

/// Table/column metadata of the profiled data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub table_name: String,
    pub column_name: String,
    /// The column's declared type in the data source's own vocabulary.
    pub declared_type: String,
}

/// Which value-frequency query shape to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileValueKind {
    /// Mins, maxs and frequent values.
    Numeric,
    /// Frequent values only.
    Text,
}

/// Histogram query output: pre-computed bucket boundaries plus one frequency
/// row with a cell per bucket (cells may be null).
#[derive(Debug, Clone)]
pub struct HistogramRows {
    pub boundaries: Vec<f64>,
    pub frequency_row: Row,
}

/// The profiling side of an engine adapter.
///
/// The adapter owns SQL generation and execution; this core only decides
/// which queries to request and how to reduce the returned rows. Calls are
/// synchronous and sequential; each profiling run owns its adapter.
pub trait ProfilingDataSource {
    /// Name of the data source, for diagnostics.
    fn data_source_name(&self) -> &str;

    /// All table/column metadata of the data source. Selection filtering
    /// happens in the core, not the adapter.
    fn column_metadata(&mut self) -> Result<Vec<ColumnMetadata>>;

    /// Whether the declared type is profiled through the numeric path.
    fn is_numeric_type(&self, declared_type: &str) -> bool;

    /// Whether the declared type is profiled through the text path.
    fn is_text_type(&self, declared_type: &str) -> bool;

    /// Value-frequency rows, tagged by first-column discriminator
    /// (`"mins"` | `"maxs"` | `"frequent_values"`), with the value at
    /// index 2 and the frequency at index 3. `None` when the engine
    /// returned no row set.
    fn value_frequencies(
        &mut self,
        kind: ProfileValueKind,
        table_name: &str,
        column_name: &str,
        limit_mins_maxs: usize,
        limit_frequent_values: usize,
    ) -> Result<Option<Vec<Row>>>;

    /// Fixed-position numeric aggregates: average, sum, variance, standard
    /// deviation, distinct count, missing count.
    fn numeric_aggregates(&mut self, table_name: &str, column_name: &str) -> Result<Option<Row>>;

    /// Fixed-position text aggregates: distinct count, missing count,
    /// average length, min length, max length.
    fn text_aggregates(&mut self, table_name: &str, column_name: &str) -> Result<Option<Row>>;

    /// Histogram over `[min, max]` with boundaries pre-computed by the
    /// adapter from min, max, distinct count and declared type. `None` when
    /// the adapter cannot build a histogram for the type.
    fn histogram(
        &mut self,
        table_name: &str,
        column_name: &str,
        min: f64,
        max: f64,
        distinct_values: Option<i64>,
        declared_type: &str,
    ) -> Result<Option<HistogramRows>>;
}
