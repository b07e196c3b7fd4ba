//! Typed column-profile payloads produced by a profiling run.

use serde::Serialize;

/// One value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentValue {
    pub value: String,
    pub frequency: i64,
}

/// A value histogram with adapter-computed bucket boundaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub boundaries: Vec<f64>,
    /// One count per bucket; buckets the engine reported as null count zero.
    pub frequencies: Vec<i64>,
}

/// Profile of a numerically-typed column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericProfile {
    /// Smallest distinct values, ascending.
    pub mins: Vec<f64>,
    /// Largest distinct values, descending.
    pub maxs: Vec<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub frequent_values: Vec<FrequentValue>,
    pub average: Option<f64>,
    pub sum: Option<f64>,
    pub variance: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub distinct_values: Option<i64>,
    pub missing_values: Option<i64>,
    pub histogram: Option<Histogram>,
}

/// Profile of a text-typed column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextProfile {
    pub frequent_values: Vec<FrequentValue>,
    pub distinct_values: Option<i64>,
    pub missing_values: Option<i64>,
    pub average_length: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
}

/// The profile payload of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileDetail {
    Numeric(NumericProfile),
    Text(TextProfile),
}

/// A profiled column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column_name: String,
    /// The declared type in the data source's own vocabulary.
    pub column_type: String,
    pub detail: ProfileDetail,
}

/// All profiled columns of one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileTable {
    pub table_name: String,
    pub columns: Vec<ColumnProfile>,
}

/// The outcome of one profiling run over a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileRunResult {
    pub data_source_name: String,
    pub tables: Vec<ProfileTable>,
}
