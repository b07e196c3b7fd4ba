//! The profiling run: drives an engine adapter column by column and reduces
//! the returned row tuples into typed profiles.

use crate::diagnostics::Logs;
use crate::engine::{
    ColumnMetadata, ProfileValueKind, ProfilingDataSource, Row, ROW_TAG_FREQUENT_VALUES,
    ROW_TAG_MAXS, ROW_TAG_MINS,
};
use crate::error::Result;
use crate::profiling::types::{
    ColumnProfile, FrequentValue, Histogram, NumericProfile, ProfileDetail, ProfileRunResult,
    ProfileTable, TextProfile,
};
use crate::profiling::ProfileSelection;
use crate::results::render_value;
use serde_json::Value;

/// Row-count limits of the value-frequency queries.
#[derive(Debug, Clone, Copy)]
pub struct ProfileLimits {
    pub mins_maxs: usize,
    pub frequent_values: usize,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            mins_maxs: 5,
            frequent_values: 10,
        }
    }
}

/// Casts an engine cell to a float. Nulls and absent cells pass through as
/// `None`; numeric strings are accepted.
pub fn cast_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Casts an engine cell to an integer, truncating fractional values the way
/// the numeric aggregates expect. Nulls pass through as `None`.
pub fn cast_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(raw) => raw.trim().parse::<f64>().ok().map(|float| float as i64),
        _ => None,
    }
}

/// Profiles every selected column of the data source.
///
/// Column-level problems are reported into `logs` and profiling continues
/// with the next column; only adapter failures abort the run.
pub fn profile_data_source(
    data_source: &mut dyn ProfilingDataSource,
    selection: &ProfileSelection,
    limits: &ProfileLimits,
    logs: &mut Logs,
) -> Result<ProfileRunResult> {
    let data_source_name = data_source.data_source_name().to_string();
    let metadata = data_source.column_metadata()?;

    let mut tables: Vec<ProfileTable> = Vec::new();
    for column in metadata {
        if !selection.is_selected(&column.table_name, &column.column_name) {
            continue;
        }
        let detail = if data_source.is_numeric_type(&column.declared_type) {
            Some(ProfileDetail::Numeric(profile_numeric_column(
                data_source,
                &column,
                limits,
                logs,
            )?))
        } else if data_source.is_text_type(&column.declared_type) {
            Some(ProfileDetail::Text(profile_text_column(
                data_source,
                &column,
                limits,
                logs,
            )?))
        } else {
            logs.info(format!(
                "Skipping column {}.{}: type '{}' is not supported for profiling",
                column.table_name, column.column_name, column.declared_type
            ));
            None
        };

        if let Some(detail) = detail {
            let profile = ColumnProfile {
                column_name: column.column_name.clone(),
                column_type: column.declared_type.clone(),
                detail,
            };
            match tables
                .iter_mut()
                .find(|table| table.table_name == column.table_name)
            {
                Some(table) => table.columns.push(profile),
                None => tables.push(ProfileTable {
                    table_name: column.table_name.clone(),
                    columns: vec![profile],
                }),
            }
        }
    }

    if tables.is_empty() {
        logs.error(format!(
            "No profiling information derived for data source '{data_source_name}'"
        ));
    }
    Ok(ProfileRunResult {
        data_source_name,
        tables,
    })
}

fn frequent_values_of(rows: &[Row]) -> Vec<FrequentValue> {
    rows.iter()
        .filter(|row| row_tag(row) == Some(ROW_TAG_FREQUENT_VALUES))
        .filter_map(|row| {
            Some(FrequentValue {
                value: render_value(row.get(2)),
                frequency: cast_int(row.get(3))?,
            })
        })
        .collect()
}

fn row_tag(row: &Row) -> Option<&str> {
    row.first().and_then(Value::as_str)
}

fn tagged_floats(rows: &[Row], tag: &str) -> Vec<f64> {
    rows.iter()
        .filter(|row| row_tag(row) == Some(tag))
        .filter_map(|row| cast_float(row.get(2)))
        .collect()
}

fn profile_numeric_column(
    data_source: &mut dyn ProfilingDataSource,
    column: &ColumnMetadata,
    limits: &ProfileLimits,
    logs: &mut Logs,
) -> Result<NumericProfile> {
    let mut profile = NumericProfile::default();

    match data_source.value_frequencies(
        ProfileValueKind::Numeric,
        &column.table_name,
        &column.column_name,
        limits.mins_maxs,
        limits.frequent_values,
    )? {
        Some(rows) => {
            profile.mins = tagged_floats(&rows, ROW_TAG_MINS);
            profile.maxs = tagged_floats(&rows, ROW_TAG_MAXS);
            profile.min = profile.mins.first().copied();
            profile.max = profile.maxs.first().copied();
            profile.frequent_values = frequent_values_of(&rows);
        }
        None => logs.error(format!(
            "Database returned no results for minimum values, maximum values and frequent values \
             in table: {}, column: {}",
            column.table_name, column.column_name
        )),
    }

    match data_source.numeric_aggregates(&column.table_name, &column.column_name)? {
        Some(row) => {
            profile.average = cast_float(row.get(0));
            profile.sum = cast_float(row.get(1));
            profile.variance = cast_float(row.get(2));
            profile.standard_deviation = cast_float(row.get(3));
            profile.distinct_values = cast_int(row.get(4));
            profile.missing_values = cast_int(row.get(5));
        }
        None => logs.error(format!(
            "Database returned no results for aggregates in table: {}, column: {}",
            column.table_name, column.column_name
        )),
    }

    if let (Some(min), Some(max)) = (profile.min, profile.max) {
        match data_source.histogram(
            &column.table_name,
            &column.column_name,
            min,
            max,
            profile.distinct_values,
            &column.declared_type,
        )? {
            Some(rows) => {
                profile.histogram = Some(Histogram {
                    boundaries: rows.boundaries,
                    // null buckets count zero
                    frequencies: rows
                        .frequency_row
                        .iter()
                        .map(|cell| cast_int(Some(cell)).unwrap_or(0))
                        .collect(),
                });
            }
            None => logs.debug(format!(
                "No histogram derived for column {}.{}",
                column.table_name, column.column_name
            )),
        }
    }
    Ok(profile)
}

fn profile_text_column(
    data_source: &mut dyn ProfilingDataSource,
    column: &ColumnMetadata,
    limits: &ProfileLimits,
    logs: &mut Logs,
) -> Result<TextProfile> {
    let mut profile = TextProfile::default();

    match data_source.value_frequencies(
        ProfileValueKind::Text,
        &column.table_name,
        &column.column_name,
        limits.mins_maxs,
        limits.frequent_values,
    )? {
        Some(rows) => profile.frequent_values = frequent_values_of(&rows),
        None => logs.error(format!(
            "Database returned no results for frequent values in table: {}, column: {}",
            column.table_name, column.column_name
        )),
    }

    match data_source.text_aggregates(&column.table_name, &column.column_name)? {
        Some(row) => {
            profile.distinct_values = cast_int(row.get(0));
            profile.missing_values = cast_int(row.get(1));
            profile.average_length = cast_int(row.get(2));
            profile.min_length = cast_int(row.get(3));
            profile.max_length = cast_int(row.get(4));
        }
        None => logs.error(format!(
            "Database returned no results for text aggregates in table: {}, column: {}",
            column.table_name, column.column_name
        )),
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HistogramRows;
    use serde_json::json;

    struct FakeDataSource {
        columns: Vec<ColumnMetadata>,
        numeric_rows: Option<Vec<Row>>,
        aggregates: Option<Row>,
    }

    impl FakeDataSource {
        fn orders() -> Self {
            Self {
                columns: vec![
                    ColumnMetadata {
                        table_name: "orders".to_string(),
                        column_name: "size".to_string(),
                        declared_type: "decimal".to_string(),
                    },
                    ColumnMetadata {
                        table_name: "orders".to_string(),
                        column_name: "country".to_string(),
                        declared_type: "varchar".to_string(),
                    },
                    ColumnMetadata {
                        table_name: "orders".to_string(),
                        column_name: "created".to_string(),
                        declared_type: "timestamp".to_string(),
                    },
                ],
                numeric_rows: Some(vec![
                    vec![json!("mins"), json!(0), json!(1), json!(3)],
                    vec![json!("mins"), json!(1), json!("2.5"), json!(1)],
                    vec![json!("maxs"), json!(0), json!(99), json!(1)],
                    vec![json!("frequent_values"), json!(0), json!(1), json!(3)],
                    vec![json!("frequent_values"), json!(1), json!(null), json!(2)],
                ]),
                aggregates: Some(vec![
                    json!(12.5),
                    json!(250),
                    json!("4.0"),
                    json!(2.0),
                    json!(17),
                    json!(null),
                ]),
            }
        }
    }

    impl ProfilingDataSource for FakeDataSource {
        fn data_source_name(&self) -> &str {
            "postgres_ds"
        }

        fn column_metadata(&mut self) -> Result<Vec<ColumnMetadata>> {
            Ok(self.columns.clone())
        }

        fn is_numeric_type(&self, declared_type: &str) -> bool {
            declared_type == "decimal"
        }

        fn is_text_type(&self, declared_type: &str) -> bool {
            declared_type == "varchar"
        }

        fn value_frequencies(
            &mut self,
            kind: ProfileValueKind,
            _table_name: &str,
            _column_name: &str,
            _limit_mins_maxs: usize,
            _limit_frequent_values: usize,
        ) -> Result<Option<Vec<Row>>> {
            Ok(match kind {
                ProfileValueKind::Numeric => self.numeric_rows.clone(),
                ProfileValueKind::Text => Some(vec![vec![
                    json!("frequent_values"),
                    json!(0),
                    json!("BE"),
                    json!(42),
                ]]),
            })
        }

        fn numeric_aggregates(&mut self, _table: &str, _column: &str) -> Result<Option<Row>> {
            Ok(self.aggregates.clone())
        }

        fn text_aggregates(&mut self, _table: &str, _column: &str) -> Result<Option<Row>> {
            Ok(Some(vec![
                json!(3),
                json!(0),
                json!(2.4),
                json!(2),
                json!(2),
            ]))
        }

        fn histogram(
            &mut self,
            _table: &str,
            _column: &str,
            min: f64,
            max: f64,
            _distinct_values: Option<i64>,
            _declared_type: &str,
        ) -> Result<Option<HistogramRows>> {
            Ok(Some(HistogramRows {
                boundaries: vec![min, (min + max) / 2.0, max],
                frequency_row: vec![json!(10), json!(null)],
            }))
        }
    }

    fn select_all() -> ProfileSelection {
        let mut logs = Logs::new();
        ProfileSelection::parse(&["%.%".to_string()], &mut logs)
    }

    #[test]
    fn test_numeric_and_text_columns_are_profiled() {
        let mut logs = Logs::new();
        let mut data_source = FakeDataSource::orders();
        let result = profile_data_source(
            &mut data_source,
            &select_all(),
            &ProfileLimits::default(),
            &mut logs,
        )
        .unwrap();

        assert_eq!(result.data_source_name, "postgres_ds");
        assert_eq!(result.tables.len(), 1);
        let table = &result.tables[0];
        assert_eq!(table.table_name, "orders");
        // the timestamp column is skipped, with an informational note
        assert_eq!(table.columns.len(), 2);
        assert!(logs
            .entries()
            .iter()
            .any(|entry| entry.message.contains("Skipping column orders.created")));

        match &table.columns[0].detail {
            ProfileDetail::Numeric(profile) => {
                // numeric strings cast, nulls dropped
                assert_eq!(profile.mins, vec![1.0, 2.5]);
                assert_eq!(profile.min, Some(1.0));
                assert_eq!(profile.max, Some(99.0));
                assert_eq!(profile.frequent_values.len(), 2);
                assert_eq!(profile.frequent_values[0].value, "1");
                assert_eq!(profile.frequent_values[1].value, "None");
                assert_eq!(profile.average, Some(12.5));
                assert_eq!(profile.variance, Some(4.0));
                assert_eq!(profile.distinct_values, Some(17));
                assert_eq!(profile.missing_values, None);
                let histogram = profile.histogram.as_ref().unwrap();
                // null histogram buckets count zero
                assert_eq!(histogram.frequencies, vec![10, 0]);
                assert_eq!(histogram.boundaries, vec![1.0, 50.0, 99.0]);
            }
            other => panic!("expected numeric profile, got {other:?}"),
        }

        match &table.columns[1].detail {
            ProfileDetail::Text(profile) => {
                assert_eq!(profile.frequent_values[0].value, "BE");
                assert_eq!(profile.frequent_values[0].frequency, 42);
                assert_eq!(profile.distinct_values, Some(3));
                assert_eq!(profile.average_length, Some(2));
            }
            other => panic!("expected text profile, got {other:?}"),
        }
    }

    #[test]
    fn test_selection_filters_columns() {
        let mut logs = Logs::new();
        let mut data_source = FakeDataSource::orders();
        let selection = ProfileSelection::parse(&["orders.country".to_string()], &mut logs);
        let result =
            profile_data_source(&mut data_source, &selection, &ProfileLimits::default(), &mut logs)
                .unwrap();
        assert_eq!(result.tables[0].columns.len(), 1);
        assert_eq!(result.tables[0].columns[0].column_name, "country");
    }

    #[test]
    fn test_missing_row_sets_are_reported_and_run_continues() {
        let mut logs = Logs::new();
        let mut data_source = FakeDataSource::orders();
        data_source.numeric_rows = None;
        data_source.aggregates = None;
        let selection = ProfileSelection::parse(&["orders.size".to_string()], &mut logs);
        let result =
            profile_data_source(&mut data_source, &selection, &ProfileLimits::default(), &mut logs)
                .unwrap();

        assert_eq!(result.tables[0].columns.len(), 1);
        assert_eq!(
            logs.error_messages(),
            vec![
                "Database returned no results for minimum values, maximum values and frequent \
                 values in table: orders, column: size",
                "Database returned no results for aggregates in table: orders, column: size",
            ]
        );
        match &result.tables[0].columns[0].detail {
            ProfileDetail::Numeric(profile) => assert_eq!(*profile, NumericProfile::default()),
            other => panic!("expected numeric profile, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_run_is_an_error() {
        let mut logs = Logs::new();
        let mut data_source = FakeDataSource::orders();
        let selection = ProfileSelection::parse(&["other_table.%".to_string()], &mut logs);
        profile_data_source(&mut data_source, &selection, &ProfileLimits::default(), &mut logs)
            .unwrap();
        assert_eq!(
            logs.error_messages(),
            vec!["No profiling information derived for data source 'postgres_ds'"]
        );
    }

    #[test]
    fn test_cast_helpers() {
        assert_eq!(cast_float(None), None);
        assert_eq!(cast_float(Some(&json!(null))), None);
        assert_eq!(cast_float(Some(&json!(2.5))), Some(2.5));
        assert_eq!(cast_float(Some(&json!("3.5"))), Some(3.5));
        assert_eq!(cast_float(Some(&json!("abc"))), None);
        assert_eq!(cast_int(Some(&json!(7))), Some(7));
        assert_eq!(cast_int(Some(&json!(7.9))), Some(7));
        assert_eq!(cast_int(Some(&json!("7.9"))), Some(7));
    }
}
