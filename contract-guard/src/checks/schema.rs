//! Schema check: declared columns versus the measured dataset schema.

use crate::checks::{create_identity, Check, CheckVariant};
use crate::config::ConfigNode;
use crate::diagnostics::Logs;
use crate::engine::CheckRecord;
use crate::results::{CheckResultDetail, DataTypeMismatch, MeasuredColumn};
use crate::threshold::Threshold;
use serde_json::Value;

/// One declared column of the expected schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaColumn {
    pub name: String,
    /// Expected data type; `None` means any type is accepted.
    pub data_type: Option<String>,
}

/// The expected dataset schema, derived from the contract's column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaExpectation {
    pub columns: Vec<SchemaColumn>,
    /// Declared columns that may be absent without failing the check.
    pub optional_columns: Vec<String>,
    /// When true, columns outside the declared list are tolerated.
    pub extra_columns_allowed: bool,
}

impl SchemaExpectation {
    /// Parses the expectation from the contract root node's `columns` list
    /// and the optional `extra_columns` directive.
    pub fn parse(contract_node: &ConfigNode, logs: &mut Logs) -> Self {
        let mut expectation = SchemaExpectation::default();

        if let Some(extra_columns) = contract_node.read_string_opt("extra_columns", logs) {
            if extra_columns == "allowed" {
                expectation.extra_columns_allowed = true;
            } else {
                logs.error_at(
                    format!("'extra_columns' must be 'allowed' when present, but was '{extra_columns}'"),
                    contract_node.location.clone(),
                );
            }
        }

        let column_nodes = contract_node
            .read_list_of_maps("columns", logs)
            .unwrap_or_default();
        for column_node in column_nodes {
            let Some(name) = column_node.read_string("name", logs) else {
                continue;
            };
            let data_type = column_node.read_string_opt("data_type", logs);
            if column_node.read_bool_opt("optional", logs).unwrap_or(false) {
                expectation.optional_columns.push(name.clone());
            }
            expectation.columns.push(SchemaColumn { name, data_type });
        }
        expectation
    }

    /// Rendered expected schema, e.g. `id=text,size(optional)=decimal`.
    pub fn expected_schema_str(&self) -> String {
        self.columns
            .iter()
            .map(|column| {
                let optional_marker = if self.optional_columns.contains(&column.name) {
                    "(optional)"
                } else {
                    ""
                };
                match &column.data_type {
                    Some(data_type) => format!("{}{optional_marker}={data_type}", column.name),
                    None => format!("{}{optional_marker}", column.name),
                }
            })
            .collect::<Vec<String>>()
            .join(",")
    }

    /// The `"fail"` body of the compiled schema expression: the mismatch
    /// conditions the engine evaluates.
    pub fn fail_body(&self) -> Value {
        let mut column_map = serde_json::Map::new();
        for column in &self.columns {
            let data_type = match &column.data_type {
                Some(data_type) => Value::String(data_type.clone()),
                None => Value::Null,
            };
            column_map.insert(column.name.clone(), data_type);
        }

        let mut mismatching = serde_json::Map::new();
        mismatching.insert(
            "when mismatching columns".to_string(),
            Value::Object(column_map),
        );
        if !self.optional_columns.is_empty() {
            mismatching.insert(
                "with optional columns".to_string(),
                Value::Array(
                    self.optional_columns
                        .iter()
                        .cloned()
                        .map(Value::String)
                        .collect(),
                ),
            );
        }
        Value::Object(mismatching)
    }
}

/// Builds the schema check of a contract. Every contract with a column list
/// carries exactly one.
pub fn create_schema_check(
    verification_context: &str,
    dataset: &str,
    expectation: SchemaExpectation,
) -> Check {
    Check {
        verification_context: verification_context.to_string(),
        check_type: "schema".to_string(),
        identity: create_identity(verification_context, "schema", None),
        name: None,
        dataset: dataset.to_string(),
        column: None,
        skip: false,
        threshold: Threshold::default(),
        missing_configurations: None,
        valid_configurations: None,
        variant: CheckVariant::Schema(expectation),
    }
}

/// Reduces a schema check record into its result detail.
///
/// The measured schema comes from the `"schema"` metric; the column-level
/// mismatches come from the record's diagnostics. When extra columns are
/// allowed, the not-allowed list is dropped from the result.
pub(crate) fn reduce(
    expectation: &SchemaExpectation,
    record: &CheckRecord,
    logs: &mut Logs,
) -> CheckResultDetail {
    let measured_schema = match record.metric("schema").and_then(|m| m.value.as_ref()) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("columnName")?.as_str()?.to_string();
                let data_type = entry
                    .get("sourceDataType")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(MeasuredColumn { name, data_type })
            })
            .collect(),
        _ => {
            logs.debug("Engine returned no 'schema' metric".to_string());
            Vec::new()
        }
    };

    let columns_not_allowed_and_present = if expectation.extra_columns_allowed {
        Vec::new()
    } else {
        record.diagnostic_str_list("present_column_names")
    };

    let columns_having_wrong_type = match record.diagnostic("column_type_mismatches") {
        Some(Value::Object(mismatches)) => mismatches
            .iter()
            .map(|(column, mismatch)| DataTypeMismatch {
                column: column.clone(),
                expected_data_type: mismatch
                    .get("expected_type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                actual_data_type: mismatch
                    .get("actual_type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect(),
        _ => Vec::new(),
    };

    CheckResultDetail::Schema {
        expected_schema: expectation.expected_schema_str(),
        measured_schema,
        columns_not_allowed_and_present,
        columns_required_and_not_present: record.diagnostic_str_list("missing_column_names"),
        columns_having_wrong_type,
    }
}
