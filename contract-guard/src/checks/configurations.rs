//! Missing-value and valid-value configurations attached to a check.
//!
//! These value objects describe what counts as "missing" or "(in)valid" for a
//! column. They serialize into the compiled check expression through an
//! explicit field-to-key mapping table, so the engine-facing key names are
//! independent of the Rust field names.

use crate::config::ConfigNode;
use crate::diagnostics::Logs;
use serde_json::{Number, Value};

/// Configuration keys recognized as missing-value configuration.
pub const MISSING_KEYS: &[&str] = &["missing_values", "missing_regex_sql"];

/// Configuration keys recognized as validity configuration.
pub const VALIDITY_KEYS: &[&str] = &[
    "invalid_values",
    "invalid_format",
    "invalid_sql_regex",
    "valid_values",
    "valid_format",
    "valid_sql_regex",
    "valid_min",
    "valid_max",
    "valid_length",
    "valid_min_length",
    "valid_max_length",
    "valid_values_reference_data",
];

/// What counts as a missing value for a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingConfigurations {
    /// Explicit values treated as missing, in addition to NULL.
    pub missing_values: Option<Vec<Value>>,
    /// Engine-native regex matching missing values.
    pub missing_regex_sql: Option<String>,
}

impl MissingConfigurations {
    /// Parses the missing-value keys of a check node. Returns `None` when no
    /// missing-value key is present.
    pub fn parse(check_node: &ConfigNode, logs: &mut Logs) -> Option<Self> {
        if !MISSING_KEYS.iter().any(|key| check_node.has_key(key)) {
            return None;
        }
        Some(Self {
            missing_values: check_node.read_scalar_list_opt("missing_values", logs),
            missing_regex_sql: check_node.read_string_opt("missing_regex_sql", logs),
        })
    }

    /// Engine-facing configuration entries, keyed by the explicit mapping
    /// table rather than by field-name convention.
    pub fn to_expression_entries(&self) -> Vec<(&'static str, Value)> {
        let mut entries = Vec::new();
        if let Some(values) = &self.missing_values {
            entries.push(("missing values", Value::Array(values.clone())));
        }
        if let Some(regex) = &self.missing_regex_sql {
            entries.push(("missing regex", Value::String(regex.clone())));
        }
        entries
    }
}

/// A pointer to a reference dataset column holding the allowed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidValuesReferenceData {
    pub dataset: String,
    pub column: String,
}

impl ValidValuesReferenceData {
    fn parse(node: &ConfigNode, logs: &mut Logs) -> Option<Self> {
        let dataset = node.read_string("dataset", logs);
        let column = node.read_string("column", logs);
        Some(Self {
            dataset: dataset?,
            column: column?,
        })
    }
}

/// What counts as a valid (or invalid) value for a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidConfigurations {
    pub invalid_values: Option<Vec<Value>>,
    pub invalid_format: Option<String>,
    pub invalid_sql_regex: Option<String>,
    pub valid_values: Option<Vec<Value>>,
    pub valid_format: Option<String>,
    pub valid_sql_regex: Option<String>,
    pub valid_min: Option<Number>,
    pub valid_max: Option<Number>,
    pub valid_length: Option<i64>,
    pub valid_min_length: Option<i64>,
    pub valid_max_length: Option<i64>,
    pub valid_values_reference_data: Option<ValidValuesReferenceData>,
}

impl ValidConfigurations {
    /// Parses the validity keys of a check node. Returns `None` when no
    /// validity key is present.
    pub fn parse(check_node: &ConfigNode, logs: &mut Logs) -> Option<Self> {
        if !VALIDITY_KEYS.iter().any(|key| check_node.has_key(key)) {
            return None;
        }
        let valid_values_reference_data = check_node
            .read_map_opt("valid_values_reference_data", logs)
            .and_then(|node| ValidValuesReferenceData::parse(node, logs));
        Some(Self {
            invalid_values: check_node.read_scalar_list_opt("invalid_values", logs),
            invalid_format: check_node.read_string_opt("invalid_format", logs),
            invalid_sql_regex: check_node.read_string_opt("invalid_sql_regex", logs),
            valid_values: check_node.read_scalar_list_opt("valid_values", logs),
            valid_format: check_node.read_string_opt("valid_format", logs),
            valid_sql_regex: check_node.read_string_opt("valid_sql_regex", logs),
            valid_min: check_node.read_number_opt("valid_min", logs),
            valid_max: check_node.read_number_opt("valid_max", logs),
            valid_length: check_node.read_integer_opt("valid_length", logs),
            valid_min_length: check_node.read_integer_opt("valid_min_length", logs),
            valid_max_length: check_node.read_integer_opt("valid_max_length", logs),
            valid_values_reference_data,
        })
    }

    /// Returns true when a reference-dataset pointer is configured.
    pub fn has_reference_data(&self) -> bool {
        self.valid_values_reference_data.is_some()
    }

    /// Engine-facing configuration entries. The reference-data pointer is
    /// excluded: it is compiled into the check line itself, not the body.
    pub fn to_expression_entries(&self) -> Vec<(&'static str, Value)> {
        let mut entries: Vec<(&'static str, Value)> = Vec::new();
        if let Some(values) = &self.invalid_values {
            entries.push(("invalid values", Value::Array(values.clone())));
        }
        if let Some(format) = &self.invalid_format {
            entries.push(("invalid format", Value::String(format.clone())));
        }
        if let Some(regex) = &self.invalid_sql_regex {
            entries.push(("invalid regex", Value::String(regex.clone())));
        }
        if let Some(values) = &self.valid_values {
            entries.push(("valid values", Value::Array(values.clone())));
        }
        if let Some(format) = &self.valid_format {
            entries.push(("valid format", Value::String(format.clone())));
        }
        if let Some(regex) = &self.valid_sql_regex {
            entries.push(("valid regex", Value::String(regex.clone())));
        }
        if let Some(min) = &self.valid_min {
            entries.push(("valid min", Value::Number(min.clone())));
        }
        if let Some(max) = &self.valid_max {
            entries.push(("valid max", Value::Number(max.clone())));
        }
        if let Some(length) = self.valid_length {
            entries.push(("valid length", Value::from(length)));
        }
        if let Some(length) = self.valid_min_length {
            entries.push(("valid min length", Value::from(length)));
        }
        if let Some(length) = self.valid_max_length {
            entries.push(("valid max length", Value::from(length)));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_keys_yield_no_configuration() {
        let mut logs = Logs::new();
        let node = ConfigNode::from_json(&json!({"type": "missing_count"}));
        assert_eq!(MissingConfigurations::parse(&node, &mut logs), None);
        assert_eq!(ValidConfigurations::parse(&node, &mut logs), None);
        assert!(!logs.has_errors());
    }

    #[test]
    fn test_missing_configuration_expression_keys() {
        let mut logs = Logs::new();
        let node = ConfigNode::from_json(&json!({
            "missing_values": ["N/A", -1],
            "missing_regex_sql": "^\\s*$"
        }));
        let missing = MissingConfigurations::parse(&node, &mut logs).unwrap();
        let entries = missing.to_expression_entries();
        assert_eq!(
            entries,
            vec![
                ("missing values", json!(["N/A", -1])),
                ("missing regex", json!("^\\s*$")),
            ]
        );
    }

    #[test]
    fn test_validity_expression_keys_exclude_reference_data() {
        let mut logs = Logs::new();
        let node = ConfigNode::from_json(&json!({
            "valid_values": ["S", "M", "L"],
            "valid_min_length": 1,
            "valid_sql_regex": "^[SML]$",
            "valid_values_reference_data": {"dataset": "sizes", "column": "code"}
        }));
        let valid = ValidConfigurations::parse(&node, &mut logs).unwrap();
        assert!(valid.has_reference_data());

        let keys: Vec<&str> = valid
            .to_expression_entries()
            .iter()
            .map(|(key, _)| *key)
            .collect();
        assert_eq!(keys, vec!["valid values", "valid regex", "valid min length"]);
    }

    #[test]
    fn test_reference_data_requires_dataset_and_column() {
        let mut logs = Logs::new();
        let node = ConfigNode::from_json(&json!({
            "valid_values_reference_data": {"dataset": "sizes"}
        }));
        let valid = ValidConfigurations::parse(&node, &mut logs).unwrap();
        assert!(!valid.has_reference_data());
        assert_eq!(logs.error_messages(), vec!["'column' is required"]);
    }
}
