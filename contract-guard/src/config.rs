//! Located configuration tree and typed value extraction.
//!
//! The ingestion layer (YAML parsing, variable resolution) lives outside this
//! crate; it hands over a [`ConfigNode`] tree in which every node may carry
//! the source [`Location`] it was read from. All check constructors go
//! through the typed `read_*` methods below, which log a structured error
//! into the [`Logs`] collector and return `None` (or a default) instead of
//! failing fast, so a single parse pass surfaces every configuration error.

use crate::diagnostics::{Location, Logs};
use crate::threshold::Range;
use serde_json::Number;

/// A configuration value: scalar, list or map.
///
/// Map entries preserve declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<ConfigNode>),
    Map(Vec<(String, ConfigNode)>),
}

impl ConfigValue {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Number(_) => "a number",
            ConfigValue::String(_) => "a string",
            ConfigValue::List(_) => "a list",
            ConfigValue::Map(_) => "an object",
        }
    }

    /// Converts the value into its `serde_json` form, dropping locations.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => serde_json::Value::Number(n.clone()),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::List(items) => {
                serde_json::Value::Array(items.iter().map(|n| n.value.to_json()).collect())
            }
            ConfigValue::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, n)| (k.clone(), n.value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// A configuration tree node with an optional source location.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    pub value: ConfigValue,
    pub location: Option<Location>,
}

impl ConfigNode {
    /// Wraps a value without location information.
    pub fn new(value: ConfigValue) -> Self {
        Self {
            value,
            location: None,
        }
    }

    /// Wraps a value with a source location.
    pub fn with_location(value: ConfigValue, location: Location) -> Self {
        Self {
            value,
            location: Some(location),
        }
    }

    /// Builds a location-less tree from a `serde_json` value.
    ///
    /// Intended for tests and for embedders that already hold a parsed
    /// configuration document.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let config_value = match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(*b),
            serde_json::Value::Number(n) => ConfigValue::Number(n.clone()),
            serde_json::Value::String(s) => ConfigValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                ConfigValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        };
        Self::new(config_value)
    }

    /// Looks up a direct child of a map node.
    pub fn entry(&self, key: &str) -> Option<&ConfigNode> {
        match &self.value {
            ConfigValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    /// Returns true if a map node contains the key.
    pub fn has_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Returns the map entries if this node is a map.
    pub fn as_map(&self) -> Option<&[(String, ConfigNode)]> {
        match &self.value {
            ConfigValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the list items if this node is a list.
    pub fn as_list(&self) -> Option<&[ConfigNode]> {
        match &self.value {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string value if this node is a string.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value if this node is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value if this node is a number.
    pub fn as_number(&self) -> Option<&Number> {
        match &self.value {
            ConfigValue::Number(n) => Some(n),
            _ => None,
        }
    }

    fn child_location(&self, child: &ConfigNode) -> Option<Location> {
        child.location.clone().or_else(|| self.location.clone())
    }

    fn read_entry<'a>(&'a self, key: &str, required: bool, logs: &mut Logs) -> Option<&'a ConfigNode> {
        match self.entry(key) {
            Some(node) => Some(node),
            None => {
                if required {
                    logs.error_at(format!("'{key}' is required"), self.location.clone());
                }
                None
            }
        }
    }

    fn type_mismatch(&self, key: &str, expected: &str, child: &ConfigNode, logs: &mut Logs) {
        logs.error_at(
            format!(
                "'{key}' expected {expected}, but was {actual}",
                actual = child.value.type_name()
            ),
            self.child_location(child),
        );
    }

    /// Reads a required string value; logs an error when absent or mistyped.
    pub fn read_string(&self, key: &str, logs: &mut Logs) -> Option<String> {
        let child = self.read_entry(key, true, logs)?;
        match child.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.type_mismatch(key, "a string", child, logs);
                None
            }
        }
    }

    /// Reads an optional string value; logs an error only on a type mismatch.
    pub fn read_string_opt(&self, key: &str, logs: &mut Logs) -> Option<String> {
        let child = self.read_entry(key, false, logs)?;
        match child.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.type_mismatch(key, "a string", child, logs);
                None
            }
        }
    }

    /// Reads an optional boolean value.
    pub fn read_bool_opt(&self, key: &str, logs: &mut Logs) -> Option<bool> {
        let child = self.read_entry(key, false, logs)?;
        match child.as_bool() {
            Some(b) => Some(b),
            None => {
                self.type_mismatch(key, "a boolean", child, logs);
                None
            }
        }
    }

    /// Reads a required numeric value.
    pub fn read_number(&self, key: &str, logs: &mut Logs) -> Option<Number> {
        let child = self.read_entry(key, true, logs)?;
        match child.as_number() {
            Some(n) => Some(n.clone()),
            None => {
                self.type_mismatch(key, "a number", child, logs);
                None
            }
        }
    }

    /// Reads an optional numeric value.
    pub fn read_number_opt(&self, key: &str, logs: &mut Logs) -> Option<Number> {
        let child = self.read_entry(key, false, logs)?;
        match child.as_number() {
            Some(n) => Some(n.clone()),
            None => {
                self.type_mismatch(key, "a number", child, logs);
                None
            }
        }
    }

    /// Reads an optional integer value.
    pub fn read_integer_opt(&self, key: &str, logs: &mut Logs) -> Option<i64> {
        let number = self.read_number_opt(key, logs)?;
        match number.as_i64() {
            Some(i) => Some(i),
            None => {
                logs.error_at(
                    format!("'{key}' expected an integer, but was {number}"),
                    self.location.clone(),
                );
                None
            }
        }
    }

    /// Reads a required list value.
    pub fn read_list(&self, key: &str, logs: &mut Logs) -> Option<&[ConfigNode]> {
        let child = self.read_entry(key, true, logs)?;
        match child.as_list() {
            Some(items) => Some(items),
            None => {
                self.type_mismatch(key, "a list", child, logs);
                None
            }
        }
    }

    /// Reads an optional list value.
    pub fn read_list_opt(&self, key: &str, logs: &mut Logs) -> Option<&[ConfigNode]> {
        let child = self.read_entry(key, false, logs)?;
        match child.as_list() {
            Some(items) => Some(items),
            None => {
                self.type_mismatch(key, "a list", child, logs);
                None
            }
        }
    }

    /// Reads an optional list of strings.
    pub fn read_list_of_strings_opt(&self, key: &str, logs: &mut Logs) -> Option<Vec<String>> {
        let items = self.read_list_opt(key, logs)?;
        if items.iter().all(|item| item.as_str().is_some()) {
            Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )
        } else {
            logs.error_at(
                format!("Not all elements in list '{key}' are strings"),
                self.location.clone(),
            );
            None
        }
    }

    /// Reads a required list whose elements must all be maps.
    pub fn read_list_of_maps(&self, key: &str, logs: &mut Logs) -> Option<Vec<&ConfigNode>> {
        let items = self.read_list(key, logs)?;
        if items.iter().all(|item| item.as_map().is_some()) {
            Some(items.iter().collect())
        } else {
            logs.error_at(
                format!("Not all elements in list '{key}' are objects"),
                self.location.clone(),
            );
            None
        }
    }

    /// Reads an optional list of scalar values (strings, numbers or booleans).
    pub fn read_scalar_list_opt(&self, key: &str, logs: &mut Logs) -> Option<Vec<serde_json::Value>> {
        let items = self.read_list_opt(key, logs)?;
        let all_scalars = items.iter().all(|item| {
            !matches!(item.value, ConfigValue::List(_) | ConfigValue::Map(_))
        });
        if all_scalars {
            Some(items.iter().map(|item| item.value.to_json()).collect())
        } else {
            logs.error_at(
                format!("Not all elements in list '{key}' are scalar values"),
                self.location.clone(),
            );
            None
        }
    }

    /// Reads an optional map value.
    pub fn read_map_opt(&self, key: &str, logs: &mut Logs) -> Option<&ConfigNode> {
        let child = self.read_entry(key, false, logs)?;
        match child.as_map() {
            Some(_) => Some(child),
            None => {
                self.type_mismatch(key, "an object", child, logs);
                None
            }
        }
    }

    /// Reads an optional two-number range, e.g. `[0, 100]`.
    pub fn read_range_opt(&self, key: &str, logs: &mut Logs) -> Option<Range> {
        let items = self.read_list_opt(key, logs)?;
        let numbers: Vec<&Number> = items.iter().filter_map(|item| item.as_number()).collect();
        if numbers.len() == 2 && items.len() == 2 {
            Some(Range {
                lower_bound: numbers[0].clone(),
                upper_bound: numbers[1].clone(),
            })
        } else {
            logs.error_at(
                format!("'{key}' expects a list of 2 numbers"),
                self.location.clone(),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> ConfigNode {
        ConfigNode::from_json(&value)
    }

    #[test]
    fn test_read_string_required_absent() {
        let mut logs = Logs::new();
        let n = node(json!({"type": "missing_count"}));
        assert_eq!(n.read_string("name", &mut logs), None);
        assert_eq!(logs.error_messages(), vec!["'name' is required"]);
    }

    #[test]
    fn test_read_string_type_mismatch_reports_and_returns_none() {
        let mut logs = Logs::new();
        let n = node(json!({"name": 42}));
        assert_eq!(n.read_string("name", &mut logs), None);
        assert_eq!(
            logs.error_messages(),
            vec!["'name' expected a string, but was a number"]
        );
    }

    #[test]
    fn test_read_string_opt_absent_is_silent() {
        let mut logs = Logs::new();
        let n = node(json!({}));
        assert_eq!(n.read_string_opt("name", &mut logs), None);
        assert!(!logs.has_errors());
    }

    #[test]
    fn test_errors_do_not_abort_sibling_reads() {
        let mut logs = Logs::new();
        let n = node(json!({"skip": "yes", "name": 7}));
        assert_eq!(n.read_bool_opt("skip", &mut logs), None);
        assert_eq!(n.read_string_opt("name", &mut logs), None);
        assert_eq!(logs.error_messages().len(), 2);
    }

    #[test]
    fn test_read_list_of_strings() {
        let mut logs = Logs::new();
        let n = node(json!({"columns": ["a", "b"]}));
        assert_eq!(
            n.read_list_of_strings_opt("columns", &mut logs),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        let mixed = node(json!({"columns": ["a", 1]}));
        assert_eq!(mixed.read_list_of_strings_opt("columns", &mut logs), None);
        assert_eq!(
            logs.error_messages(),
            vec!["Not all elements in list 'columns' are strings"]
        );
    }

    #[test]
    fn test_read_range() {
        let mut logs = Logs::new();
        let n = node(json!({"must_be_between": [0, 100]}));
        let range = n.read_range_opt("must_be_between", &mut logs).unwrap();
        assert_eq!(range.lower_bound, Number::from(0));
        assert_eq!(range.upper_bound, Number::from(100));

        let bad = node(json!({"must_be_between": [0, "x"]}));
        assert_eq!(bad.read_range_opt("must_be_between", &mut logs), None);
        assert!(logs.has_errors());
    }

    #[test]
    fn test_map_preserves_lookup() {
        let mut logs = Logs::new();
        let n = node(json!({"dataset": "orders", "columns": []}));
        assert_eq!(n.read_string("dataset", &mut logs), Some("orders".to_string()));
        assert!(n.read_list("columns", &mut logs).is_some());
        assert!(!logs.has_errors());
    }
}
