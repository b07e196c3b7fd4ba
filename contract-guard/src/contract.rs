//! Contract parsing and the verification result.
//!
//! A contract declares one dataset's expected schema plus its column-level
//! and dataset-level checks. Parsing is a single pass that collects every
//! configuration error into the caller's [`Logs`]; the caller inspects the
//! collector afterwards and decides whether to proceed to execution.

use crate::checks::factory::{build_check, CheckArgs, CheckParse};
use crate::checks::configurations::{MissingConfigurations, ValidConfigurations};
use crate::checks::schema::{create_schema_check, SchemaExpectation};
use crate::checks::{Check, CheckExpression};
use crate::config::ConfigNode;
use crate::diagnostics::Logs;
use crate::engine::CheckRecord;
use crate::error::{ContractError, Result};
use crate::results::{CheckOutcome, CheckResult};
use crate::threshold::Threshold;
use std::fmt;

/// A parsed contract: the dataset plus all its checks, including skipped
/// ones.
#[derive(Debug, Clone)]
pub struct Contract {
    pub verification_context: String,
    pub dataset: String,
    pub checks: Vec<Check>,
}

impl Contract {
    /// Parses a contract configuration tree.
    ///
    /// Configuration errors are collected into `logs`, not returned; the only
    /// hard failure is a contract that yields no checks at all.
    pub fn parse(
        contract_node: &ConfigNode,
        verification_context: &str,
        logs: &mut Logs,
    ) -> Result<Contract> {
        if contract_node.as_map().is_none() {
            return Err(ContractError::invalid_contract(format!(
                "contract configuration must be an object, but was {}",
                contract_node.value.type_name()
            )));
        }
        let dataset = contract_node
            .read_string("dataset", logs)
            .unwrap_or_default();

        let mut checks: Vec<Check> = Vec::new();

        if contract_node.has_key("columns") {
            let expectation = SchemaExpectation::parse(contract_node, logs);
            checks.push(create_schema_check(
                verification_context,
                &dataset,
                expectation,
            ));
            parse_column_checks(contract_node, verification_context, &dataset, &mut checks, logs);
        }

        parse_dataset_checks(contract_node, verification_context, &dataset, &mut checks, logs);

        if checks.is_empty() {
            return Err(ContractError::NoChecks { dataset });
        }
        Ok(Contract {
            verification_context: verification_context.to_string(),
            dataset,
            checks,
        })
    }

    /// Compiles all non-skipped checks into engine-native expressions.
    pub fn to_check_expressions(&self) -> Vec<CheckExpression> {
        self.checks
            .iter()
            .filter(|check| !check.skip)
            .map(Check::to_check_expression)
            .collect()
    }

    /// Correlates engine result records back to their checks and reduces
    /// them into one result per non-skipped check.
    ///
    /// A check whose record is missing gets an unverified result and an
    /// error in the collector; the remaining records are still reduced.
    pub fn create_result(&self, records: &[CheckRecord], logs: &mut Logs) -> ContractResult {
        let mut check_results = Vec::new();
        for check in self.checks.iter().filter(|check| !check.skip) {
            let record = records
                .iter()
                .find(|record| record.contract_check_id.as_deref() == Some(&check.identity));
            match record {
                Some(record) => check_results.push(check.create_check_result(record, logs)),
                None => {
                    logs.error(format!("No engine result for check {}", check.identity));
                    check_results
                        .push(check.create_check_result(&CheckRecord::default(), logs));
                }
            }
        }
        ContractResult {
            dataset: self.dataset.clone(),
            check_results,
        }
    }
}

fn parse_threshold(check_node: &ConfigNode, logs: &mut Logs) -> Threshold {
    Threshold {
        greater_than: check_node.read_number_opt("must_be_greater_than", logs),
        greater_than_or_equal: check_node.read_number_opt("must_be_greater_than_or_equal_to", logs),
        less_than: check_node.read_number_opt("must_be_less_than", logs),
        less_than_or_equal: check_node.read_number_opt("must_be_less_than_or_equal_to", logs),
        equal: check_node.read_number_opt("must_be", logs),
        not_equal: check_node.read_number_opt("must_not_be", logs),
        between: check_node.read_range_opt("must_be_between", logs),
        not_between: check_node.read_range_opt("must_be_not_between", logs),
    }
}

fn parse_check_entry(
    check_node: &ConfigNode,
    verification_context: &str,
    dataset: &str,
    column: Option<&str>,
    columns: Option<Vec<String>>,
    checks: &mut Vec<Check>,
    logs: &mut Logs,
) {
    let Some(check_type) = check_node.read_string("type", logs) else {
        return;
    };
    let args = CheckArgs {
        verification_context,
        check_type: &check_type,
        check_node,
        dataset,
        column,
        columns,
        missing_configurations: MissingConfigurations::parse(check_node, logs),
        valid_configurations: ValidConfigurations::parse(check_node, logs),
        threshold: parse_threshold(check_node, logs),
    };
    match build_check(&args, logs) {
        CheckParse::Recognized(check) => checks.push(check),
        CheckParse::Unrecognized { check_type } => logs.error_at(
            format!("Unknown check type '{check_type}'"),
            check_node.location.clone(),
        ),
    }
}

fn parse_column_checks(
    contract_node: &ConfigNode,
    verification_context: &str,
    dataset: &str,
    checks: &mut Vec<Check>,
    logs: &mut Logs,
) {
    // structural errors of the columns list were already reported while
    // parsing the schema expectation
    let Some(column_nodes) = contract_node.entry("columns").and_then(ConfigNode::as_list) else {
        return;
    };
    for column_node in column_nodes {
        let Some(column_name) = column_node.entry("name").and_then(ConfigNode::as_str) else {
            continue;
        };
        if !column_node.has_key("checks") {
            continue;
        }
        let Some(check_nodes) = column_node.read_list_of_maps("checks", logs) else {
            continue;
        };
        for check_node in check_nodes {
            parse_check_entry(
                check_node,
                verification_context,
                dataset,
                Some(column_name),
                None,
                checks,
                logs,
            );
        }
    }
}

fn parse_dataset_checks(
    contract_node: &ConfigNode,
    verification_context: &str,
    dataset: &str,
    checks: &mut Vec<Check>,
    logs: &mut Logs,
) {
    if !contract_node.has_key("checks") {
        return;
    }
    let Some(check_nodes) = contract_node.read_list_of_maps("checks", logs) else {
        return;
    };
    for check_node in check_nodes {
        let columns = check_node.read_list_of_strings_opt("columns", logs);
        parse_check_entry(
            check_node,
            verification_context,
            dataset,
            None,
            columns,
            checks,
            logs,
        );
    }
}

/// The outcome of verifying one contract.
#[derive(Debug, Clone)]
pub struct ContractResult {
    pub dataset: String,
    pub check_results: Vec<CheckResult>,
}

impl ContractResult {
    /// Returns true when at least one check failed.
    pub fn failed(&self) -> bool {
        self.check_results
            .iter()
            .any(|result| result.outcome == CheckOutcome::Fail)
    }

    /// Returns true when no check failed.
    pub fn passed(&self) -> bool {
        !self.failed()
    }

    /// The full text report: the report lines of every check result, in
    /// contract order.
    pub fn report_lines(&self) -> Vec<String> {
        self.check_results
            .iter()
            .flat_map(CheckResult::report_lines)
            .collect()
    }
}

impl fmt::Display for ContractResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report_lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CONTEXT: &str = "postgres_ds/public/orders";

    fn parse(contract: serde_json::Value) -> (Result<Contract>, Logs) {
        let mut logs = Logs::new();
        let node = ConfigNode::from_json(&contract);
        let contract = Contract::parse(&node, CONTEXT, &mut logs);
        (contract, logs)
    }

    fn orders_contract() -> serde_json::Value {
        json!({
            "dataset": "orders",
            "columns": [
                {"name": "id", "data_type": "text", "checks": [
                    {"type": "no_missing_values"},
                    {"type": "no_duplicate_values", "skip": true}
                ]},
                {"name": "size", "data_type": "decimal"}
            ],
            "checks": [
                {"type": "row_count", "must_be_greater_than": 0}
            ]
        })
    }

    #[test]
    fn test_parse_builds_schema_column_and_dataset_checks() {
        let (contract, logs) = parse(orders_contract());
        let contract = contract.unwrap();
        assert!(!logs.has_errors());
        assert_eq!(contract.dataset, "orders");

        let lines: Vec<String> = contract.checks.iter().map(Check::check_line).collect();
        assert_eq!(
            lines,
            vec![
                "schema",
                "missing_count(id) = 0",
                "duplicate_count(id) = 0",
                "row_count > 0",
            ]
        );
    }

    #[test]
    fn test_skipped_checks_are_parsed_but_not_compiled() {
        let (contract, _) = parse(orders_contract());
        let contract = contract.unwrap();
        assert_eq!(contract.checks.len(), 4);

        let keys: Vec<String> = contract
            .to_check_expressions()
            .into_iter()
            .map(|expression| expression.key)
            .collect();
        assert_eq!(keys, vec!["schema", "missing_count(id) = 0", "row_count > 0"]);
    }

    #[test]
    fn test_non_object_contract_is_invalid() {
        let (contract, logs) = parse(json!(["dataset", "orders"]));
        match contract {
            Err(ContractError::InvalidContract(message)) => {
                assert_eq!(
                    message,
                    "contract configuration must be an object, but was a list"
                );
            }
            other => panic!("expected InvalidContract error, got {other:?}"),
        }
        assert!(!logs.has_errors());
    }

    #[test]
    fn test_contract_without_checks_is_an_error() {
        let (contract, _) = parse(json!({"dataset": "orders"}));
        match contract {
            Err(ContractError::NoChecks { dataset }) => assert_eq!(dataset, "orders"),
            other => panic!("expected NoChecks error, got {other:?}"),
        }
    }

    #[test]
    fn test_one_pass_collects_all_errors() {
        let (contract, logs) = parse(json!({
            "dataset": "orders",
            "columns": [
                {"name": "id", "checks": [
                    {"type": "not a type!!"},
                    {"type": "missing_count", "must_be_less_than": "five"}
                ]}
            ],
            "checks": [
                {"must_be": 0}
            ]
        }));
        assert!(contract.is_ok());
        assert_eq!(
            logs.error_messages(),
            vec![
                "Unknown check type 'not a type!!'",
                "'must_be_less_than' expected a number, but was a string",
                "'type' is required",
            ]
        );
    }

    #[test]
    fn test_multi_column_duplicate_check_at_dataset_level() {
        let (contract, logs) = parse(json!({
            "dataset": "orders",
            "checks": [
                {"type": "no_duplicate_values", "columns": ["country", "zip"]}
            ]
        }));
        let contract = contract.unwrap();
        assert!(!logs.has_errors());
        assert_eq!(
            contract.checks[0].check_line(),
            "duplicate_count(country, zip) = 0"
        );
    }

    #[test]
    fn test_create_result_correlates_by_contract_check_id() {
        let (contract, mut logs) = parse(json!({
            "dataset": "orders",
            "checks": [
                {"type": "row_count", "must_be_greater_than": 0},
                {"type": "duplicate_count", "must_be": 0}
            ]
        }));
        let contract = contract.unwrap();
        let records: Vec<CheckRecord> = serde_json::from_value(json!([
            {
                "contract_check_id": format!("{CONTEXT},type=row_count"),
                "outcome": "pass",
                "metrics": {"row_count": {"value": 120}}
            }
        ]))
        .unwrap();

        let result = contract.create_result(&records, &mut logs);
        assert_eq!(result.check_results.len(), 2);
        assert_eq!(result.check_results[0].outcome, CheckOutcome::Pass);
        // second check has no record: unverified, and the gap is reported
        assert_eq!(result.check_results[1].outcome, CheckOutcome::Unknown);
        assert_eq!(
            logs.error_messages(),
            vec![format!("No engine result for check {CONTEXT},type=duplicate_count").as_str()]
        );
        assert!(result.passed());
    }

    #[test]
    fn test_report_lists_every_check() {
        let (contract, mut logs) = parse(orders_contract());
        let contract = contract.unwrap();
        let records: Vec<CheckRecord> = serde_json::from_value(json!([
            {
                "contract_check_id": format!("{CONTEXT},type=no_missing_values"),
                "outcome": "fail",
                "metrics": {"missing_count": {"value": 3}}
            },
            {
                "contract_check_id": format!("{CONTEXT},type=schema"),
                "outcome": "pass",
                "metrics": {"schema": {"value": [
                    {"columnName": "id", "sourceDataType": "text"},
                    {"columnName": "size", "sourceDataType": "decimal"}
                ]}}
            },
            {
                "contract_check_id": format!("{CONTEXT},type=row_count"),
                "outcome": "pass",
                "metrics": {"row_count": {"value": 120}}
            }
        ]))
        .unwrap();

        let result = contract.create_result(&records, &mut logs);
        assert!(result.failed());
        let report = result.to_string();
        assert!(report.contains("Schema check passed"));
        assert!(report.contains("Check FAILED"));
        assert!(report.contains("  Expected missing_count(id) = 0"));
        assert!(report.contains("  Actual missing_count(id) was 3"));
        assert!(report.contains("  Actual row_count was 120"));
    }
}
