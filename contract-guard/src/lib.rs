//! # Contract Guard - Data Contract Verification for Rust
//!
//! Contract Guard turns a declarative data contract into engine-native check
//! expressions and reduces the engine's raw results into typed, reportable
//! check outcomes. It owns no SQL and no connections: a query-engine adapter
//! executes the compiled expressions and hands raw result records back.
//!
//! ## Overview
//!
//! A contract declares one dataset's expected schema plus column-level and
//! dataset-level checks: missing values, duplicates, validity, freshness,
//! reference lookups, user-defined metrics and free-form SQL functions.
//! Verification has three phases:
//!
//! 1. **Parse** the contract configuration tree, collecting every
//!    configuration error in one pass.
//! 2. **Compile** the non-skipped checks into engine-native expressions.
//! 3. **Reduce** the engine's result records into [`results::CheckResult`]s
//!    and a text report with a fixed, scrape-stable format.
//!
//! Column profiling ([`profiling`]) drives the same engine adapter through
//! the [`engine::ProfilingDataSource`] trait and reduces the returned row
//! tuples into typed column profiles.
//!
//! ## Quick Start
//!
//! ```rust
//! use contract_guard::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> contract_guard::error::Result<()> {
//! let mut logs = Logs::new();
//! let contract_node = ConfigNode::from_json(&json!({
//!     "dataset": "orders",
//!     "columns": [
//!         {"name": "id", "data_type": "text", "checks": [
//!             {"type": "no_missing_values"}
//!         ]}
//!     ],
//!     "checks": [
//!         {"type": "row_count", "must_be_greater_than": 0}
//!     ]
//! }));
//!
//! let contract = Contract::parse(&contract_node, "postgres_ds/public/orders", &mut logs)?;
//! assert!(!logs.has_errors());
//!
//! // hand the compiled expressions to a query-engine adapter
//! let expressions = contract.to_check_expressions();
//! assert_eq!(expressions.len(), 3);
//!
//! // reduce the records the adapter returned
//! let records: Vec<CheckRecord> = serde_json::from_value(json!([
//!     {
//!         "contract_check_id": "postgres_ds/public/orders,type=row_count",
//!         "outcome": "pass",
//!         "metrics": {"row_count": {"value": 120}}
//!     }
//! ]))?;
//! let result = contract.create_result(&records, &mut logs);
//! println!("{result}");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod checks;
pub mod config;
pub mod contract;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod profiling;
pub mod results;
pub mod threshold;
