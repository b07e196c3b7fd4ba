//! Prelude for commonly used types in contract-guard.

pub use crate::config::ConfigNode;
pub use crate::contract::{Contract, ContractResult};
pub use crate::diagnostics::{Location, Logs};
pub use crate::engine::{CheckRecord, ProfilingDataSource};
pub use crate::error::{ContractError, Result};
pub use crate::logging::setup::LoggingConfig;
pub use crate::profiling::{ProfileLimits, ProfileRunResult, ProfileSelection};
pub use crate::results::{CheckOutcome, CheckResult};
pub use crate::threshold::Threshold;
