//! Error types for contract verification.

use thiserror::Error;

/// Result type for contract-guard operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Errors that can occur while parsing, compiling or verifying a contract.
///
/// Most problems inside check compilation and result reduction are recovered
/// locally into the [`Logs`](crate::diagnostics::Logs) collector; only
/// conditions that leave the caller with nothing to execute surface as a
/// `ContractError`.
#[derive(Error, Debug)]
pub enum ContractError {
    /// The contract configuration could not produce a single executable check.
    #[error("No executable checks parsed for dataset '{dataset}'")]
    NoChecks {
        /// Dataset named by the contract, or a placeholder when unknown.
        dataset: String,
    },

    /// The contract configuration tree had the wrong overall shape.
    #[error("Invalid contract: {0}")]
    InvalidContract(String),

    /// The query-engine collaborator reported a failure.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Serialization of a compiled expression or result payload failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContractError {
    /// Creates an invalid-contract error with the given message.
    pub fn invalid_contract(msg: impl Into<String>) -> Self {
        Self::InvalidContract(msg.into())
    }

    /// Creates an engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}
