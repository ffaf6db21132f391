//! Error types for cfgmgr operations.
//!
//! This module defines the error types used throughout the cfgmgr crates.
//! All errors implement `std::error::Error` via `thiserror`.
//!
//! A node that is missing from the configuration tree is never an error;
//! lookups report absence through their return type instead.

use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// The transaction engine refused to commit a batch.
    #[error("Transaction rejected at '{xpath}': {reason}")]
    TransactionRejected {
        /// The path of the edit that failed validation.
        xpath: String,
        /// Why the batch was rejected.
        reason: String,
    },

    /// A command argument did not match its schema.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// The argument name from the command schema.
        argument: String,
        /// Error message.
        message: String,
    },

    /// No handler is registered for a verb.
    #[error("Unknown command: '{verb}'")]
    UnknownCommand {
        /// The verb that was looked up.
        verb: String,
    },

    /// Interface name is not a valid kernel interface name.
    #[error("Invalid interface name '{name}'")]
    InvalidInterfaceName {
        /// The offending name.
        name: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad {
        /// The file path.
        path: String,
        /// Error message.
        message: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl CfgMgrError {
    /// Creates a transaction rejected error.
    pub fn transaction_rejected(xpath: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransactionRejected {
            xpath: xpath.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(verb: impl Into<String>) -> Self {
        Self::UnknownCommand { verb: verb.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration load error.
    pub fn config_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error came from the caller's input rather
    /// than from the transaction engine.
    ///
    /// These map to "no match" at the command layer.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CfgMgrError::InvalidArgument { .. }
                | CfgMgrError::UnknownCommand { .. }
                | CfgMgrError::InvalidInterfaceName { .. }
        )
    }
}
