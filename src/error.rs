//! Error handling for the firstboot wizard
//!
//! Provides centralized error types using thiserror. All fallible operations
//! in the crate return [`Result`] so failures carry enough context to be
//! shown to the operator or logged.

use thiserror::Error;

/// Main error type for the firstboot wizard
#[derive(Error, Debug)]
pub enum FirstbootError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Minimum-UID policy file errors
    #[error("Policy error: {0}")]
    Policy(String),

    /// Validation errors (user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account database errors (lookups, persistence)
    #[error("Account error: {0}")]
    Account(String),

    /// System errors (external commands, processes)
    #[error("System error: {0}")]
    System(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, FirstbootError>;

impl FirstbootError {
    /// Create a policy error
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an account error
    pub fn account(msg: impl Into<String>) -> Self {
        Self::Account(msg.into())
    }

    /// Create a system error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}
