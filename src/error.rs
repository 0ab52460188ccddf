//! Error types for costctl
//!
//! There are two error types: `CostctlError` (main error enum) and
//! `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostctlError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The
//! conversion happens at the CLI boundary using `anyhow::Error::from` so the
//! error chain survives.
//!
//! The cost engine itself never returns an error. Lookups against the pricing
//! catalog (unknown region, unknown currency) and loading persisted state
//! degrade to defaults with a `tracing::warn!` instead of failing. Errors are
//! reserved for things the user asked for explicitly and that cannot be done:
//!
//! - `Validation`: bad CLI input (tier index, "HH:MM" times, instance counts)
//! - `AppNotFound` / `StepNotFound`: referencing something that is not in the
//!   estimate
//! - `Io` / `Json`: reading or writing state, catalogs and exports
//! - `Config`: configuration parsing and validation issues

use thiserror::Error;

/// Main error type for costctl
#[derive(Error, Debug)]
pub enum CostctlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("App not found: {0}")]
    AppNotFound(String),

    #[error("Schedule step not found: {app_id} - step {step_id}")]
    StepNotFound { app_id: String, step_id: u64 },

    #[error("Pricing catalog error: {0}")]
    Catalog(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostctlError>;

impl CostctlError {
    /// Shorthand for the most common error in the CLI layer.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CostctlError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
