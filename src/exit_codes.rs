//! Exit code standardization for costctl
//!
//! Provides consistent exit codes for different error types so scripts can
//! tell a typo from a broken filesystem.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (invalid input, validation failure, unknown app or step)
//! - `2` = System error (I/O failure, serialization failure)
//! - `3` = Configuration error (config parse error, bad catalog file)

use crate::error::CostctlError;

/// Standard exit codes for costctl
pub mod codes {
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (I/O, serialization)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error (invalid config or catalog)
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a CostctlError to an appropriate exit code
pub fn exit_code_for_error(error: &CostctlError) -> i32 {
    use CostctlError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,
        Catalog(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        AppNotFound(_) => codes::USER_ERROR,
        StepNotFound { .. } => codes::USER_ERROR,

        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
        Export(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that reached `main`.
///
/// Errors that did not originate in the library (plain anyhow context errors)
/// are treated as system errors.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CostctlError>())
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_validation_is_user_error() {
        let err = CostctlError::validation("tier", "out of range");
        assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
    }

    #[test]
    fn test_config_error_code() {
        let err: CostctlError = ConfigError::ParseError("bad".to_string()).into();
        assert_eq!(exit_code_for_error(&err), codes::CONFIG_ERROR);
    }

    #[test]
    fn test_anyhow_chain_is_inspected() {
        let err = anyhow::Error::from(CostctlError::AppNotFound("abc".to_string()))
            .context("Failed to select app");
        assert_eq!(exit_code_for_anyhow(&err), codes::USER_ERROR);

        let plain = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for_anyhow(&plain), codes::SYSTEM_ERROR);
    }
}
