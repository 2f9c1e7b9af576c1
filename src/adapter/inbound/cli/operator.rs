//! Inbound operator accessor for CLI handlers.

use std::path::Path;
use std::sync::OnceLock;

use crate::error::{ConfigError, Result};
use crate::port::inbound::operator::port::OperatorPort;

static OPERATOR: OnceLock<Box<dyn OperatorPort>> = OnceLock::new();

/// Installs the operator implementation used by CLI handlers.
pub fn install(operator: Box<dyn OperatorPort>) -> std::result::Result<(), Box<dyn OperatorPort>> {
    OPERATOR.set(operator)
}

/// Returns the configured operator capability surface for CLI handlers.
///
/// # Errors
///
/// Returns an error if [`install`] was never called.
pub fn operator() -> Result<&'static dyn OperatorPort> {
    OPERATOR
        .get()
        .map(|op| &**op)
        .ok_or_else(|| ConfigError::MissingField { field: "operator" }.into())
}

/// Load config TOML from disk for operator-facing use-cases.
///
/// # Errors
///
/// Returns [`ConfigError::ReadFile`] if the file cannot be read.
pub fn read_config_toml(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile(e).into())
}
