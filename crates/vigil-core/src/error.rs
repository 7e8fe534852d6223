//! Registry error types

use thiserror::Error;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Policy already registered: {0}")]
    DuplicateName(String),

    #[error("Invalid policy name '{0}': names must be lowercase and hyphen-delimited")]
    InvalidName(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
