//! Codegen error types

use std::path::PathBuf;

use thiserror::Error;

/// Codegen errors
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("No policy modules found under {}", .0.display())]
    EmptyInput(PathBuf),

    #[error(transparent)]
    InvalidName(#[from] vigil_core::RegistryError),
}

impl CodegenError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;
