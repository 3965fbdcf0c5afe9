//! CLI error types

use thiserror::Error;

use crate::error::NodeTypeError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file could not be read
    #[error("Failed to read {0}: {1}")]
    FileReadError(String, String),

    /// Output file could not be written
    #[error("Failed to write {0}: {1}")]
    FileWriteError(String, String),

    /// Bad command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rendering command output failed
    #[error("Output error: {0}")]
    OutputError(String),

    /// Validation, import or export failed
    #[error(transparent)]
    NodeType(#[from] NodeTypeError),
}
