//! # CLI Error Type
//!
//! Every failure the command line can report, with its process exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError (config, catalog, import) ──┐                                │
//! │  unreadable order file ────────────────┼──► CliError ──► stderr + code  │
//! │  malformed order JSON ─────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sidecart_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Config, catalog or order import failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Order file is not a valid exported order.
    #[error("Invalid order document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

impl CliError {
    /// Process exit code, following the sysexits convention.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(CoreError::InvalidConfig(_)) => 78,
            CliError::Core(CoreError::ProductNotFound(_))
            | CliError::Core(CoreError::FiscalPositionNotFound(_))
            | CliError::Core(CoreError::Validation(_))
            | CliError::Json(_) => 65,
            CliError::Core(CoreError::Io(_)) | CliError::Read { .. } => 66,
            CliError::Core(_) | CliError::Render(_) => 70,
        }
    }
}
