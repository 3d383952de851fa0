//! Error types for the chai-vendor CLI.
//!
//! `CliError` is what commands return. Configuration problems get their own
//! [`ConfigError`] so that hints can point at the right file or flag; library
//! failures are carried unchanged so their diagnostic codes survive to the
//! report.
//!
//! # Example
//!
//! ```rust,no_run
//! use chai_vendor_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Run chai-vendor from your project root or pass --cwd")
//! }
//! ```

pub mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure inside the vendoring pipeline.
    #[error(transparent)]
    Vendor(#[from] chai_vendor::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create chai-vendor.json or drop --config", .0.display())]
    NotFound(PathBuf),

    /// Merged configuration could not be deserialized
    #[error("Invalid configuration: {0}\n\nHint: Check chai-vendor.json and CHAI_VENDOR_* variables")]
    Extract(String),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    /// The project directory has no package.json
    #[error("No package.json in {}\n\nHint: Point --cwd at the project root", .0.display())]
    ProjectNotFound(PathBuf),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Context helpers for `Result`s flowing into [`CliError`].
pub trait ResultExt<T> {
    /// Turns a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Appends a hint line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefixes the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
