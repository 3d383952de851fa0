#![cfg_attr(docsrs, feature(doc_cfg))]

//! # chai-vendor
//!
//! Build-time selection and vendoring of chai assertion plugins.
//!
//! Given a JavaScript project's declared dependencies, this crate decides which
//! plugins from a fixed catalog are active, drops plugins that conflict with
//! each other, and produces the vendor tree (copied files and bundled scripts)
//! plus the ordered list of test-only imports a host build should register.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chai_vendor::VendorBuild;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = VendorBuild::new("./my-app").run_for_project().await?;
//!
//! output.tree.write_to("dist/vendor", true)?;
//! for import in &output.imports {
//!     println!("{} ({})", import.path, import.phase);
//! }
//! # Ok(()) }
//! ```
//!
//! ### Resolve without building
//!
//! ```no_run
//! use chai_vendor::{DependencyManifest, VendorBuild};
//!
//! let manifest = DependencyManifest::new()
//!     .with_installed("chai-jquery", "2.1.0")
//!     .with_installed("chai-dom", "1.2.0");
//!
//! let build = VendorBuild::new("./my-app");
//! let resolved = build.resolve(&manifest);
//! assert_eq!(resolved.names().collect::<Vec<_>>(), vec!["chai-jquery"]);
//! ```

use std::path::PathBuf;

pub mod bundle;
pub mod catalog;
pub mod compose;
pub mod conflict;
pub mod constraint;
pub mod diagnostics;
pub mod imports;
pub mod locate;
pub mod manifest;
pub mod materialize;
pub mod output;
pub mod pipeline;
pub mod select;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use bundle::{BundleRequest, RolldownBundler, ScriptBundler};
pub use catalog::{
    BundleFormat, BundleSpec, CATALOG, Materialization, PluginDescriptor, SupportAsset,
    TransformStep,
};
pub use compose::{ComposedTree, compose};
pub use conflict::{ConflictRule, DEFAULT_RULES};
pub use constraint::{ConstraintEvaluator, SemverEvaluator, satisfies};
pub use imports::{ImportDeclaration, LoadPhase, register_imports};
pub use locate::{LocateError, NodeModulesLocator, PackageLocator};
pub use manifest::{DeclaredDependency, DependencyKind, DependencyManifest};
pub use materialize::{AssetMaterializer, Fragment};
pub use pipeline::{DEFAULT_CORE_PACKAGE, DEFAULT_VENDOR_ROOT, Resolution, VendorBuild, VendorOutput};
pub use select::{ResolvedPlugins, select, select_with};

/// Error types for chai-vendor operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selected plugin's package (or the core library) is not installed
    /// where the manifest says it should be.
    #[error("package '{package}' required by '{plugin}' could not be located: {reason}")]
    PackageNotFound {
        plugin: String,
        package: String,
        reason: String,
    },

    /// I/O error with the path that failed.
    #[error("I/O error on {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two fragments claim the same destination in the vendor tree.
    #[error(
        "output collision at '{path}': '{first_path}' from {first_owner} and '{second_path}' from {second_owner}"
    )]
    OutputCollision {
        path: String,
        first_owner: String,
        first_path: String,
        second_owner: String,
        second_path: String,
    },

    /// Bundling or down-leveling a bundle-mode plugin failed.
    #[error("failed to bundle '{plugin}': {diagnostic}")]
    Bundler { plugin: String, diagnostic: String },

    /// The project's `package.json` is missing or malformed.
    #[error("invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Output file already exists and overwrite is disabled.
    #[error("Output exists: {0}")]
    OutputExists(String),
}

/// Result type alias for chai-vendor operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }

    /// Wraps a bundler failure, rendering its diagnostics on one line.
    pub fn bundler(plugin: impl Into<String>, error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler {
            plugin: plugin.into(),
            diagnostic: diagnostics::render(&diagnostics::extract(error)),
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
            Error::IoError { .. } => "IO_ERROR",
            Error::OutputCollision { .. } => "OUTPUT_COLLISION",
            Error::Bundler { .. } => "BUNDLER_ERROR",
            Error::InvalidManifest { .. } => "INVALID_MANIFEST",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::OutputExists(_) => "OUTPUT_EXISTS",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::PackageNotFound { package, .. } => Some(Box::new(format!(
                "'{}' is declared in package.json but not installed.\nRun your package manager's install command and try again.",
                package
            ))),
            Error::OutputCollision { .. } => Some(Box::new(
                "Two vendor assets map to the same output file. Remove one of the conflicting plugins.",
            )),
            Error::InvalidManifest { .. } => Some(Box::new(
                "Check that package.json exists in the project root and is valid JSON.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the output directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::OutputExists(msg) => Some(Box::new(format!(
                "Output file already exists: {}\nEnable overwrite to replace existing files.",
                msg
            ))),
            _ => None,
        }
    }
}
