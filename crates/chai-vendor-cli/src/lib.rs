//! Command-line driver for [`chai_vendor`].
//!
//! `chai-vendor build` reads a project's `package.json`, picks the chai
//! plugins it has installed, and writes the vendor tree plus an import list
//! into the output directory. `chai-vendor check` stops after resolution and
//! reports what a build would do.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - command implementations
//! - [`config`] - `chai-vendor.json` / environment / flag merging
//! - [`error`] - CLI error types and miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal status output
//!
//! # Example
//!
//! ```rust,no_run
//! use chai_vendor_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
