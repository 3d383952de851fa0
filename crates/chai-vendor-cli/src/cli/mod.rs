//! Command-line interface definition for chai-vendor.
//!
//! - `chai-vendor build` - vendor chai and the installed plugins
//! - `chai-vendor check` - show which plugins a build would vendor

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ProjectArgs};

/// chai-vendor - ship chai and its plugins with your test build
#[derive(Parser, Debug)]
#[command(
    name = "chai-vendor",
    version,
    about = "Vendor chai and its installed plugins into a test build",
    long_about = "chai-vendor reads package.json, picks the chai plugins that are installed\n\
                  in compatible versions, and copies or bundles them into a vendor tree\n\
                  together with an ordered list of scripts to load before the tests."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Logs every plugin selection decision.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
