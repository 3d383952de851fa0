use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available chai-vendor subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the vendor tree and import list
    ///
    /// Copies chai.js and the chai shim, then copies or bundles every
    /// installed plugin whose version is supported. Conflicting plugins are
    /// dropped before anything is written.
    Build(BuildArgs),

    /// Resolve plugins without writing anything
    ///
    /// Lists the catalog packages the project declares, the plugins that
    /// would be vendored, and the scripts the test page would load.
    Check(CheckArgs),
}

/// Options shared by every command that reads a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory containing package.json
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to chai-vendor.json
    ///
    /// Defaults to chai-vendor.json in the project directory, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory under the output directory that receives vendored files
    #[arg(long, value_name = "PATH")]
    pub vendor_root: Option<String>,

    /// Package that ships chai.js
    #[arg(long, value_name = "NAME")]
    pub core_package: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory
    ///
    /// The vendor tree is written to <OUT_DIR>/<VENDOR_ROOT>.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// File name of the import list, relative to the output directory
    #[arg(long, value_name = "FILE")]
    pub imports_file: Option<PathBuf>,

    /// Remove the vendor root before writing
    #[arg(long)]
    pub clean: bool,

    /// Fail instead of replacing files that already exist
    #[arg(long)]
    pub no_overwrite: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the resolution as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
