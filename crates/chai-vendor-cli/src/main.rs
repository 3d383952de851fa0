//! chai-vendor CLI entry point.
//!
//! Parses arguments, sets up logging and colors, then dispatches to the
//! selected command.

use chai_vendor_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, args.quiet).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
