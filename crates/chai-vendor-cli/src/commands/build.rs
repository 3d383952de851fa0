//! `chai-vendor build`.

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::ConfigOverrides;
use crate::error::Result;
use crate::ui;
use std::time::Instant;
use tracing::info;

/// Execute the build command.
///
/// 1. Load configuration (flags > environment > file > defaults)
/// 2. Resolve, materialize and compose the vendor tree
/// 3. Clean the vendor root if requested
/// 4. Write the tree and the import list
///
/// Nothing is written or cleaned when resolution or composition fails, or
/// when the import list exists and may not be overwritten.
pub async fn execute(args: BuildArgs, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    let overrides = ConfigOverrides::from(&args);
    let (config, root) = utils::load_project(&args.project, &overrides)?;
    let vendor_dir = config.vendor_dir(&root);
    let imports_path = config.imports_path(&root);
    utils::ensure_writable(&imports_path, config.overwrite)?;

    let spinner = ui::Spinner::new("Resolving chai plugins...", quiet);
    let output = match config.vendor_build(&root).run_for_project().await {
        Ok(output) => output,
        Err(e) => {
            spinner.fail("Vendoring failed");
            return Err(e.into());
        }
    };
    spinner.set_message("Writing vendor tree...");

    if config.clean {
        info!(dir = %vendor_dir.display(), "cleaning vendor root");
        utils::clean_vendor_dir(&vendor_dir)?;
    }

    output.tree.write_to(&vendor_dir, config.overwrite)?;
    utils::write_imports(&imports_path, &output.imports, config.overwrite).await?;

    let plugins: Vec<_> = output.plugins.names().collect();
    spinner.finish(&format!(
        "Vendored chai with {} plugin{}",
        plugins.len(),
        if plugins.len() == 1 { "" } else { "s" }
    ));

    if !quiet {
        ui::print_tree_summary(&output.tree, &vendor_dir);
        ui::print_imports(&output.imports);
        ui::success(&format!(
            "Wrote {} in {}ms",
            imports_path.display(),
            start_time.elapsed().as_millis()
        ));
    }

    Ok(())
}
