//! Helpers shared by the commands.

use crate::cli::ProjectArgs;
use crate::config::{ConfigOverrides, VendorConfig, resolve_path};
use crate::error::{CliError, ConfigError, Result, ResultExt};
use chai_vendor::ImportDeclaration;
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Loads configuration and locates the project it applies to.
///
/// Fails with [`ConfigError::ProjectNotFound`] when the project directory
/// has no `package.json`.
pub fn load_project(
    project: &ProjectArgs,
    overrides: &ConfigOverrides,
) -> Result<(VendorConfig, PathBuf)> {
    let cwd = get_cwd()?;
    let base_dir = match &project.cwd {
        Some(dir) => resolve_path(dir, &cwd),
        None => cwd,
    };

    let config = VendorConfig::load(&base_dir, project.config.as_deref(), overrides)?;
    let root = config.project_root(&base_dir);
    if !root.join("package.json").is_file() {
        return Err(ConfigError::ProjectNotFound(root).into());
    }

    tracing::debug!(root = %root.display(), ?config, "loaded project");
    Ok((config, root))
}

/// Removes a previously written vendor tree.
pub fn clean_vendor_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Vendor path exists but is not a directory: {}",
            dir.display()
        )));
    }
    fs::remove_dir_all(dir).context(format!("Failed to clean {}", dir.display()))
}

/// Fails with `OutputExists` when `path` is present and may not be replaced.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(chai_vendor::Error::OutputExists(path.display().to_string()).into());
    }
    Ok(())
}

/// Writes the import list as pretty-printed JSON.
pub async fn write_imports(
    path: &Path,
    imports: &[ImportDeclaration],
    overwrite: bool,
) -> Result<()> {
    ensure_writable(path, overwrite)?;

    let mut json = serde_json::to_string_pretty(imports)?;
    json.push('\n');

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await.with_path(path)
}
