//! Atomic, path-checked writing of a vendor tree.
//!
//! Every destination is validated to stay inside the output directory before
//! anything touches the disk. Files are first written next to their targets
//! with a `.tmp` suffix and renamed into place once all of them were written,
//! so a failure leaves no half-written tree behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::{debug, warn};

use crate::compose::ComposedTree;
use crate::{Error, Result};

/// Writes `tree` under `dir`.
///
/// Fails without writing anything if a path escapes `dir`, or if a target
/// already exists and `overwrite` is false.
///
/// ```no_run
/// use chai_vendor::compose::compose;
/// use chai_vendor::materialize::shim_fragment;
/// use chai_vendor::output::write_tree_to;
/// use std::path::Path;
///
/// # fn example() -> chai_vendor::Result<()> {
/// let tree = compose([shim_fragment()])?;
/// write_tree_to(&tree, Path::new("dist/vendor"), true)?;
/// # Ok(())
/// # }
/// ```
pub fn write_tree_to(tree: &ComposedTree, dir: &Path, overwrite: bool) -> Result<()> {
    let dir = validate_and_normalize_dir(dir)?;

    let mut operations = Vec::with_capacity(tree.len());
    for (path, entry) in tree.iter() {
        let target_path = validate_output_path(&dir, path)?;

        if !overwrite && target_path.exists() {
            return Err(Error::OutputExists(format!(
                "File already exists: '{}'. Use overwrite=true to replace.",
                target_path.display()
            )));
        }

        operations.push((target_path, entry.contents.as_slice()));
    }

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    write_files_atomic(&operations)?;
    debug!(dir = %dir.display(), files = operations.len(), "wrote vendor tree");

    Ok(())
}

fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    let absolute = if cleaned.is_absolute() {
        cleaned
    } else {
        std::env::current_dir()
            .map_err(|e| {
                Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
            })?
            .join(&cleaned)
            .clean()
    };

    Ok(absolute)
}

/// Joins `filename` onto `base_dir`, rejecting anything that would land
/// outside of it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    if Path::new(filename).is_absolute() {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' is absolute",
            filename
        )));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if full_path == base_dir || !full_path.starts_with(base_dir) {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Two-phase write: everything to `.tmp` files, then rename into place.
fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(target_path);
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        fs::rename(temp_path, target_path).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

/// Best-effort; we are already failing.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}
