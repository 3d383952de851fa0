//! Locating installed packages on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver};
use thiserror::Error;

/// A package could not be found from the given directory.
#[derive(Debug, Clone, Error)]
#[error("cannot locate package '{package}' from {}: {reason}", .searched_from.display())]
pub struct LocateError {
    pub package: String,
    pub searched_from: PathBuf,
    pub reason: String,
}

/// Finds the installed root directory of an npm package.
pub trait PackageLocator: Send + Sync + fmt::Debug {
    /// Returns the directory holding `package`'s `package.json`, searching
    /// the usual `node_modules` hierarchy upward from `base_dir`.
    fn locate(&self, package: &str, base_dir: &Path) -> Result<PathBuf, LocateError>;
}

/// [`PackageLocator`] backed by `oxc_resolver`.
///
/// The `exports` field is not enforced so that `<package>/package.json` is
/// always reachable, even for packages that only export their entry points.
pub struct NodeModulesLocator {
    resolver: Resolver,
}

impl NodeModulesLocator {
    pub fn new() -> Self {
        let resolver = Resolver::new(ResolveOptions {
            exports_fields: vec![],
            condition_names: vec!["browser".into(), "import".into(), "default".into()],
            extensions: vec![".js".into(), ".json".into()],
            ..Default::default()
        });

        Self { resolver }
    }
}

impl Default for NodeModulesLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeModulesLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeModulesLocator").finish_non_exhaustive()
    }
}

impl PackageLocator for NodeModulesLocator {
    fn locate(&self, package: &str, base_dir: &Path) -> Result<PathBuf, LocateError> {
        let not_found = |reason: String| LocateError {
            package: package.to_string(),
            searched_from: base_dir.to_path_buf(),
            reason,
        };

        if package.is_empty() || package.starts_with('.') || package.starts_with('/') {
            return Err(not_found("not a bare package name".to_string()));
        }

        let resolution = self
            .resolver
            .resolve(base_dir, &format!("{package}/package.json"))
            .map_err(|e| not_found(format!("{:?}", e)))?;

        resolution
            .path()
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| not_found("resolved package.json has no parent".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install(root: &Path, name: &str) -> PathBuf {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{ "name": "{name}", "version": "1.0.0" }}"#),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_locates_installed_package() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "chai-dom");

        let root = NodeModulesLocator::new()
            .locate("chai-dom", temp.path())
            .unwrap();
        assert!(root.ends_with("node_modules/chai-dom"));
        assert!(root.join("package.json").exists());
    }

    #[test]
    fn test_locates_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "sinon-chai");
        let nested = temp.path().join("tests").join("unit");
        fs::create_dir_all(&nested).unwrap();

        let root = NodeModulesLocator::new()
            .locate("sinon-chai", &nested)
            .unwrap();
        assert!(root.ends_with("node_modules/sinon-chai"));
    }

    #[test]
    fn test_ignores_exports_restrictions() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("node_modules").join("chai");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            r#"{ "name": "chai", "version": "4.3.0", "exports": { ".": "./index.js" } }"#,
        )
        .unwrap();
        fs::write(dir.join("index.js"), "module.exports = {};").unwrap();

        let root = NodeModulesLocator::new().locate("chai", temp.path()).unwrap();
        assert!(root.ends_with("node_modules/chai"));
    }

    #[test]
    fn test_missing_package_reports_name() {
        let temp = TempDir::new().unwrap();
        let err = NodeModulesLocator::new()
            .locate("chai-jquery", temp.path())
            .unwrap_err();
        assert_eq!(err.package, "chai-jquery");
        assert!(err.to_string().contains("chai-jquery"));
    }

    #[test]
    fn test_rejects_relative_specifiers() {
        let temp = TempDir::new().unwrap();
        assert!(NodeModulesLocator::new().locate("./local", temp.path()).is_err());
        assert!(NodeModulesLocator::new().locate("", temp.path()).is_err());
    }
}
