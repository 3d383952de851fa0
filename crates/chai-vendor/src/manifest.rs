//! The consuming project's declared dependencies and their installed versions.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locate::PackageLocator;
use crate::{Error, Result};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// The fields of `package.json` this crate reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,
}

impl PackageJson {
    /// Reads and parses a `package.json` file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
        if metadata.len() > MAX_PACKAGE_JSON_SIZE {
            return Err(invalid(format!(
                "exceeds maximum size of {}MB",
                MAX_PACKAGE_JSON_SIZE / 1024 / 1024
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| invalid(format!("invalid JSON: {e}")))
    }
}

/// Which `package.json` section declared a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Production,
    Development,
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredDependency {
    /// The range as written in `package.json`.
    pub declared: String,
    pub kind: DependencyKind,
    /// Version found on disk, if it could be determined.
    pub installed: Option<String>,
}

/// Declared dependencies of the consuming project, keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    dependencies: BTreeMap<String, DeclaredDependency>,
}

impl DependencyManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly for tests and programmatic hosts.
    pub fn with(
        mut self,
        name: impl Into<String>,
        kind: DependencyKind,
        installed: Option<&str>,
    ) -> Self {
        let installed = installed.map(str::to_string);
        self.insert(
            name,
            DeclaredDependency {
                declared: installed.clone().unwrap_or_else(|| "*".to_string()),
                kind,
                installed,
            },
        );
        self
    }

    /// Shorthand for a production dependency with a known installed version.
    pub fn with_installed(self, name: impl Into<String>, version: &str) -> Self {
        self.with(name, DependencyKind::Production, Some(version))
    }

    pub fn insert(&mut self, name: impl Into<String>, dependency: DeclaredDependency) {
        self.dependencies.insert(name.into(), dependency);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DeclaredDependency> {
        self.dependencies.get(name)
    }

    /// Installed version of a declared package. `None` when the package is
    /// not declared or its version is unknown.
    pub fn installed_version(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .and_then(|dep| dep.installed.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeclaredDependency)> {
        self.dependencies
            .iter()
            .map(|(name, dep)| (name.as_str(), dep))
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Reads `<project_root>/package.json` and resolves every declared
    /// dependency to the version installed on disk.
    ///
    /// A dependency that is declared in both sections is recorded once, as a
    /// production dependency. Packages that cannot be located, or whose
    /// `package.json` has no readable version, keep `installed: None`.
    pub fn load(project_root: &Path, locator: &dyn PackageLocator) -> Result<Self> {
        let pkg = PackageJson::from_path(&project_root.join("package.json"))?;
        let mut manifest = Self::new();

        let declared = pkg
            .dev_dependencies
            .iter()
            .map(|(name, range)| (name, range, DependencyKind::Development))
            .chain(
                pkg.dependencies
                    .iter()
                    .map(|(name, range)| (name, range, DependencyKind::Production)),
            );

        for (name, range, kind) in declared {
            let installed = installed_version(name, project_root, locator);
            debug!(
                package = %name,
                declared = %range,
                installed = installed.as_deref().unwrap_or("<unknown>"),
                "declared dependency"
            );
            manifest.insert(
                name.clone(),
                DeclaredDependency {
                    declared: range.clone(),
                    kind,
                    installed,
                },
            );
        }

        Ok(manifest)
    }
}

fn installed_version(
    name: &str,
    project_root: &Path,
    locator: &dyn PackageLocator,
) -> Option<String> {
    let root: PathBuf = match locator.locate(name, project_root) {
        Ok(root) => root,
        Err(err) => {
            debug!(package = %name, error = %err, "declared package is not installed");
            return None;
        }
    };

    match PackageJson::from_path(&root.join("package.json")) {
        Ok(pkg) => pkg.version,
        Err(err) => {
            debug!(package = %name, error = %err, "installed package.json is unreadable");
            None
        }
    }
}
