//! Configuration for the chai-vendor CLI.
//!
//! Settings are merged from several sources, later ones winning:
//! built-in defaults, `chai-vendor.json`, `CHAI_VENDOR_*` environment
//! variables, then command-line flags.

mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chai_vendor::{DEFAULT_CORE_PACKAGE, DEFAULT_VENDOR_ROOT, VendorBuild};

pub use loading::{CONFIG_FILE, ConfigOverrides, ENV_PREFIX};
pub use validation::validate_vendor_root;

/// chai-vendor configuration, as read from `chai-vendor.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VendorConfig {
    /// Project directory, relative to where chai-vendor was started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Output directory, relative to the project.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Vendor tree location inside the output directory.
    #[serde(default = "default_vendor_root")]
    pub vendor_root: String,

    /// Package providing `chai.js`.
    #[serde(default = "default_core_package")]
    pub core_package: String,

    /// Import list file name, relative to the output directory.
    #[serde(default = "default_imports_file")]
    pub imports_file: PathBuf,

    /// Remove the vendor root before writing.
    #[serde(default)]
    pub clean: bool,

    /// Replace files that already exist.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_vendor_root() -> String {
    DEFAULT_VENDOR_ROOT.to_string()
}

pub fn default_core_package() -> String {
    DEFAULT_CORE_PACKAGE.to_string()
}

pub fn default_imports_file() -> PathBuf {
    PathBuf::from("imports.json")
}

pub fn default_overwrite() -> bool {
    true
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            cwd: None,
            out_dir: default_out_dir(),
            vendor_root: default_vendor_root(),
            core_package: default_core_package(),
            imports_file: default_imports_file(),
            clean: false,
            overwrite: default_overwrite(),
        }
    }
}

impl VendorConfig {
    /// The project directory, with `cwd` resolved against `base_dir`.
    pub fn project_root(&self, base_dir: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) => resolve_path(cwd, base_dir),
            None => base_dir.to_path_buf(),
        }
    }

    pub fn out_dir(&self, project_root: &Path) -> PathBuf {
        resolve_path(&self.out_dir, project_root)
    }

    /// Directory the vendor tree is written into.
    pub fn vendor_dir(&self, project_root: &Path) -> PathBuf {
        self.out_dir(project_root).join(&self.vendor_root)
    }

    pub fn imports_path(&self, project_root: &Path) -> PathBuf {
        resolve_path(&self.imports_file, &self.out_dir(project_root))
    }

    /// A pipeline for `project_root` using this configuration.
    pub fn vendor_build(&self, project_root: &Path) -> VendorBuild {
        VendorBuild::new(project_root)
            .vendor_root(self.vendor_root.clone())
            .core_package(self.core_package.clone())
    }
}

/// `path` itself when absolute, otherwise `path` joined onto `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
