use crate::config::VendorConfig;
use crate::error::{ConfigError, Result};
use std::path::{Component, Path};

/// A vendor root must be a non-empty relative path that stays inside the
/// output directory.
pub fn validate_vendor_root(root: &str) -> Result<()> {
    let invalid = |hint: &str| -> Result<()> {
        Err(ConfigError::InvalidValue {
            field: "vendorRoot".to_string(),
            value: format!("{:?}", root),
            hint: hint.to_string(),
        }
        .into())
    };

    if root.trim().is_empty() {
        return invalid("Vendor root cannot be empty");
    }

    let path = Path::new(root);
    if path.is_absolute() || root.starts_with('/') || root.starts_with('\\') {
        return invalid("Use a path relative to outDir");
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return invalid("Vendor root must stay inside outDir (no '..')");
    }

    Ok(())
}

impl VendorConfig {
    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        validate_vendor_root(&self.vendor_root)?;

        if self.core_package.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "corePackage".to_string(),
                value: "\"\"".to_string(),
                hint: "Name the package that ships chai.js".to_string(),
            }
            .into());
        }

        if self.imports_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "importsFile".to_string(),
                value: "\"\"".to_string(),
                hint: "Name the file that receives the import list".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
