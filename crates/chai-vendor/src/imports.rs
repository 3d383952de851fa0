//! Test-only import declarations for the host build.

use std::fmt;

use serde::Serialize;

use crate::materialize::{CORE_ASSET, SHIM_ASSET};
use crate::select::ResolvedPlugins;

/// Build phase an import is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Test,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPhase::Test => f.write_str("test"),
        }
    }
}

/// A vendored file the host must load, with the phase it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDeclaration {
    pub path: String,
    #[serde(rename = "type")]
    pub phase: LoadPhase,
}

impl ImportDeclaration {
    fn test(vendor_root: &str, path: &str) -> Self {
        let root = vendor_root.trim_end_matches('/');
        let path = if root.is_empty() {
            path.to_string()
        } else {
            format!("{root}/{path}")
        };
        Self {
            path,
            phase: LoadPhase::Test,
        }
    }
}

/// Core library, shim, then each plugin's main asset followed by its support
/// asset.
pub fn register_imports(vendor_root: &str, plugins: &ResolvedPlugins<'_>) -> Vec<ImportDeclaration> {
    let mut imports = vec![
        ImportDeclaration::test(vendor_root, CORE_ASSET),
        ImportDeclaration::test(vendor_root, SHIM_ASSET),
    ];

    for plugin in plugins {
        imports.push(ImportDeclaration::test(vendor_root, &plugin.main_asset()));
        if let Some(support) = plugin.support_asset_path() {
            imports.push(ImportDeclaration::test(vendor_root, &support));
        }
    }

    imports
}
