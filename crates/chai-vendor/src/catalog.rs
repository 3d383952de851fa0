//! The closed catalog of chai plugins this crate knows how to vendor.
//!
//! Every entry is plain data. How a plugin is materialized is decided by its
//! [`Materialization`] variant, never by per-plugin code paths.

use serde::Serialize;

/// Vendor subdirectory holding plugin support files.
pub const SUPPORT_DIR: &str = "chai-plugin-support";

/// How a plugin's asset ends up in the vendor tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Materialization {
    /// Copy `asset_path` out of the installed package as-is.
    Copy,
    /// Build a standalone script from an entry shipped with this crate.
    Bundle(BundleSpec),
}

/// Output format of a bundled plugin script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    Iife,
    Esm,
    Cjs,
}

/// One step of the bundle-mode source pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum TransformStep {
    /// Resolve bare imports through the project's `node_modules`.
    NodeResolve,
    /// Accept CommonJS modules in the dependency graph.
    CommonJs,
    /// Lower the emitted syntax to the given ECMAScript target.
    DownLevel { target: &'static str },
}

/// Bundle-mode build instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BundleSpec {
    /// File name of the entry module.
    pub entry: &'static str,
    /// Entry module source.
    #[serde(skip)]
    pub entry_source: &'static str,
    /// Destination of the bundled script inside the vendor tree.
    pub output: &'static str,
    pub format: BundleFormat,
    pub transforms: &'static [TransformStep],
}

/// Helper script imported right after a plugin's main asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportAsset {
    /// File name inside [`SUPPORT_DIR`].
    pub path: &'static str,
    #[serde(skip)]
    pub source: &'static str,
}

/// A single optional chai plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    /// npm package name.
    pub name: &'static str,
    /// npm range the installed version must satisfy.
    pub constraint: &'static str,
    /// Path of the file to expose, relative to the installed package root.
    pub asset_path: &'static str,
    pub mode: Materialization,
    pub support_asset: Option<SupportAsset>,
}

impl PluginDescriptor {
    /// Vendor subdirectory owned by this plugin family.
    pub fn vendor_dir(&self) -> &'static str {
        self.name
    }

    /// Destination of the plugin's main asset inside the vendor tree.
    pub fn main_asset(&self) -> String {
        match &self.mode {
            Materialization::Bundle(spec) => spec.output.to_string(),
            Materialization::Copy => {
                format!("{}/{}", self.vendor_dir(), basename(self.asset_path))
            }
        }
    }

    /// Destination of the support asset, if the plugin declares one.
    pub fn support_asset_path(&self) -> Option<String> {
        self.support_asset
            .map(|support| format!("{}/{}", SUPPORT_DIR, support.path))
    }

    pub fn is_bundled(&self) -> bool {
        matches!(self.mode, Materialization::Bundle(_))
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

const AS_PROMISED_TRANSFORMS: &[TransformStep] = &[
    TransformStep::NodeResolve,
    TransformStep::CommonJs,
    TransformStep::DownLevel { target: "es2015" },
];

/// jQuery-flavoured DOM assertions. Supersedes `chai-dom`.
pub const CHAI_JQUERY: PluginDescriptor = PluginDescriptor {
    name: "chai-jquery",
    constraint: "^2.0.0",
    asset_path: "chai-jquery.js",
    mode: Materialization::Copy,
    support_asset: None,
};

pub const CHAI_DOM: PluginDescriptor = PluginDescriptor {
    name: "chai-dom",
    constraint: "^1.0.0",
    asset_path: "chai-dom.js",
    mode: Materialization::Copy,
    support_asset: None,
};

/// chai-as-promised before 6.0 ships a browser-ready file.
pub const CHAI_AS_PROMISED_LEGACY: PluginDescriptor = PluginDescriptor {
    name: "chai-as-promised",
    constraint: "<6",
    asset_path: "lib/chai-as-promised.js",
    mode: Materialization::Copy,
    support_asset: None,
};

/// chai-as-promised 6 and 7 are CommonJS only and need bundling.
pub const CHAI_AS_PROMISED: PluginDescriptor = PluginDescriptor {
    name: "chai-as-promised",
    constraint: "^6 || ^7",
    asset_path: "chai-as-promised.js",
    mode: Materialization::Bundle(BundleSpec {
        entry: "chai-as-promised.js",
        entry_source: include_str!("../assets/rollup/chai-as-promised.js"),
        output: "chai-as-promised/chai-as-promised.js",
        format: BundleFormat::Iife,
        transforms: AS_PROMISED_TRANSFORMS,
    }),
    support_asset: None,
};

pub const SINON_CHAI: PluginDescriptor = PluginDescriptor {
    name: "sinon-chai",
    constraint: ">=2.0.0",
    asset_path: "lib/sinon-chai.js",
    mode: Materialization::Copy,
    support_asset: None,
};

pub const TESTDOUBLE_CHAI: PluginDescriptor = PluginDescriptor {
    name: "testdouble-chai",
    constraint: "^0.5.0",
    asset_path: "lib/testdouble-chai.js",
    mode: Materialization::Copy,
    support_asset: Some(SupportAsset {
        path: "testdouble-chai.js",
        source: include_str!("../assets/chai-plugin-support/testdouble-chai.js"),
    }),
};

/// Every supported plugin, in selection and import order.
pub static CATALOG: &[PluginDescriptor] = &[
    CHAI_JQUERY,
    CHAI_DOM,
    CHAI_AS_PROMISED_LEGACY,
    CHAI_AS_PROMISED,
    SINON_CHAI,
    TESTDOUBLE_CHAI,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::satisfies;

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> = CATALOG.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "chai-jquery",
                "chai-dom",
                "chai-as-promised",
                "chai-as-promised",
                "sinon-chai",
                "testdouble-chai",
            ]
        );
    }

    #[test]
    fn test_repeated_names_have_disjoint_ranges() {
        let sample_versions = [
            "0.1.0", "1.0.0", "2.0.0", "3.4.5", "4.9.9", "5.0.0", "5.99.0", "6.0.0", "6.1.2",
            "7.0.0", "7.1.1", "8.0.0", "10.2.0",
        ];

        for (i, a) in CATALOG.iter().enumerate() {
            for b in CATALOG.iter().skip(i + 1).filter(|b| b.name == a.name) {
                for version in sample_versions {
                    assert!(
                        !(satisfies(version, a.constraint) && satisfies(version, b.constraint)),
                        "{}@{} matches both '{}' and '{}'",
                        a.name,
                        version,
                        a.constraint,
                        b.constraint
                    );
                }
            }
        }
    }

    #[test]
    fn test_main_asset_copy_mode_uses_basename() {
        assert_eq!(SINON_CHAI.main_asset(), "sinon-chai/sinon-chai.js");
        assert_eq!(CHAI_JQUERY.main_asset(), "chai-jquery/chai-jquery.js");
    }

    #[test]
    fn test_main_asset_bundle_mode_uses_output() {
        assert!(CHAI_AS_PROMISED.is_bundled());
        assert_eq!(
            CHAI_AS_PROMISED.main_asset(),
            "chai-as-promised/chai-as-promised.js"
        );
        // Both version bands land in the same family directory.
        assert_eq!(
            CHAI_AS_PROMISED_LEGACY.main_asset(),
            CHAI_AS_PROMISED.main_asset()
        );
    }

    #[test]
    fn test_support_asset_path() {
        assert_eq!(
            TESTDOUBLE_CHAI.support_asset_path().as_deref(),
            Some("chai-plugin-support/testdouble-chai.js")
        );
        assert_eq!(SINON_CHAI.support_asset_path(), None);
    }

    #[test]
    fn test_bundle_spec_steps() {
        let Materialization::Bundle(spec) = CHAI_AS_PROMISED.mode else {
            panic!("chai-as-promised 6+ must be bundled");
        };
        assert_eq!(
            spec.transforms,
            &[
                TransformStep::NodeResolve,
                TransformStep::CommonJs,
                TransformStep::DownLevel { target: "es2015" },
            ]
        );
        assert!(spec.entry_source.contains("chai-as-promised"));
    }
}
