//! Turning plugins into vendor tree fragments.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::bundle::{BundleRequest, ScriptBundler};
use crate::catalog::{Materialization, PluginDescriptor};
use crate::locate::PackageLocator;
use crate::{Error, Result};

/// Path of the core library inside the vendor tree.
pub const CORE_ASSET: &str = "chai/chai.js";
/// Path of the module shim inside the vendor tree.
pub const SHIM_ASSET: &str = "shims/chai.js";

const SHIM_SOURCE: &str = include_str!("../assets/shims/chai.js");

/// Files contributed by one source, keyed by vendor-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub owner: String,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Fragment {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Produces fragments for plugins and for the core library.
pub struct AssetMaterializer<'a> {
    project_root: &'a Path,
    locator: &'a dyn PackageLocator,
    bundler: &'a dyn ScriptBundler,
}

impl<'a> AssetMaterializer<'a> {
    pub fn new(
        project_root: &'a Path,
        locator: &'a dyn PackageLocator,
        bundler: &'a dyn ScriptBundler,
    ) -> Self {
        Self {
            project_root,
            locator,
            bundler,
        }
    }

    /// Builds the fragment for one plugin: its main asset, plus its support
    /// asset when it declares one.
    pub async fn materialize(&self, plugin: &PluginDescriptor) -> Result<Fragment> {
        let mut fragment = Fragment::new(plugin.name);
        let destination = plugin.main_asset();

        let contents = match &plugin.mode {
            Materialization::Copy => {
                let root = self.package_root(plugin.name, plugin.name)?;
                read_asset(&root.join(plugin.asset_path))?
            }
            Materialization::Bundle(spec) => {
                let request = BundleRequest {
                    plugin: plugin.name,
                    entry: spec.entry,
                    entry_source: spec.entry_source,
                    project_root: self.project_root,
                    format: spec.format,
                    transforms: spec.transforms,
                };
                self.bundler.bundle(&request).await?.into_bytes()
            }
        };

        debug!(
            plugin = plugin.name,
            destination = %destination,
            bytes = contents.len(),
            bundled = plugin.is_bundled(),
            "materialized plugin asset"
        );
        fragment.insert(destination, contents);

        if let (Some(support), Some(path)) = (plugin.support_asset, plugin.support_asset_path()) {
            fragment.insert(path, support.source.as_bytes());
        }

        Ok(fragment)
    }

    /// The core library copied from the installed `package`.
    pub fn core_fragment(&self, package: &str) -> Result<Fragment> {
        let root = self.package_root("core", package)?;
        let contents = read_asset(&root.join("chai.js"))?;
        Ok(Fragment::new(package).with_file(CORE_ASSET, contents))
    }

    fn package_root(&self, owner: &str, package: &str) -> Result<std::path::PathBuf> {
        self.locator
            .locate(package, self.project_root)
            .map_err(|e| Error::PackageNotFound {
                plugin: owner.to_string(),
                package: package.to_string(),
                reason: e.reason,
            })
    }
}

/// The embedded module shim.
pub fn shim_fragment() -> Fragment {
    Fragment::new("shim").with_file(SHIM_ASSET, SHIM_SOURCE)
}

fn read_asset(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CHAI_AS_PROMISED, SINON_CHAI, TESTDOUBLE_CHAI};
    use crate::locate::NodeModulesLocator;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingBundler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptBundler for RecordingBundler {
        async fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
            self.seen.lock().unwrap().push(request.entry.to_string());
            Ok(format!("/* bundled {} */", request.plugin))
        }
    }

    fn install(root: &Path, name: &str, file: &str, contents: &str) {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(dir.join(file).parent().unwrap()).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{ "name": "{name}", "version": "1.0.0" }}"#),
        )
        .unwrap();
        fs::write(dir.join(file), contents).unwrap();
    }

    #[tokio::test]
    async fn test_copy_mode_reads_installed_asset() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "sinon-chai", "lib/sinon-chai.js", "/* sinon-chai */");
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let fragment = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .materialize(&SINON_CHAI)
            .await
            .unwrap();

        assert_eq!(fragment.owner, "sinon-chai");
        assert_eq!(
            fragment.files.get("sinon-chai/sinon-chai.js").map(Vec::as_slice),
            Some(b"/* sinon-chai */".as_slice())
        );
        assert!(bundler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_support_asset_is_added() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "testdouble-chai", "lib/testdouble-chai.js", "td");
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let fragment = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .materialize(&TESTDOUBLE_CHAI)
            .await
            .unwrap();

        let paths: Vec<_> = fragment.files.keys().cloned().collect();
        assert_eq!(
            paths,
            vec![
                "chai-plugin-support/testdouble-chai.js".to_string(),
                "testdouble-chai/testdouble-chai.js".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_bundle_mode_uses_bundler() {
        let temp = TempDir::new().unwrap();
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let fragment = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .materialize(&CHAI_AS_PROMISED)
            .await
            .unwrap();

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment
                .files
                .get("chai-as-promised/chai-as-promised.js")
                .map(|b| String::from_utf8_lossy(b).into_owned()),
            Some("/* bundled chai-as-promised */".to_string())
        );
        assert_eq!(*bundler.seen.lock().unwrap(), vec!["chai-as-promised.js"]);
    }

    #[tokio::test]
    async fn test_missing_package_is_torn_state() {
        let temp = TempDir::new().unwrap();
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let err = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .materialize(&SINON_CHAI)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::PackageNotFound { ref plugin, ref package, .. }
                if plugin == "sinon-chai" && package == "sinon-chai"
        ));
    }

    #[tokio::test]
    async fn test_missing_asset_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "sinon-chai", "index.js", "");
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let err = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .materialize(&SINON_CHAI)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::IoError { ref path, .. } if path.ends_with("lib/sinon-chai.js")));
    }

    #[test]
    fn test_core_and_shim_fragments() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "chai", "chai.js", "/* chai */");
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let core = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .core_fragment("chai")
            .unwrap();
        assert_eq!(core.owner, "chai");
        assert!(core.files.contains_key(CORE_ASSET));

        let shim = shim_fragment();
        let source = String::from_utf8(shim.files[SHIM_ASSET].clone()).unwrap();
        assert!(source.contains("define"));
        assert!(source.contains("expect"));
    }

    #[test]
    fn test_missing_core_package() {
        let temp = TempDir::new().unwrap();
        let locator = NodeModulesLocator::new();
        let bundler = RecordingBundler::default();

        let err = AssetMaterializer::new(temp.path(), &locator, &bundler)
            .core_fragment("chai")
            .unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { ref plugin, .. } if plugin == "core"));
    }
}
