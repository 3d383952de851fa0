//! Shared fixtures for chai-vendor integration tests.
//!
//! A [`FixtureProject`] is a throwaway directory with a `package.json` and a
//! hand-built `node_modules`, enough for the locator and materializer to run
//! against real files.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chai_vendor::{BundleRequest, ComposedTree, Result, ScriptBundler};
use tempfile::TempDir;

pub const CHAI_SOURCE: &str = "/* chai 4.3.0 */ window.chai = {};";

pub struct FixtureProject {
    dir: TempDir,
    dependencies: BTreeMap<String, String>,
    dev_dependencies: BTreeMap<String, String>,
}

impl FixtureProject {
    /// A project with the core library installed and nothing else.
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("create temp dir"),
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
        };
        project.install_files("chai", "4.3.0", &[("chai.js", CHAI_SOURCE)]);
        project.write_manifest();
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Declares `name` as a dev dependency and installs it with one file at
    /// `asset`, whose content names the package and version.
    pub fn dev_plugin(mut self, name: &str, version: &str, asset: &str) -> Self {
        let body = plugin_source(name, version);
        self.install_files(name, version, &[(asset, body.as_str())]);
        self.dev_dependencies
            .insert(name.to_string(), format!("^{version}"));
        self.write_manifest();
        self
    }

    /// Declares a dependency without installing it.
    pub fn declare_only(mut self, name: &str, range: &str) -> Self {
        self.dev_dependencies
            .insert(name.to_string(), range.to_string());
        self.write_manifest();
        self
    }

    /// Installs a package under `node_modules` with the given files.
    pub fn install_files(&self, name: &str, version: &str, files: &[(&str, &str)]) {
        let dir = self.dir.path().join("node_modules").join(name);
        fs::create_dir_all(&dir).expect("create package dir");
        fs::write(
            dir.join("package.json"),
            format!(r#"{{ "name": "{name}", "version": "{version}", "main": "index.js" }}"#),
        )
        .expect("write package.json");

        for (path, contents) in files {
            let target = dir.join(path);
            fs::create_dir_all(target.parent().expect("file has parent")).expect("create dirs");
            fs::write(target, contents).expect("write package file");
        }
    }

    pub fn remove_package(&self, name: &str) {
        fs::remove_dir_all(self.dir.path().join("node_modules").join(name))
            .expect("remove package");
    }

    fn write_manifest(&self) {
        let manifest = serde_json::json!({
            "name": "fixture-app",
            "version": "0.0.0",
            "dependencies": self.dependencies,
            "devDependencies": self.dev_dependencies,
        });
        fs::write(
            self.dir.path().join("package.json"),
            serde_json::to_string_pretty(&manifest).expect("serialize manifest"),
        )
        .expect("write package.json");
    }
}

pub fn plugin_source(name: &str, version: &str) -> String {
    format!("/* {name}@{version} */")
}

/// Bundler that records requests and returns a marker script. Clones share
/// the request log.
#[derive(Debug, Clone, Default)]
pub struct StubBundler {
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StubBundler {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock requests").clone()
    }
}

#[async_trait]
impl ScriptBundler for StubBundler {
    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.plugin.to_string());
        Ok(format!("/* bundled {} */", request.entry))
    }
}

pub fn tree_paths(tree: &ComposedTree) -> Vec<String> {
    tree.paths().map(str::to_string).collect()
}

pub fn tree_file(tree: &ComposedTree, path: &str) -> String {
    let entry = tree.get(path).unwrap_or_else(|| panic!("missing {path}"));
    String::from_utf8(entry.contents.clone()).expect("utf-8 contents")
}
