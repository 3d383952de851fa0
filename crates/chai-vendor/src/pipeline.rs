//! Wiring selection, materialization and composition into one build.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::bundle::{RolldownBundler, ScriptBundler};
use crate::catalog::{CATALOG, PluginDescriptor};
use crate::compose::{ComposedTree, compose};
use crate::conflict::{self, ConflictRule, DEFAULT_RULES};
use crate::constraint::{ConstraintEvaluator, SemverEvaluator};
use crate::imports::{ImportDeclaration, register_imports};
use crate::locate::{NodeModulesLocator, PackageLocator};
use crate::manifest::DependencyManifest;
use crate::materialize::{AssetMaterializer, shim_fragment};
use crate::select::{ResolvedPlugins, select_with};
use crate::Result;

/// Default vendor root, relative to the output directory.
pub const DEFAULT_VENDOR_ROOT: &str = "vendor";
/// Default package providing `chai.js`.
pub const DEFAULT_CORE_PACKAGE: &str = "chai";

/// Result of a complete vendoring run.
#[derive(Debug, Clone)]
pub struct VendorOutput {
    /// Active plugins after conflict resolution.
    pub plugins: ResolvedPlugins<'static>,
    pub tree: ComposedTree,
    pub imports: Vec<ImportDeclaration>,
}

/// How a manifest maps onto the catalog, without building anything.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Plugins whose constraint matched, before conflicts were applied.
    pub selected: ResolvedPlugins<'static>,
    pub resolved: ResolvedPlugins<'static>,
    /// Conflict rules that removed a plugin.
    pub dropped: Vec<&'static ConflictRule>,
    pub imports: Vec<ImportDeclaration>,
}

/// Configures and runs vendoring for one project.
///
/// # Example
///
/// ```no_run
/// use chai_vendor::VendorBuild;
///
/// # #[tokio::main]
/// # async fn main() -> chai_vendor::Result<()> {
/// let output = VendorBuild::new("./app")
///     .vendor_root("assets/vendor")
///     .run_for_project()
///     .await?;
/// println!("{} files", output.tree.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VendorBuild {
    project_root: PathBuf,
    vendor_root: String,
    core_package: String,
    catalog: &'static [PluginDescriptor],
    conflict_rules: &'static [ConflictRule],
    locator: Arc<dyn PackageLocator>,
    bundler: Arc<dyn ScriptBundler>,
    evaluator: Arc<dyn ConstraintEvaluator>,
}

impl VendorBuild {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            vendor_root: DEFAULT_VENDOR_ROOT.to_string(),
            core_package: DEFAULT_CORE_PACKAGE.to_string(),
            catalog: CATALOG,
            conflict_rules: DEFAULT_RULES,
            locator: Arc::new(NodeModulesLocator::new()),
            bundler: Arc::new(RolldownBundler),
            evaluator: Arc::new(SemverEvaluator),
        }
    }

    pub fn vendor_root(mut self, root: impl Into<String>) -> Self {
        self.vendor_root = root.into();
        self
    }

    pub fn core_package(mut self, package: impl Into<String>) -> Self {
        self.core_package = package.into();
        self
    }

    pub fn catalog(mut self, catalog: &'static [PluginDescriptor]) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn conflict_rules(mut self, rules: &'static [ConflictRule]) -> Self {
        self.conflict_rules = rules;
        self
    }

    pub fn locator(mut self, locator: impl PackageLocator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    pub fn bundler(mut self, bundler: impl ScriptBundler + 'static) -> Self {
        self.bundler = Arc::new(bundler);
        self
    }

    pub fn evaluator(mut self, evaluator: impl ConstraintEvaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn vendor_root_path(&self) -> &str {
        &self.vendor_root
    }

    /// Reads the project's `package.json` through the configured locator.
    pub fn load_manifest(&self) -> Result<DependencyManifest> {
        DependencyManifest::load(&self.project_root, self.locator.as_ref())
    }

    /// Active plugins for `manifest`: selection followed by conflict removal.
    pub fn resolve(&self, manifest: &DependencyManifest) -> ResolvedPlugins<'static> {
        let selected = select_with(self.catalog, manifest, self.evaluator.as_ref());
        conflict::resolve_with(&selected, self.conflict_rules)
    }

    /// Like [`resolve`](Self::resolve), keeping the intermediate steps.
    pub fn resolution(&self, manifest: &DependencyManifest) -> Resolution {
        let selected = select_with(self.catalog, manifest, self.evaluator.as_ref());
        let resolved = conflict::resolve_with(&selected, self.conflict_rules);
        let dropped = conflict::applied_rules(&selected, self.conflict_rules);
        let imports = self.imports(&resolved);

        Resolution {
            selected,
            resolved,
            dropped,
            imports,
        }
    }

    pub fn imports(&self, resolved: &ResolvedPlugins<'_>) -> Vec<ImportDeclaration> {
        register_imports(&self.vendor_root, resolved)
    }

    /// Builds the vendor tree and import list for `manifest`.
    ///
    /// Plugin fragments are materialized concurrently but composed in
    /// resolved order, so the result does not depend on completion order.
    pub async fn run(&self, manifest: &DependencyManifest) -> Result<VendorOutput> {
        let plugins = self.resolve(manifest);
        info!(
            plugins = ?plugins.names().collect::<Vec<_>>(),
            "resolved chai plugins"
        );

        let materializer = AssetMaterializer::new(
            &self.project_root,
            self.locator.as_ref(),
            self.bundler.as_ref(),
        );

        let core = materializer.core_fragment(&self.core_package)?;
        let plugin_fragments = join_all(plugins.iter().map(|p| materializer.materialize(p)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        debug!(count = plugin_fragments.len(), "materialized plugin fragments");

        let tree = compose(
            [core, shim_fragment()]
                .into_iter()
                .chain(plugin_fragments),
        )?;
        let imports = self.imports(&plugins);

        Ok(VendorOutput {
            plugins,
            tree,
            imports,
        })
    }

    /// Loads the project's manifest, then [`run`](Self::run)s.
    pub async fn run_for_project(&self) -> Result<VendorOutput> {
        let manifest = self.load_manifest()?;
        self.run(&manifest).await
    }
}

impl fmt::Debug for VendorBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorBuild")
            .field("project_root", &self.project_root)
            .field("vendor_root", &self.vendor_root)
            .field("core_package", &self.core_package)
            .field("catalog", &self.catalog.len())
            .field("conflict_rules", &self.conflict_rules.len())
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}
