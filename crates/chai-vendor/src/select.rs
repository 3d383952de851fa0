//! Choosing the active plugins for a project.

use serde::Serialize;
use tracing::debug;

use crate::catalog::PluginDescriptor;
use crate::constraint::{ConstraintEvaluator, SemverEvaluator};
use crate::manifest::DependencyManifest;

/// Ordered set of active plugins, in catalog order, at most one per name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedPlugins<'a>(Vec<&'a PluginDescriptor>);

impl<'a> ResolvedPlugins<'a> {
    pub fn new(plugins: Vec<&'a PluginDescriptor>) -> Self {
        Self(plugins)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.iter().map(|p| p.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PluginDescriptor> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only the plugins for which `keep` returns true, in order.
    pub fn filter(&self, mut keep: impl FnMut(&PluginDescriptor) -> bool) -> Self {
        Self(self.0.iter().copied().filter(|p| keep(p)).collect())
    }
}

impl<'r, 'a> IntoIterator for &'r ResolvedPlugins<'a> {
    type Item = &'a PluginDescriptor;
    type IntoIter = std::iter::Copied<std::slice::Iter<'r, &'a PluginDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Selects plugins using the default semver evaluator.
pub fn select<'a>(
    catalog: &'a [PluginDescriptor],
    manifest: &DependencyManifest,
) -> ResolvedPlugins<'a> {
    select_with(catalog, manifest, &SemverEvaluator)
}

/// In catalog order, keeps each descriptor whose package is declared and whose
/// installed version satisfies its constraint.
///
/// A declared package with no known installed version is skipped.
pub fn select_with<'a>(
    catalog: &'a [PluginDescriptor],
    manifest: &DependencyManifest,
    evaluator: &dyn ConstraintEvaluator,
) -> ResolvedPlugins<'a> {
    let mut selected: Vec<&'a PluginDescriptor> = Vec::new();

    for plugin in catalog {
        if !manifest.contains(plugin.name) {
            continue;
        }

        let Some(installed) = manifest.installed_version(plugin.name) else {
            debug!(plugin = plugin.name, "declared but installed version is unknown");
            continue;
        };

        if !evaluator.satisfies(plugin.name, installed, plugin.constraint) {
            debug!(
                plugin = plugin.name,
                installed,
                constraint = plugin.constraint,
                "installed version outside range"
            );
            continue;
        }

        if selected.iter().any(|p| p.name == plugin.name) {
            debug!(
                plugin = plugin.name,
                constraint = plugin.constraint,
                "another version band of this plugin is already selected"
            );
            continue;
        }

        debug!(plugin = plugin.name, installed, "selected");
        selected.push(plugin);
    }

    ResolvedPlugins(selected)
}
