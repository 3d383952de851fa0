//! `chai-vendor check`.
//!
//! Loads the project manifest and resolves plugins exactly as a build
//! would, without materializing or writing anything.

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::config::ConfigOverrides;
use crate::error::Result;
use crate::ui;
use chai_vendor::{CATALOG, DependencyManifest, Resolution};
use serde::Serialize;
use std::path::Path;

/// A catalog package declared by the project.
#[derive(Debug, Serialize)]
pub struct DeclaredPlugin<'a> {
    pub name: &'a str,
    pub declared: &'a str,
    pub installed: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    project: &'a Path,
    declared: Vec<DeclaredPlugin<'a>>,
    #[serde(flatten)]
    resolution: &'a Resolution,
}

/// Catalog packages present in `manifest`, in catalog order, once each.
pub fn declared_plugins(manifest: &DependencyManifest) -> Vec<DeclaredPlugin<'_>> {
    let mut declared: Vec<DeclaredPlugin<'_>> = Vec::new();
    for descriptor in CATALOG {
        if declared.iter().any(|d| d.name == descriptor.name) {
            continue;
        }
        if let Some(dep) = manifest.get(descriptor.name) {
            declared.push(DeclaredPlugin {
                name: descriptor.name,
                declared: &dep.declared,
                installed: dep.installed.as_deref(),
            });
        }
    }
    declared
}

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let overrides = ConfigOverrides::from(&args);
    let (config, root) = utils::load_project(&args.project, &overrides)?;

    let build = config.vendor_build(&root);
    let manifest = build.load_manifest()?;
    let resolution = build.resolution(&manifest);
    let declared = declared_plugins(&manifest);

    if args.json {
        let report = CheckReport {
            project: &root,
            declared,
            resolution: &resolution,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    ui::info(&format!("Project: {}", root.display()));

    if declared.is_empty() {
        ui::info("No chai plugins declared");
    }
    for plugin in &declared {
        match plugin.installed {
            Some(version) => ui::info(&format!(
                "{} {} (installed {})",
                plugin.name, plugin.declared, version
            )),
            None => ui::warning(&format!(
                "{} {} is declared but not installed",
                plugin.name, plugin.declared
            )),
        }
    }

    for rule in &resolution.dropped {
        ui::warning(&format!("{} dropped: {}", rule.drop, rule.reason));
    }

    for plugin in &resolution.resolved {
        ui::success(&format!("{} ({})", plugin.name, plugin.constraint));
    }

    ui::print_imports(&resolution.imports);
    Ok(())
}
