//! Building standalone scripts for bundle-mode plugins.
//!
//! The entry module ships with this crate and is served to Rolldown as a
//! virtual file rooted inside the consuming project, so its bare imports
//! resolve against the project's own `node_modules`. The emitted chunk is then
//! optionally lowered to an older ECMAScript target with oxc.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use rolldown::{
    BundlerBuilder, BundlerOptions, InputItem, IsExternal, OutputFormat, Platform, ResolveOptions,
};
use rolldown_common::{ModuleType, Output, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext, __inner::SharedPluginable,
};
use tracing::debug;

use crate::catalog::{BundleFormat, TransformStep};
use crate::{Error, Result};

/// Directory inside the project that virtual entry modules are rooted at.
pub const VIRTUAL_ENTRY_DIR: &str = ".chai-vendor";

/// Everything a bundler needs to build one plugin script.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    /// Plugin the script is built for, used in diagnostics.
    pub plugin: &'a str,
    /// File name of the entry module.
    pub entry: &'a str,
    pub entry_source: &'a str,
    /// Directory bare imports resolve from.
    pub project_root: &'a Path,
    pub format: BundleFormat,
    pub transforms: &'a [TransformStep],
}

impl BundleRequest<'_> {
    /// Absolute id the entry module is served under.
    pub fn entry_id(&self) -> PathBuf {
        self.project_root.join(VIRTUAL_ENTRY_DIR).join(self.entry)
    }

    pub fn down_level_target(&self) -> Option<&str> {
        self.transforms.iter().find_map(|step| match step {
            TransformStep::DownLevel { target } => Some(*target),
            _ => None,
        })
    }
}

/// Produces a single self-contained script from a bundle request.
#[async_trait]
pub trait ScriptBundler: Send + Sync {
    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<String>;
}

/// [`ScriptBundler`] backed by Rolldown and oxc.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolldownBundler;

#[async_trait]
impl ScriptBundler for RolldownBundler {
    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
        let entry_id = request.entry_id();
        let entry_id = entry_id.to_string_lossy().into_owned();
        debug!(plugin = request.plugin, entry = %entry_id, "bundling plugin entry");

        let options = bundler_options(request, &entry_id);
        let entry_plugin: SharedPluginable = Arc::new(VirtualEntryPlugin {
            id: entry_id,
            source: request.entry_source.to_string(),
        });

        let mut bundler = BundlerBuilder::default()
            .with_options(options)
            .with_plugins(vec![entry_plugin])
            .build()
            .map_err(|e| Error::bundler(request.plugin, &e))?;

        let output = bundler
            .generate()
            .await
            .map_err(|e| Error::bundler(request.plugin, &e))?;

        let mut chunks = output.assets.iter().filter_map(|asset| match asset {
            Output::Chunk(chunk) => Some(chunk.code.clone()),
            Output::Asset(_) => None,
        });

        let code = match (chunks.next(), chunks.next()) {
            (Some(code), None) => code,
            (None, _) => {
                return Err(Error::Bundler {
                    plugin: request.plugin.to_string(),
                    diagnostic: "bundle produced no script".to_string(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(Error::Bundler {
                    plugin: request.plugin.to_string(),
                    diagnostic: "bundle produced more than one script".to_string(),
                });
            }
        };

        match request.down_level_target() {
            Some(target) => down_level(request.plugin, &code, target),
            None => Ok(code),
        }
    }
}

fn bundler_options(request: &BundleRequest<'_>, entry_id: &str) -> BundlerOptions {
    let resolve = if request.transforms.contains(&TransformStep::NodeResolve) {
        Some(node_resolution(request.project_root))
    } else {
        None
    };

    if request.transforms.contains(&TransformStep::CommonJs) {
        // Rolldown interops with CommonJS natively.
        debug!(plugin = request.plugin, "commonjs modules accepted");
    }

    BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(entry_stem(request.entry)),
            import: entry_id.to_string(),
        }]),
        cwd: Some(request.project_root.to_path_buf()),
        format: Some(output_format(request.format)),
        platform: Some(Platform::Browser),
        external: Some(IsExternal::from(vec![])),
        resolve,
        ..Default::default()
    }
}

fn output_format(format: BundleFormat) -> OutputFormat {
    match format {
        BundleFormat::Iife => OutputFormat::Iife,
        BundleFormat::Esm => OutputFormat::Esm,
        BundleFormat::Cjs => OutputFormat::Cjs,
    }
}

fn entry_stem(entry: &str) -> String {
    Path::new(entry)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("entry")
        .to_string()
}

/// Resolution rooted at the project: every `node_modules` from the project
/// root up to the filesystem root, browser fields first.
fn node_resolution(project_root: &Path) -> ResolveOptions {
    let modules: Vec<String> = project_root
        .ancestors()
        .map(|dir| dir.join("node_modules").to_string_lossy().into_owned())
        .chain(std::iter::once("node_modules".to_string()))
        .collect();

    ResolveOptions {
        main_fields: Some(vec![
            "browser".to_string(),
            "module".to_string(),
            "main".to_string(),
        ]),
        condition_names: Some(vec![
            "browser".to_string(),
            "import".to_string(),
            "require".to_string(),
            "default".to_string(),
        ]),
        extensions: Some(vec![
            ".js".to_string(),
            ".json".to_string(),
            ".mjs".to_string(),
            ".cjs".to_string(),
        ]),
        modules: Some(modules),
        symlinks: Some(true),
        ..Default::default()
    }
}

/// Lowers `code` to `target` syntax (e.g. `es2015`).
pub fn down_level(plugin: &str, code: &str, target: &str) -> Result<String> {
    let fail = |diagnostic: String| Error::Bundler {
        plugin: plugin.to_string(),
        diagnostic,
    };

    let options = TransformOptions::from_target(target)
        .map_err(|e| fail(format!("unsupported target '{target}': {e}")))?;

    let allocator = Allocator::default();
    let source_type = SourceType::cjs();
    let parsed = Parser::new(&allocator, code, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(fail(join_errors(&parsed.errors)));
    }
    let mut program = parsed.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let transformed = Transformer::new(&allocator, Path::new("bundle.js"), &options)
        .build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(fail(join_errors(&transformed.errors)));
    }

    Ok(Codegen::new().build(&program).code)
}

fn join_errors(errors: &[impl std::fmt::Debug]) -> String {
    errors
        .iter()
        .map(|e| format!("{:?}", e))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serves one in-memory entry module to Rolldown.
#[derive(Debug)]
struct VirtualEntryPlugin {
    id: String,
    source: String,
}

impl Plugin for VirtualEntryPlugin {
    fn name(&self) -> Cow<'static, str> {
        "chai-vendor-entry".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let claimed = (args.specifier == self.id).then(|| self.id.clone());

        async move {
            Ok(claimed.map(|id| HookResolveIdOutput {
                id: id.into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let source = (args.id == self.id).then(|| self.source.clone());

        async move {
            Ok(source.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
