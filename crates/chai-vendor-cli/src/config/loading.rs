use crate::cli::{BuildArgs, CheckArgs, ProjectArgs};
use crate::config::VendorConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project directory.
pub const CONFIG_FILE: &str = "chai-vendor.json";

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "CHAI_VENDOR_";

/// Variables read after [`ENV_PREFIX`]. Others sharing the prefix are ignored.
const ENV_KEYS: &[&str] = &[
    "cwd",
    "out_dir",
    "vendor_root",
    "core_package",
    "imports_file",
    "clean",
    "overwrite",
];

/// Settings given on the command line. Unset fields leave lower-priority
/// sources alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imports_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
}

impl From<&ProjectArgs> for ConfigOverrides {
    fn from(args: &ProjectArgs) -> Self {
        Self {
            vendor_root: args.vendor_root.clone(),
            core_package: args.core_package.clone(),
            ..Self::default()
        }
    }
}

impl From<&BuildArgs> for ConfigOverrides {
    fn from(args: &BuildArgs) -> Self {
        Self {
            out_dir: args.out_dir.clone(),
            imports_file: args.imports_file.clone(),
            // Flags can only switch these on, so absence must not override.
            clean: args.clean.then_some(true),
            overwrite: args.no_overwrite.then_some(false),
            ..Self::from(&args.project)
        }
    }
}

impl From<&CheckArgs> for ConfigOverrides {
    fn from(args: &CheckArgs) -> Self {
        Self::from(&args.project)
    }
}

impl VendorConfig {
    /// Loads configuration for a project started from `base_dir`.
    ///
    /// `config_path` must exist when given. Otherwise `chai-vendor.json` in
    /// `base_dir` is used if present.
    pub fn load(
        base_dir: &Path,
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base_dir.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = base_dir.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment
            .merge(env_provider())
            .merge(Serialized::defaults(overrides));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// `CHAI_VENDOR_VENDOR_ROOT` becomes `vendorRoot`, matching the file format.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .only(ENV_KEYS)
        .map(|key| env_key(key.as_str()).into())
        .lowercase(false)
}

pub(crate) fn env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}
