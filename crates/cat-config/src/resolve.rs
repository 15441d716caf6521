//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument -> environment variable -> XDG config
//! directory -> built-in defaults.

use std::path::{Path, PathBuf};

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Discovered configuration file path, with its provenance for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfigPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

const ENV_CONFIG_PATH: &str = "CAT_ENGINE_CONFIG";
const ENV_CONFIG_DIR: &str = "CAT_ENGINE_CONFIG_DIR";
const CONFIG_FILENAME: &str = "config.json";
const APP_NAME: &str = "cat-engine";

/// Resolve the configuration file path using the standard resolution order.
///
/// 1. Explicit CLI path (if provided and it exists)
/// 2. `CAT_ENGINE_CONFIG` environment variable (direct path)
/// 3. `CAT_ENGINE_CONFIG_DIR` environment variable + `config.json`
/// 4. XDG config directory (`~/.config/cat-engine/config.json`)
/// 5. Built-in defaults (no path; `CatConfig::default()` is used)
pub fn resolve_config_path(cli_path: Option<&Path>) -> ResolvedConfigPath {
    if let Some(path) = cli_path {
        if path.exists() {
            return ResolvedConfigPath {
                path: Some(path.to_path_buf()),
                source: ConfigSource::CliArgument,
            };
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ResolvedConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return ResolvedConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(xdg_config) = dirs::config_dir() {
        let path = xdg_config.join(APP_NAME).join(CONFIG_FILENAME);
        if path.exists() {
            return ResolvedConfigPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    ResolvedConfigPath {
        path: None,
        source: ConfigSource::BuiltinDefault,
    }
}

/// Resolve and load the `CatConfig`, falling back to `CatConfig::default()`
/// when no config file is found at any resolution step.
pub fn resolve(
    cli_path: Option<&Path>,
) -> Result<(crate::config::CatConfig, ConfigSource), crate::validate::ValidationError> {
    let resolved = resolve_config_path(cli_path);
    let config = match &resolved.path {
        Some(path) => crate::config::CatConfig::from_file(path)?,
        None => crate::config::CatConfig::default(),
    };
    crate::validate::validate_config(&config)?;
    Ok((config, resolved.source))
}

/// Get the XDG config directory for the CAT engine.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
