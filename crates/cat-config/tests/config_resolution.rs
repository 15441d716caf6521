//! Resolution-order integration tests for `CatConfig`.

use cat_config::{resolve, resolve_config_path, ConfigSource};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|k| env::var(k).ok()).collect();
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

fn write_config(path: &Path, min_items: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config parent");
    }
    let mut config = cat_config::CatConfig::default();
    config.min_items = min_items;
    fs::write(path, serde_json::to_string(&config).unwrap()).expect("write config fixture");
}

#[test]
fn cli_argument_wins_over_environment() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["CAT_ENGINE_CONFIG", "CAT_ENGINE_CONFIG_DIR"]);

        let temp = TempDir::new().expect("temp dir");
        let cli_path: PathBuf = temp.path().join("cli-config.json");
        let env_path: PathBuf = temp.path().join("env-config.json");
        write_config(&cli_path, 6);
        write_config(&env_path, 9);

        env::set_var("CAT_ENGINE_CONFIG", env_path.display().to_string());

        let resolved = resolve_config_path(Some(&cli_path));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.unwrap(), cli_path);
    });
}

#[test]
fn environment_variable_wins_over_config_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["CAT_ENGINE_CONFIG", "CAT_ENGINE_CONFIG_DIR"]);

        let temp = TempDir::new().expect("temp dir");
        let env_path = temp.path().join("env-config.json");
        let dir_path = temp.path().join("config-dir");
        write_config(&env_path, 7);
        write_config(&dir_path.join("config.json"), 11);

        env::set_var("CAT_ENGINE_CONFIG", env_path.display().to_string());
        env::set_var("CAT_ENGINE_CONFIG_DIR", dir_path.display().to_string());

        let resolved = resolve_config_path(None);
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.path.unwrap(), env_path);
    });
}

#[test]
fn resolve_loads_and_validates_a_discovered_config() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["CAT_ENGINE_CONFIG", "CAT_ENGINE_CONFIG_DIR"]);

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.json");
        write_config(&path, 6);
        env::set_var("CAT_ENGINE_CONFIG", path.display().to_string());

        let (config, source) = resolve(None).expect("resolve should succeed");
        assert_eq!(source, ConfigSource::Environment);
        assert_eq!(config.min_items, 6);
    });
}

#[test]
fn resolve_rejects_an_invalid_discovered_config() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["CAT_ENGINE_CONFIG", "CAT_ENGINE_CONFIG_DIR"]);

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.json");
        let mut bad = cat_config::CatConfig::default();
        bad.max_items = bad.min_items;
        fs::write(&path, serde_json::to_string(&bad).unwrap()).unwrap();
        env::set_var("CAT_ENGINE_CONFIG", path.display().to_string());

        assert!(resolve(None).is_err());
    });
}
