//! Configuration loading.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.ariza/config.toml`)
//! 3. User config (`~/.ariza/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. With no config at all the store probes
//! `http://localhost:3000/api` and falls back to `~/.ariza/local/`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Default remote API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default key the local backend stores its collection under.
pub const DEFAULT_LOCAL_KEY: &str = "arizaKayitlar";

/// Default database name reported by `status()`.
pub const DEFAULT_DATABASE_NAME: &str = "ariza_durus.db";

/// Smallest accepted timeout, in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Name shown by the status call.
    pub database_name: String,
    /// Remote API configuration.
    pub api: ApiConfig,
    /// Local fallback configuration.
    pub local: LocalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            api: ApiConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; the store appends `/status` and `/kayitlar`.
    pub base_url: String,
    /// Deadline for every record operation.
    pub timeout_ms: u64,
    /// Deadline for the one-time liveness probe.
    pub probe_timeout_ms: u64,
    /// Skip the probe and go straight to the local backend.
    pub force_local: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            probe_timeout_ms: 3_000,
            force_local: false,
        }
    }
}

impl ApiConfig {
    /// Validate a timeout value.
    pub fn is_valid_timeout(ms: u64) -> bool {
        ms >= MIN_TIMEOUT_MS
    }

    /// Per-call deadline.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(MIN_TIMEOUT_MS))
    }

    /// Probe deadline.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(MIN_TIMEOUT_MS))
    }
}

/// Local fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory for the file store (default `<ariza_home>/local`).
    pub dir: Option<PathBuf>,
    /// Key the serialized collection lives under.
    pub key: String,
    /// Report missing ids on update/delete instead of succeeding silently.
    pub strict_not_found: bool,
    /// Keep the collection in memory only.
    pub memory: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: DEFAULT_LOCAL_KEY.to_string(),
            strict_not_found: false,
            memory: false,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.ariza/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = ariza_home()?;
        let config_path = home.join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load project config from `.ariza/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_config_path(cwd);
        match Self::load_from_file(&config_path) {
            Ok(config) => Some(config),
            Err(StorageError::Config { message }) => {
                tracing::warn!("ignoring {}: {}", config_path.display(), message);
                None
            }
            Err(_) => None,
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| StorageError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| StorageError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // ARIZA_API_URL
        if let Ok(val) = env::var("ARIZA_API_URL") {
            if val.trim().is_empty() {
                tracing::warn!(
                    "ARIZA_API_URL is empty, using '{}'",
                    self.api.base_url
                );
            } else {
                self.api.base_url = val.trim().to_string();
            }
        }

        // ARIZA_TIMEOUT_MS
        if let Ok(val) = env::var("ARIZA_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(n) if ApiConfig::is_valid_timeout(n) => self.api.timeout_ms = n,
                _ => tracing::warn!(
                    "Invalid ARIZA_TIMEOUT_MS value '{}'. Expected an integer >= {}. Using '{}'.",
                    val,
                    MIN_TIMEOUT_MS,
                    self.api.timeout_ms
                ),
            }
        }

        // ARIZA_PROBE_TIMEOUT_MS
        if let Ok(val) = env::var("ARIZA_PROBE_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(n) if ApiConfig::is_valid_timeout(n) => self.api.probe_timeout_ms = n,
                _ => tracing::warn!(
                    "Invalid ARIZA_PROBE_TIMEOUT_MS value '{}'. Expected an integer >= {}. Using '{}'.",
                    val,
                    MIN_TIMEOUT_MS,
                    self.api.probe_timeout_ms
                ),
            }
        }

        // ARIZA_FORCE_LOCAL
        if let Ok(val) = env::var("ARIZA_FORCE_LOCAL") {
            self.api.force_local = is_truthy(&val);
        }

        // ARIZA_LOCAL_DIR
        if let Ok(val) = env::var("ARIZA_LOCAL_DIR") {
            if !val.trim().is_empty() {
                self.local.dir = Some(PathBuf::from(val.trim()));
            }
        }

        // ARIZA_LOCAL_MEMORY
        if let Ok(val) = env::var("ARIZA_LOCAL_MEMORY") {
            self.local.memory = is_truthy(&val);
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence for every field that differs from
    /// the default. A layer cannot set a value back to its default over a
    /// lower layer's customization.
    fn merge(mut self, other: Config) -> Self {
        if other.database_name != DEFAULT_DATABASE_NAME {
            self.database_name = other.database_name;
        }

        let default_api = ApiConfig::default();
        if other.api.base_url != default_api.base_url {
            self.api.base_url = other.api.base_url;
        }
        if other.api.timeout_ms != default_api.timeout_ms {
            self.api.timeout_ms = other.api.timeout_ms;
        }
        if other.api.probe_timeout_ms != default_api.probe_timeout_ms {
            self.api.probe_timeout_ms = other.api.probe_timeout_ms;
        }
        if other.api.force_local != default_api.force_local {
            self.api.force_local = other.api.force_local;
        }

        let default_local = LocalConfig::default();
        if other.local.dir.is_some() {
            self.local.dir = other.local.dir;
        }
        if other.local.key != default_local.key {
            self.local.key = other.local.key;
        }
        if other.local.strict_not_found != default_local.strict_not_found {
            self.local.strict_not_found = other.local.strict_not_found;
        }
        if other.local.memory != default_local.memory {
            self.local.memory = other.local.memory;
        }

        self
    }

    /// Directory the file store should use.
    pub fn local_dir(&self) -> Option<PathBuf> {
        self.local.dir.clone().or_else(local_store_dir)
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val.trim(), "true" | "1" | "yes")
}

/// Get the ariza home directory.
///
/// Checks `ARIZA_HOME` environment variable first, then falls back to
/// `~/.ariza`.
pub fn ariza_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("ARIZA_HOME") {
        if home.is_empty() {
            tracing::warn!("ARIZA_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("ARIZA_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".ariza"));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = fallback_ariza_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_ariza_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/ariza-{}", uid))
}

/// Get fallback home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_ariza_home() -> PathBuf {
    std::env::temp_dir().join("ariza")
}

/// Get the default local store directory.
///
/// Returns `<ariza_home>/local/`.
pub fn local_store_dir() -> Option<PathBuf> {
    ariza_home().map(|h| h.join("local"))
}

/// Get the project config path for a working directory.
///
/// Returns `<cwd>/.ariza/config.toml`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".ariza").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "ARIZA_API_URL",
        "ARIZA_TIMEOUT_MS",
        "ARIZA_PROBE_TIMEOUT_MS",
        "ARIZA_FORCE_LOCAL",
        "ARIZA_LOCAL_DIR",
        "ARIZA_LOCAL_MEMORY",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database_name, "ariza_durus.db");
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.probe_timeout_ms, 3_000);
        assert!(!config.api.force_local);
        assert_eq!(config.local.key, "arizaKayitlar");
        assert!(config.local.dir.is_none());
        assert!(!config.local.strict_not_found);
        assert!(!config.local.memory);
    }

    #[test]
    fn test_timeouts_as_durations() {
        let api = ApiConfig {
            timeout_ms: 250,
            probe_timeout_ms: 0,
            ..ApiConfig::default()
        };
        assert_eq!(api.call_timeout(), Duration::from_millis(250));
        assert_eq!(api.probe_timeout(), Duration::from_millis(MIN_TIMEOUT_MS));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
database_name = "fabrika.db"

[api]
base_url = "http://10.0.0.5:3000/api"
timeout_ms = 2500

[local]
strict_not_found = true
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(config.database_name, "fabrika.db");
        assert_eq!(config.api.base_url, "http://10.0.0.5:3000/api");
        assert_eq!(config.api.timeout_ms, 2500);
        assert!(config.local.strict_not_found);

        // Other fields should be defaults
        assert_eq!(config.api.probe_timeout_ms, 3_000);
        assert_eq!(config.local.key, "arizaKayitlar");
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(StorageError::Config { .. })));
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let base = Config {
            api: ApiConfig {
                timeout_ms: 500,
                ..ApiConfig::default()
            },
            ..Config::default()
        };
        let overlay = Config {
            api: ApiConfig {
                base_url: "http://db.local/api".to_string(),
                ..ApiConfig::default()
            },
            ..Config::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.api.base_url, "http://db.local/api");
        assert_eq!(merged.api.timeout_ms, 500);
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("ARIZA_HOME", home.path());
        fs::write(
            home.path().join("config.toml"),
            "[api]\ntimeout_ms = 4000\nprobe_timeout_ms = 900\n",
        )
        .unwrap();

        let project = TempDir::new().unwrap();
        let config_path = project_config_path(project.path());
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "[api]\ntimeout_ms = 7000\n").unwrap();

        let config = Config::load_from_cwd(project.path());

        // Project overrides user
        assert_eq!(config.api.timeout_ms, 7000);
        // User overrides default
        assert_eq!(config.api.probe_timeout_ms, 900);

        env::remove_var("ARIZA_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("ARIZA_HOME", home.path());

        let project = TempDir::new().unwrap();
        let config_path = project_config_path(project.path());
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "[api]\nbase_url = \"http://project/api\"\n").unwrap();

        env::set_var("ARIZA_API_URL", "http://env/api");

        let config = Config::load_from_cwd(project.path());
        assert_eq!(config.api.base_url, "http://env/api");

        env::remove_var("ARIZA_API_URL");
        env::remove_var("ARIZA_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("ARIZA_TIMEOUT_MS", "1500");
        env::set_var("ARIZA_PROBE_TIMEOUT_MS", "200");
        env::set_var("ARIZA_FORCE_LOCAL", "1");
        env::set_var("ARIZA_LOCAL_DIR", "/var/lib/ariza");
        env::set_var("ARIZA_LOCAL_MEMORY", "true");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.api.timeout_ms, 1500);
        assert_eq!(config.api.probe_timeout_ms, 200);
        assert!(config.api.force_local);
        assert_eq!(config.local.dir, Some(PathBuf::from("/var/lib/ariza")));
        assert!(config.local.memory);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        env::set_var("ARIZA_TIMEOUT_MS", "soon");
        env::set_var("ARIZA_PROBE_TIMEOUT_MS", "0");
        env::set_var("ARIZA_API_URL", "   ");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.probe_timeout_ms, 3_000);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_ariza_home_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("ARIZA_HOME", dir.path());

        assert_eq!(ariza_home(), Some(dir.path().to_path_buf()));
        assert_eq!(local_store_dir(), Some(dir.path().join("local")));

        env::remove_var("ARIZA_HOME");
    }

    #[test]
    #[serial]
    fn test_local_dir_prefers_explicit() {
        let config = Config {
            local: LocalConfig {
                dir: Some(PathBuf::from("/data/ariza")),
                ..LocalConfig::default()
            },
            ..Config::default()
        };
        assert_eq!(config.local_dir(), Some(PathBuf::from("/data/ariza")));
    }
}
