//! Configuration loader for roster
//!
//! Resolves the configuration sources from the environment and merges them
//! with the `config` crate.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "ROSTER_CONFIG_DIR";

/// Environment variable for specific configuration file
pub const CONFIG_FILE_ENV: &str = "ROSTER_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "ROSTER";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Where the file-based part of the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `default.toml`, `{environment}.toml` and `local.toml` from a directory
    Layered { dir: PathBuf },
    /// A single file, no layering
    SingleFile { path: PathBuf },
}

/// Configuration loader that handles layered configuration loading
///
/// Sources, in order of priority (lowest first):
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `ROSTER_*` environment variables
#[derive(Debug)]
pub struct ConfigLoader {
    source: ConfigSource,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `ROSTER_CONFIG_DIR`, `ROSTER_CONFIG_FILE` and `ROSTER_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `ROSTER_CONFIG_DIR` and `ROSTER_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok();

        let source = match (config_dir, config_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::mutual_exclusivity(
                    "ROSTER_CONFIG_DIR and ROSTER_CONFIG_FILE cannot both be set. \
                     Use ROSTER_CONFIG_DIR for layered configuration or \
                     ROSTER_CONFIG_FILE for a single configuration file.",
                ));
            }
            (None, Some(file)) => ConfigSource::SingleFile {
                path: PathBuf::from(file),
            },
            (Some(dir), None) => ConfigSource::Layered {
                dir: PathBuf::from(dir),
            },
            (None, None) => ConfigSource::Layered {
                dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            },
        };

        Ok(Self {
            source,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Create a loader for an explicit file, ignoring the directory variables.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ConfigSource::SingleFile { path: path.into() },
            environment: AppEnvironment::from_env(),
        }
    }

    /// Override the environment used to pick the overlay file.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the single file) is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let mut settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;
        settings.application.environment = self.environment;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.source {
            ConfigSource::SingleFile { path } => Self::add_file_source(builder, path, true)?,
            ConfigSource::Layered { dir } => {
                let builder = Self::add_file_source(builder, &dir.join("default.toml"), true)?;
                let builder = Self::add_file_source(
                    builder,
                    &dir.join(self.environment.overlay_file_name()),
                    false,
                )?;
                Self::add_file_source(builder, &dir.join("local.toml"), false)?
            }
        };

        // ROSTER_SERVER__PORT -> server.port
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching process environment must not interleave
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const MANAGED_VARS: &[&str] = &[
        CONFIG_DIR_ENV,
        CONFIG_FILE_ENV,
        AppEnvironment::ENV_VAR,
        "ROSTER_SERVER__PORT",
        "ROSTER_DATABASE__ENABLED",
        "ROSTER_SERVER__ALLOWED_ORIGINS",
    ];

    /// Snapshots the managed variables, clears them, and restores them on drop.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let saved = MANAGED_VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect();
            for key in MANAGED_VARS {
                unsafe { std::env::remove_var(key) };
            }
            Self { saved }
        }

        fn set(&self, key: &str, value: &str) {
            unsafe { std::env::set_var(key, value) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                unsafe {
                    match value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(dir.path().join(name), content).expect("Failed to write config file");
        }
        dir
    }

    const DEFAULT_TOML: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
enabled = false
"#;

    #[test]
    fn test_default_source_is_config_dir() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(
            loader.source(),
            &ConfigSource::Layered {
                dir: PathBuf::from("config")
            }
        );
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_dir_and_file_are_mutually_exclusive() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/roster.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("ROSTER_CONFIG_DIR"));
                assert!(msg.contains("ROSTER_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_toml() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());

        match ConfigLoader::new().unwrap().load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_layers_apply_in_order() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", "[server]\nport = 8000\n"),
            ("local.toml", "[logger]\nlevel = \"debug\"\n"),
        ]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "production");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.logger.level, "debug");
        assert_eq!(settings.application.environment, AppEnvironment::Production);
    }

    #[test]
    fn test_env_vars_override_files() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", DEFAULT_TOML)]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set("ROSTER_SERVER__PORT", "9090");
        env.set("ROSTER_DATABASE__ENABLED", "true");
        env.set(
            "ROSTER_SERVER__ALLOWED_ORIGINS",
            "https://app.example.com,http://localhost:5000",
        );

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.server.port, 9090);
        assert!(settings.database.enabled);
        assert_eq!(
            settings.server.allowed_origins,
            vec![
                "https://app.example.com".to_string(),
                "http://localhost:5000".to_string()
            ]
        );
    }

    #[test]
    fn test_single_file_mode() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = config_dir(&[("roster.toml", "[server]\nport = 7070\n")]);

        let settings = ConfigLoader::from_file(dir.path().join("roster.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 7070);
    }

    #[test]
    fn test_explicit_environment_wins_over_env_var() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let env = EnvGuard::clean();
        env.set(AppEnvironment::ENV_VAR, "staging");
        let dir = config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", "[server]\nport = 8000\n"),
        ]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());

        let settings = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production)
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.application.environment, AppEnvironment::Production);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = config_dir(&[("roster.toml", "[server]\nport = 0\n")]);

        let result = ConfigLoader::from_file(dir.path().join("roster.toml")).load();
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }
}
