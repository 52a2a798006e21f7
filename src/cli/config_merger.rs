//! Configuration merger for CLI arguments and config files
//!
//! Precedence, lowest first: configuration files, `ROSTER_*` environment
//! variables, global CLI flags, command-specific CLI flags.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

/// Holds file/environment configuration and applies CLI overrides on top.
#[derive(Debug, Clone)]
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the way the CLI asks for it.
    ///
    /// `--config` selects a single file; otherwise the layered loader reads
    /// `ROSTER_CONFIG_DIR` / `ROSTER_CONFIG_FILE`. `--env` overrides
    /// `ROSTER_APP_ENV` for the overlay choice.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = Self::loader(cli.config.as_deref())?;
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };
        Ok(Self::new(loader.load()?))
    }

    fn loader(config_path: Option<&Path>) -> Result<ConfigLoader, ConfigError> {
        match config_path {
            Some(path) => Ok(ConfigLoader::from_file(path)),
            None => ConfigLoader::new(),
        }
    }

    /// Applies CLI overrides and re-validates the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(command) = &cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                ..
            } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                // Command-specific level wins over --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
            Commands::Migrate { .. } => {}
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_overrides_keeps_base() {
        assert_eq!(merge(&["roster"]).unwrap(), Settings::default());
    }

    #[test]
    fn test_serve_overrides() {
        let settings = merge(&[
            "roster",
            "--quiet",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--log-level",
            "trace",
        ])
        .unwrap();

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.logger.level, "trace");
    }

    #[test]
    fn test_verbose_and_quiet_levels() {
        assert_eq!(merge(&["roster", "-v"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["roster", "-q"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_migrate_leaves_server_untouched() {
        let settings = merge(&["roster", "migrate"]).unwrap();
        assert_eq!(settings.server, Settings::default().server);
    }

    #[test]
    fn test_from_cli_reads_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.toml");
        fs::write(&path, "[server]\nport = 4321\n").unwrap();

        let cli = Cli::try_parse_from(["roster", "--config", path.to_str().unwrap()]).unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.config().server.port, 4321);
    }

    #[test]
    fn test_from_cli_records_env_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.toml");
        fs::write(&path, "[server]\nport = 4321\n").unwrap();

        let cli = Cli::try_parse_from([
            "roster",
            "--config",
            path.to_str().unwrap(),
            "--env",
            "production",
        ])
        .unwrap();
        let settings = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(
            settings.application.environment,
            crate::config::Environment::Production
        );
    }
}
