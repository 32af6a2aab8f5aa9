//! Configuration file loader for collection-publisher
//!
//! This module provides configuration loading, validation, and layering.

use super::config::{ConfigOverrides, PublisherConfig};
use crate::core::error::PublishError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
const CONFIG_FILENAME: &str = ".collection-publisher.yaml";

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// CLI arguments (highest priority)
    pub cli_args: Option<ConfigOverrides>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.collection-publisher.yaml)
    /// 4. Global config (~/.collection-publisher.yaml)
    /// 5. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PublisherConfig, PublishError> {
        let mut layers: Vec<ConfigOverrides> = Vec::new();

        if let Some(global_config) = Self::load_global_config(&options.env).await? {
            layers.push(global_config);
        }

        if let Some(project_config) = Self::load_project_config(&options.project_path).await? {
            layers.push(project_config);
        }

        if let Some(env_config) = Self::load_env_config(&options.env)? {
            layers.push(env_config);
        }

        if let Some(cli_config) = options.cli_args {
            layers.push(cli_config);
        }

        let mut config = PublisherConfig::default();
        for layer in layers {
            config.apply(layer);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load global configuration from ~/.collection-publisher.yaml
    async fn load_global_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<ConfigOverrides>, PublishError> {
        let Some(home_dir) = env.get("HOME") else {
            return Ok(None);
        };

        Self::load_config_file(&PathBuf::from(home_dir).join(CONFIG_FILENAME)).await
    }

    /// Load project configuration from ./.collection-publisher.yaml
    async fn load_project_config(
        project_path: &Path,
    ) -> Result<Option<ConfigOverrides>, PublishError> {
        Self::load_config_file(&project_path.join(CONFIG_FILENAME)).await
    }

    /// Load configuration from YAML file
    async fn load_config_file(file_path: &Path) -> Result<Option<ConfigOverrides>, PublishError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            PublishError::ConfigError(format!("failed to read {}: {}", file_path.display(), e))
        })?;

        // An empty file deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(None);
        }

        let config: ConfigOverrides = serde_yaml::from_str(&content).map_err(|e| {
            PublishError::ConfigError(format!("failed to parse {}: {}", file_path.display(), e))
        })?;

        tracing::debug!(path = %file_path.display(), "loaded config file");

        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_env_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<ConfigOverrides>, PublishError> {
        let mut config = ConfigOverrides::default();

        // COLLECTIONS_ROOT -> collectionsRoot
        if let Some(root) = env.get("COLLECTIONS_ROOT").filter(|v| !v.is_empty()) {
            config.collections_root = Some(PathBuf::from(root));
        }

        // GALAXY_COMMAND_TIMEOUT -> commandTimeoutSecs
        if let Some(timeout) = env.get("GALAXY_COMMAND_TIMEOUT").filter(|v| !v.is_empty()) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                PublishError::ConfigError(format!(
                    "GALAXY_COMMAND_TIMEOUT must be a number of seconds, got '{}'",
                    timeout
                ))
            })?;
            config.command_timeout_secs = Some(secs);
        }

        if config.is_empty() {
            Ok(None)
        } else {
            Ok(Some(config))
        }
    }

    /// Validate the effective configuration
    pub fn validate(config: &PublisherConfig) -> Result<(), PublishError> {
        if config.galaxy_command.trim().is_empty() {
            return Err(PublishError::ConfigError(
                "galaxyCommand must not be empty".to_string(),
            ));
        }

        if config.command_timeout_secs == 0 {
            return Err(PublishError::ConfigError(
                "commandTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
