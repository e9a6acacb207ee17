//! Configuration provider using Figment

use crate::{
    discovery::{ConfigFile, ConfigFormat, FileDiscovery},
    types::SyncConfig,
    ConfigResult, ENV_PREFIX,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, info, trace};

/// Configuration provider using figment
///
/// Configuration is read fresh on every `load` so edits are picked up without a
/// restart.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
}

impl ConfigProvider {
    /// Create a provider over the standard global and project directories
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider over a custom discovery (used by tests and embedders)
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<SyncConfig> {
        let config: SyncConfig = self.build_figment().extract()?;
        config.validate()?;
        info!(
            spacing = config.ordering.spacing,
            channel_capacity = config.realtime.channel_capacity,
            "Loaded kanban-sync configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. Configuration files (global, then project)
    /// 3. Environment variables (`KANBAN_SYNC_`, nested keys split on `__`)
    pub fn build_figment(&self) -> Figment {
        debug!("Building figment configuration with precedence order");

        let mut figment = Figment::from(Serialized::defaults(SyncConfig::default()));
        for file in self.discovery.discover_all() {
            trace!("Merging config file: {}", file.path.display());
            figment = figment.merge(file_provider(&file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

fn file_provider(file: &ConfigFile) -> Figment {
    match file.format {
        ConfigFormat::Toml => Figment::from(Toml::file(&file.path)),
        ConfigFormat::Yaml => Figment::from(Yaml::file(&file.path)),
        ConfigFormat::Json => Figment::from(Json::file(&file.path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn provider_over(project: &TempDir, global: &TempDir) -> ConfigProvider {
        ConfigProvider::with_discovery(FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(global.path().to_path_buf()),
        ))
    }

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let config = provider_over(&project, &global).load().unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    #[serial]
    fn test_project_overrides_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join("config.toml"),
            "[ordering]\nspacing = 8.0\n\n[realtime]\nchannel_capacity = 32\n",
        )
        .unwrap();
        fs::write(
            project.path().join("config.yaml"),
            "ordering:\n  spacing: 64.0\n",
        )
        .unwrap();

        let config = provider_over(&project, &global).load().unwrap();
        assert_eq!(config.ordering.spacing, 64.0);
        assert_eq!(config.realtime.channel_capacity, 32);
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            project.path().join("config.json"),
            r#"{"client": {"refetch_on_invalidate": true}}"#,
        )
        .unwrap();

        std::env::set_var("KANBAN_SYNC_CLIENT__REFETCH_ON_INVALIDATE", "false");
        let result = provider_over(&project, &global).load();
        std::env::remove_var("KANBAN_SYNC_CLIENT__REFETCH_ON_INVALIDATE");

        assert!(!result.unwrap().client.refetch_on_invalidate);
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(project.path().join("config.toml"), "[ordering]\nspacing = -1.0\n").unwrap();

        let result = provider_over(&project, &global).load();
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_a_parse_error() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            project.path().join("config.toml"),
            "[realtime]\nchannel_capacity = \"lots\"\n",
        )
        .unwrap();

        let result = provider_over(&project, &global).load();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
