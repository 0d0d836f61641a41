//! Configuration module for scoreline-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{BrandingConfig as FileBrandingConfig, FileConfig};
use scoreline_core::config::{BrandingConfig, MonitorConfig};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable supplying (or overriding) the provider API key.
pub const API_KEY_ENV: &str = "FOOTBALL_API_KEY";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no provider API key: set provider.api_key or {API_KEY_ENV}")]
    MissingApiKey,
}

/// Data provider settings.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: Url,
    pub api_key: String,
    pub timezone: String,
    pub timeout: Duration,
    pub snapshot_dump_dir: Option<PathBuf>,
}

/// Output channel settings.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub default: String,
    pub announcements: Option<String>,
    pub webhooks: BTreeMap<String, Url>,
}

impl ChannelSettings {
    pub fn contains(&self, name: &str) -> bool {
        self.webhooks.contains_key(name)
    }
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub provider: ProviderSettings,
    pub monitor: MonitorConfig,
    pub branding: BrandingConfig,
    pub channels: ChannelSettings,
    pub fixtures_path: Option<PathBuf>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.process(file_config, std::env::var(API_KEY_ENV).ok())
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn process(
        &self,
        mut file_config: FileConfig,
        env_api_key: Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(key) = env_api_key.filter(|key| !key.trim().is_empty()) {
            file_config.provider.api_key = Some(key);
        }

        self.validate(&file_config)?;
        build_loaded_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let channels = &config.channels;
        if channels.webhooks.is_empty() {
            return Err(ConfigError::ValidationError(
                "channels.webhooks must name at least one webhook".to_string(),
            ));
        }
        if !channels.webhooks.contains_key(&channels.default) {
            return Err(ConfigError::ValidationError(format!(
                "default channel {:?} is not a configured webhook",
                channels.default
            )));
        }
        if let Some(announcements) = &channels.announcements
            && !channels.webhooks.contains_key(announcements)
        {
            return Err(ConfigError::ValidationError(format!(
                "announcement channel {announcements:?} is not a configured webhook"
            )));
        }
        if config.monitor.poll_interval_secs < 1 {
            return Err(ConfigError::ValidationError(
                "monitor.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if config.monitor.max_simultaneous_games < 1 {
            return Err(ConfigError::ValidationError(
                "monitor.max_simultaneous_games must be at least 1".to_string(),
            ));
        }
        if config.monitor.dispatch_attempts < 1 {
            return Err(ConfigError::ValidationError(
                "monitor.dispatch_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let provider = file_config.provider;
    let api_key = provider
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;
    let base_url = Url::parse(&provider.base_url).map_err(|e| {
        ConfigError::ValidationError(format!("provider.base_url {:?}: {e}", provider.base_url))
    })?;

    let monitor = file_config.monitor;
    let defaults = MonitorConfig::default();

    Ok(LoadedConfig {
        listen: file_config.server.listen,
        provider: ProviderSettings {
            base_url,
            api_key,
            timezone: provider.timezone,
            timeout: Duration::from_secs(provider.timeout_secs),
            snapshot_dump_dir: provider.snapshot_dump_dir,
        },
        monitor: MonitorConfig {
            max_simultaneous_games: monitor.max_simultaneous_games,
            poll_interval: Duration::from_secs(monitor.poll_interval_secs),
            prematch_budget: Duration::from_secs(monitor.prematch_budget_hours * 60 * 60),
            break_budget: Duration::from_secs(monitor.break_budget_mins * 60),
            kickoff_long_interval: defaults.kickoff_long_interval,
            dispatch_attempts: monitor.dispatch_attempts,
        },
        branding: convert_branding(file_config.branding),
        channels: ChannelSettings {
            default: file_config.channels.default,
            announcements: file_config.channels.announcements,
            webhooks: file_config.channels.webhooks,
        },
        fixtures_path: file_config.directory.fixtures_path,
    })
}

fn convert_branding(b: FileBrandingConfig) -> BrandingConfig {
    let defaults = BrandingConfig::default();
    BrandingConfig {
        color: b.color.unwrap_or(defaults.color),
        footer_text: b.footer_text.unwrap_or(defaults.footer_text),
        footer_icon_url: b.footer_icon_url,
        thumbnail_url: b.thumbnail_url,
        website: b
            .website
            .map(|site| (site.field_name, site.name, site.url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
[provider]
api_key = "from-file"

[monitor]
poll_interval_secs = 90

[channels]
default = "matches"
webhooks = { matches = "https://chat.test/api/webhooks/1/abc" }
"#;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new("./scoreline.toml", None)
    }

    #[test]
    fn test_loaded_config_converts_units() {
        let loaded = loader().process(parse(BASE), None).unwrap();
        assert_eq!(loaded.provider.api_key, "from-file");
        assert_eq!(loaded.monitor.poll_interval, Duration::from_secs(90));
        assert_eq!(loaded.monitor.prematch_budget, Duration::from_secs(15 * 3600));
        assert_eq!(loaded.monitor.break_budget, Duration::from_secs(30 * 60));
        assert_eq!(loaded.branding.footer_text, BrandingConfig::default().footer_text);
        assert!(loaded.channels.contains("matches"));
    }

    #[test]
    fn test_dump_dir_is_a_provider_setting() {
        let config = parse(&BASE.replace(
            "api_key = \"from-file\"",
            "api_key = \"from-file\"\nsnapshot_dump_dir = \"/var/lib/scoreline/dumps\"",
        ));
        let loaded = loader().process(config, None).unwrap();
        assert_eq!(
            loaded.provider.snapshot_dump_dir,
            Some(PathBuf::from("/var/lib/scoreline/dumps"))
        );
    }

    #[test]
    fn test_env_key_overrides_file() {
        let loaded = loader()
            .process(parse(BASE), Some("from-env".to_string()))
            .unwrap();
        assert_eq!(loaded.provider.api_key, "from-env");
    }

    #[test]
    fn test_listen_override() {
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = ConfigLoader::new("./scoreline.toml", Some(addr))
            .process(parse(BASE), None)
            .unwrap();
        assert_eq!(loaded.listen, addr);
    }

    #[test]
    fn test_missing_api_key() {
        let config = parse(&BASE.replace("api_key = \"from-file\"", ""));
        assert!(matches!(
            loader().process(config, None),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_default_channel_must_exist() {
        let config = parse(&BASE.replace("default = \"matches\"", "default = \"goals\""));
        assert!(matches!(
            loader().process(config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let config = parse(&BASE.replace("poll_interval_secs = 90", "poll_interval_secs = 0"));
        assert!(matches!(
            loader().process(config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
