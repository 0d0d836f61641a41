//! TOML file configuration structures.
//!
//! These structs directly map to the `scoreline.toml` file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Football data provider section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    /// Account key. May be left out and supplied through `FOOTBALL_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Write every fetched payload to this directory. Read at startup only.
    #[serde(default)]
    pub snapshot_dump_dir: Option<PathBuf>,
}

fn default_provider_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Tracking loop section. Reloaded on SIGHUP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_max_games")]
    pub max_simultaneous_games: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_prematch_budget_hours")]
    pub prematch_budget_hours: u64,
    #[serde(default = "default_break_budget_mins")]
    pub break_budget_mins: u64,
    #[serde(default = "default_dispatch_attempts")]
    pub dispatch_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_simultaneous_games: default_max_games(),
            poll_interval_secs: default_poll_interval_secs(),
            prematch_budget_hours: default_prematch_budget_hours(),
            break_budget_mins: default_break_budget_mins(),
            dispatch_attempts: default_dispatch_attempts(),
        }
    }
}

fn default_max_games() -> usize {
    3
}

fn default_poll_interval_secs() -> u64 {
    120
}

fn default_prematch_budget_hours() -> u64 {
    15
}

fn default_break_budget_mins() -> u64 {
    30
}

fn default_dispatch_attempts() -> u32 {
    3
}

/// Message cosmetics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Embed colour as `0xRRGGBB`.
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub footer_text: Option<String>,
    #[serde(default)]
    pub footer_icon_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub website: Option<WebsiteLink>,
}

/// Link field appended to every message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteLink {
    #[serde(default = "default_website_field")]
    pub field_name: String,
    pub name: String,
    pub url: Url,
}

fn default_website_field() -> String {
    "Check it out:".to_string()
}

/// Output channels, each a webhook URL under a short name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Channel used when a follow request names none.
    pub default: String,
    /// Channel used for announcements when a follow request names none.
    /// Falls back to the tracked message's channel.
    #[serde(default)]
    pub announcements: Option<String>,
    pub webhooks: BTreeMap<String, Url>,
}

/// Fixture directory section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// JSON map of team name to upcoming fixtures. Team lookups are
    /// disabled when absent.
    #[serde(default)]
    pub fixtures_path: Option<PathBuf>,
}
