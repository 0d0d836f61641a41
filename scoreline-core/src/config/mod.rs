//! Configuration types for the live tracker.
//!
//! These types represent validated runtime configuration. Loading and
//! parsing the configuration file is handled by the server crate.

mod branding;
mod config_store;
mod monitor;

pub use branding::BrandingConfig;
pub use config_store::ConfigStore;
pub use monitor::MonitorConfig;
