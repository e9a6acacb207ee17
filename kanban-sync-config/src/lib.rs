//! kanban-sync configuration management using Figment
//!
//! Tunables for the ordering engine, the realtime bus and the synchronization client
//! are loaded from layered sources with a clear precedence:
//! defaults → global file → project file → environment.
//!
//! # Configuration Files
//!
//! - Global: `~/.kanban-sync/config.{toml,yaml,yml,json}`
//! - Project: `./.kanban-sync/config.{toml,yaml,yml,json}`
//!
//! ```toml
//! [ordering]
//! spacing = 1.0
//! min_gap = 1e-9
//!
//! [realtime]
//! channel_capacity = 256
//!
//! [client]
//! refetch_on_invalidate = true
//! ```
//!
//! # Environment Variables
//!
//! Variables prefixed with `KANBAN_SYNC_` override file values. Nested keys are
//! separated by a double underscore:
//!
//! ```bash
//! export KANBAN_SYNC_ORDERING__SPACING=1024
//! export KANBAN_SYNC_REALTIME__CHANNEL_CAPACITY=64
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use kanban_sync_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("order key spacing: {}", config.ordering.spacing);
//! # Ok::<(), kanban_sync_config::ConfigError>(())
//! ```

/// File discovery logic for configuration files
pub mod discovery;
/// Error types
pub mod error;
/// Figment provider
pub mod provider;
/// Typed configuration sections
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery};
pub use error::{ConfigError, ConfigResult};
pub use provider::ConfigProvider;
pub use types::{ClientConfig, OrderingConfig, RealtimeConfig, SyncConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "KANBAN_SYNC_";

/// Name of the configuration directory (global and project)
pub const CONFIG_DIR_NAME: &str = ".kanban-sync";

/// Load configuration from all discovered sources
pub fn load_configuration() -> ConfigResult<SyncConfig> {
    ConfigProvider::new().load()
}
