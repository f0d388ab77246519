//! Configuration management for the watchlog binary.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH` or an explicit override file)
//! - Environment variable overrides (`WATCHLOG__` prefix)
//! - Component-wise validation
mod output;
mod store;
mod watch;
pub use output::*;
pub use store::*;
pub use watch::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
///
/// Command line flags are applied on top by [`Cli`](crate::Cli).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WatchlogConfig {
    /// Store endpoints and connection parameters
    #[serde(default)]
    pub store: StoreConfig,
    /// Watched path and watch loop tuning
    #[serde(default)]
    pub watch: WatchConfig,
    /// Human and JSON output destinations
    #[serde(default)]
    pub output: OutputConfig,
}

impl WatchlogConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `WATCHLOG__` prefix (highest priority)
    ///
    /// # Note
    /// Callers MUST call `validate()` once all overrides are applied.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("WATCHLOG__WATCH__PATH", "/services");
    /// let cfg = WatchlogConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path).required(true))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// # Errors
    /// - Missing or malformed store endpoints
    /// - Empty watch path or zero-sized event buffer
    /// - Both outputs suppressed
    pub fn validate(self) -> Result<Self> {
        self.store.validate()?;
        self.watch.validate()?;
        self.output.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix("WATCHLOG")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("store.endpoints")
            .ignore_empty(true)
            .try_parsing(true)
    }
}
