//! Command line surface of the `watchlog` binary
use clap::Parser;

use crate::Result;
use crate::WatchlogConfig;

const LOG_FORMAT_HELP: &str = "\
Log format:
  - Timestamp (format: 2006-01-02 15:04:05.999999999)
  - Resume Index -> Store Index
  - Action
  - Key
  - Value
  - Created Index
  - Modified Index
  - Child count, directories only

Every flag overrides the matching value from --config, CONFIG_PATH and
WATCHLOG__* environment variables.";

/// Flags left unset fall back to the layered configuration
#[derive(Debug, Parser)]
#[command(name = "watchlog")]
#[command(about = "Log every change under a path of an etcd v2 style store")]
#[command(after_help = LOG_FORMAT_HELP)]
pub struct Cli {
    /// URL to etcd [default: http://localhost:2379]
    #[arg(long)]
    pub host: Option<String>,

    /// Path to watch (recursively) [default: /]
    #[arg(long)]
    pub path: Option<String>,

    /// Index to start from; 0 starts from the current index [default: 0]
    #[arg(long)]
    pub index: Option<u64>,

    /// File to write JSON output to; '-' for stdout, '' for nowhere [default: ""]
    #[arg(long)]
    pub json: Option<String>,

    /// File to write human output to; '-' for stderr, '' for nowhere [default: -]
    #[arg(long)]
    pub log: Option<String>,

    /// Extra configuration file merged over CONFIG_PATH
    #[arg(long)]
    pub config: Option<String>,
}

impl Cli {
    /// Layered configuration with these flags applied last, validated
    pub fn load_config(&self) -> Result<WatchlogConfig> {
        let mut config = WatchlogConfig::new()?;
        if let Some(path) = &self.config {
            config = config.with_override_config(path)?;
        }
        self.apply(config).validate()
    }

    fn apply(
        &self,
        mut config: WatchlogConfig,
    ) -> WatchlogConfig {
        if let Some(host) = &self.host {
            config.store.endpoints = vec![host.clone()];
        }
        if let Some(path) = &self.path {
            config.watch.path = path.clone();
        }
        if let Some(index) = self.index {
            config.watch.start_index = index;
        }
        if let Some(json) = &self.json {
            config.output.json = json.clone();
        }
        if let Some(log) = &self.log {
            config.output.log = log.clone();
        }
        config
    }
}
