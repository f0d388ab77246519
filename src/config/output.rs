use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Output destinations
///
/// Each value is `"-"` for the default stream, `""` to suppress the output,
/// or a file path to create.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// JSON records, one per line (default stream: stdout)
    #[serde(default)]
    pub json: String,

    /// Human readable lines (default stream: stderr)
    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: String::new(),
            log: default_log(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.json.is_empty() && self.log.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "expected one of json or log output".into(),
            )));
        }
        Ok(())
    }
}

fn default_log() -> String {
    "-".to_string()
}
