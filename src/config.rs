//! TOML configuration: generation limits, check defaults, and log format.
//!
//! Every section and field is optional; a missing file or an empty document
//! yields [`Config::default`].
//!
//! ```toml
//! [generation]
//! max_attempts = 200000   # omit for the automatic budget
//! max_redraws = 64
//!
//! [check]
//! rounds = 0              # 0 = automatic round selection
//!
//! [logging]
//! format = "json"         # or "text"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::candidate::DEFAULT_MAX_REDRAWS;
use crate::error::{Error, Result};

/// Top-level configuration parsed from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The `[generation]` section: bounds on the draw loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Draw→test iterations before giving up. `None` scales with bit length.
    pub max_attempts: Option<u64>,
    /// Consecutive draws that may fail to fit a constraint.
    #[serde(default = "default_max_redraws")]
    pub max_redraws: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            max_attempts: None,
            max_redraws: default_max_redraws(),
        }
    }
}

fn default_max_redraws() -> u32 {
    DEFAULT_MAX_REDRAWS
}

/// The `[check]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Default Miller–Rabin rounds for `check`; 0 selects automatically.
    #[serde(default)]
    pub rounds: u32,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Parse and validate a TOML document.
pub fn parse_toml(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).map_err(|e| Error::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Load from `path`. A missing file yields defaults.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_toml(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.generation.max_attempts == Some(0) {
        return Err(Error::Config(
            "generation.max_attempts must be positive".into(),
        ));
    }
    if config.generation.max_redraws == 0 {
        return Err(Error::Config(
            "generation.max_redraws must be positive".into(),
        ));
    }
    Ok(())
}
