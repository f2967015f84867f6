//! Configuration file support
//!
//! A TOML file naming the default target directory and the normalization
//! options. Everything is optional:
//!
//! ```toml
//! target_dir = "assets/icons"
//!
//! [normalize]
//! prefix_ids = true
//! strip_metadata = true
//! accessibility = true
//! preserve_aspect_ratio = "xMidYMid meet"
//! bbox_overrides_viewbox = false
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::NormalizeOptions;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory normalized when no paths are given on the command line
    pub target_dir: Option<PathBuf>,
    pub normalize: NormalizeOptions,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A relative `target_dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = content.parse()?;
        if let (Some(dir), Some(base)) = (&config.target_dir, path.parent()) {
            if dir.is_relative() {
                config.target_dir = Some(base.join(dir));
            }
        }
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}
