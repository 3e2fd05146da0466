//! Player and host configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NuggetError;
use crate::interpreter::RetryPolicy;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nugget-quiz.toml";

/// Default feedback host port.
pub const DEFAULT_PORT: u16 = 8712;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// What happens when a learner answers a block twice.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Feedback host port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Feedback host bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            port: default_port(),
            bind: default_bind(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str, source: &Path) -> Result<Self, NuggetError> {
        toml::from_str(content).map_err(|source_err| NuggetError::Config {
            path: source.to_path_buf(),
            source: source_err,
        })
    }

    /// Load an explicit config file, or `nugget-quiz.toml` when it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, NuggetError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| NuggetError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content, &path)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
