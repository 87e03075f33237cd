//! Configuration types and parsing for sqlmatrix.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`Config::load_from_dir`]
pub const CONFIG_FILE_NAME: &str = "sqlmatrix.yml";

/// Project configuration from sqlmatrix.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directories searched for test definition files
    #[serde(default = "default_definition_paths")]
    pub definition_paths: Vec<String>,

    /// Upper bound on the number of test cases a single matrix may produce
    #[serde(default = "default_max_combinations")]
    pub max_combinations: u64,

    /// Timeout in seconds for definitions without a positive MaxExecutionTime
    #[serde(default = "default_timeout")]
    pub default_timeout: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definition_paths: default_definition_paths(),
            max_combinations: default_max_combinations(),
            default_timeout: default_timeout(),
        }
    }
}

fn default_definition_paths() -> Vec<String> {
    vec!["tests".to_string()]
}

fn default_max_combinations() -> u64 {
    100_000
}

fn default_timeout() -> u32 {
    30
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// A missing sqlmatrix.yml is not an error; defaults are used instead.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.definition_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one definition_paths entry must be specified".to_string(),
            });
        }
        if let Some(blank) = self.definition_paths.iter().find(|p| p.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("definition_paths contains a blank entry '{blank}'"),
            });
        }
        if self.max_combinations == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "max_combinations must be greater than 0".to_string(),
            });
        }
        if self.default_timeout == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "default_timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Get absolute definition paths relative to a project root
    pub fn definition_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.definition_paths.iter().map(|p| root.join(p)).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
