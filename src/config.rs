use crate::error::{DirectoryError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inputs: InputConfig,
    pub outputs: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Tab-delimited country headquarters roster (mandatory source).
    pub roster_file: PathBuf,
    /// Folder of per-group contact files (individual files are optional).
    pub contacts_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// Subdirectory of `output_dir` holding the per-identity matrices.
    pub matrix_subdir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: InputConfig::default(),
            outputs: OutputConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            roster_file: PathBuf::from("data/country_hq.txt"),
            contacts_dir: PathBuf::from("data/contacts"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            matrix_subdir: "email_matrices".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DirectoryError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn matrix_dir(&self) -> PathBuf {
        self.outputs.output_dir.join(&self.outputs.matrix_subdir)
    }
}
