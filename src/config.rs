use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// configuration stored in a TOML file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// how to reach the repository
    #[serde(default)]
    pub git: GitConfig,
    /// browsing defaults
    #[serde(default)]
    pub browse: BrowseConfig,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// load config from file if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

/// `[git]` section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// git executable
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// repository path; the command line wins over this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_dir: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            git_dir: None,
        }
    }
}

/// `[browse]` section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// revision shown when none is given
    #[serde(default = "default_ref")]
    pub default_ref: String,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            default_ref: default_ref(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("git")
}

fn default_ref() -> String {
    "master".to_string()
}
