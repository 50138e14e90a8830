use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tessel_kernel_polygon::BooleanSettings;
use tessel_slicer::SliceSettings;
use tracing::info;

/// Settings file contents: one table per command.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub boolean: BooleanSettings,
    pub slice: SliceSettings,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let string = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = Self::parse(&string).with_context(|| format!("in {}", path.display()))?;
        info!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Load `path` if given and present, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(string: &str) -> Result<Self> {
        let config: Self = toml::from_str(string)?;
        config.boolean.validate()?;
        config.slice.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}
