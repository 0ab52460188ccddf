use crate::error::{ConfigError, CostctlError, Result};
use crate::pricing::DEFAULT_REGION;
use crate::state::StateStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LOCAL_CONFIG_FILE: &str = ".costctl.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// JSON pricing catalog replacing the built-in one
    pub catalog: Option<PathBuf>,
    /// Region for a fresh estimate
    pub default_region: String,
    /// Currency override for a fresh estimate; the region's currency when unset
    pub default_currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            catalog: None,
            default_region: DEFAULT_REGION.to_string(),
            default_currency: None,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Explicit path, else `.costctl.toml` in the current dir, else
    /// `~/.config/costctl/config.toml`. Missing files give the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path(),
        };

        if !config_path.exists() {
            if path.is_some() {
                warn!(
                    "Config file not found: {}, using defaults. Run 'costctl init' to create one.",
                    config_path.display()
                );
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!(
                "{}: {}\n  Tip: Run 'costctl init' to create a new config file",
                config_path.display(),
                e
            ))
        })?;
        config.validate()?;
        debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            local
        } else {
            dirs::config_dir()
                .map(|d| d.join("costctl").join("config.toml"))
                .unwrap_or(local)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pricing.default_region.trim().is_empty() {
            return Err(ConfigError::MissingField("pricing.default_region".to_string()).into());
        }
        if let Some(currency) = &self.pricing.default_currency {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::InvalidValue {
                    field: "pricing.default_currency".to_string(),
                    reason: format!("expected a 3-letter currency code, got: {}", currency),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::new(
            self.storage
                .state_file
                .clone()
                .unwrap_or_else(StateStore::default_path),
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CostctlError::from(ConfigError::ParseError(e.to_string())))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    Config::default().save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
