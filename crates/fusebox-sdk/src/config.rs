//! Shim configuration

use crate::error::{Result, SdkError};
use fusebox_core::{ExecutionSettings, Symbol};
use fusebox_runtime::DEFAULT_BACKEND_NAME;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the optional configuration file (extension resolved by `config`)
pub const DEFAULT_CONFIG_PATH: &str = "config/fusebox";

/// Configuration for a shim installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Backend the compiled runners target
    pub backend_name: String,

    /// Qualified symbol of the delegated fusion operator
    pub fusion_symbol: String,

    /// Settings handed to every runner at construction
    pub settings: ExecutionSettings,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            backend_name: DEFAULT_BACKEND_NAME.to_string(),
            fusion_symbol: "fusebox::FusionGroup".to_string(),
            settings: ExecutionSettings::default(),
        }
    }
}

impl ShimConfig {
    /// Load from `.env`, the default config file and `FUSEBOX_*` variables
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a config file (any format `config` understands) and the environment
    ///
    /// Nested keys use a double underscore, e.g. `FUSEBOX_SETTINGS__PRE_COMPILE=true`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().to_string();
        let config_result = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("FUSEBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build();

        let config = match config_result {
            Ok(cfg) => cfg.try_deserialize::<ShimConfig>()?,
            Err(e) => {
                tracing::info!("No usable config at {}, using defaults: {}", path, e);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML content
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ShimConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend_name.trim().is_empty() {
            return Err(SdkError::ConfigError("backend_name is empty".to_string()));
        }
        self.symbol()?;
        self.settings.validate()?;
        Ok(())
    }

    /// The fusion operator symbol
    pub fn symbol(&self) -> Result<Symbol> {
        Ok(Symbol::parse(&self.fusion_symbol)?)
    }

    pub fn with_backend_name(mut self, backend_name: impl Into<String>) -> Self {
        self.backend_name = backend_name.into();
        self
    }

    pub fn with_fusion_symbol(mut self, symbol: &Symbol) -> Self {
        self.fusion_symbol = symbol.to_qual_string();
        self
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }
}
