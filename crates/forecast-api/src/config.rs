//! Service configuration

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use forecast_lib::predictor::ForestConfig;
use forecast_lib::{EngineConfig, StrategyKind};
use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Forecasting strategy name (`trend`, `ensemble`, `linear` or an alias)
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Trees grown by the ensemble strategy
    #[serde(default = "default_forest_trees")]
    pub forest_trees: usize,

    /// Bootstrap seed for the ensemble strategy
    #[serde(default = "default_forest_seed")]
    pub forest_seed: u64,

    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_strategy() -> String {
    StrategyKind::default().as_str().to_string()
}

fn default_forest_trees() -> usize {
    100
}

fn default_forest_seed() -> u64 {
    42
}

fn default_service_name() -> String {
    "carecast".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            strategy: default_strategy(),
            forest_trees: default_forest_trees(),
            forest_seed: default_forest_seed(),
            service_name: default_service_name(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional `carecast.*` file and `CARECAST_*` environment
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("carecast").required(false))
            .add_source(config::Environment::with_prefix("CARECAST").try_parsing(true));
        Self::from_builder(builder)
    }

    /// Build and validate from an already-assembled set of sources
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.strategy_kind()?;
        Ok(config)
    }

    pub fn strategy_kind(&self) -> Result<StrategyKind> {
        self.strategy
            .parse()
            .with_context(|| format!("Invalid strategy `{}`", self.strategy))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            strategy: self.strategy_kind()?,
            forest: ForestConfig {
                n_trees: self.forest_trees,
                seed: self.forest_seed,
                ..ForestConfig::default()
            },
            ..EngineConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_json(json: &str) -> Result<ServiceConfig> {
        ServiceConfig::from_builder(
            config::Config::builder().add_source(File::from_str(json, FileFormat::Json)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_json("{}").unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.address(), "0.0.0.0:5000");
        assert_eq!(config.strategy_kind().unwrap(), StrategyKind::Trend);
        assert_eq!(config.service_name, "carecast");

        let engine = config.to_engine_config().unwrap();
        assert_eq!(engine.forest.n_trees, 100);
        assert_eq!(engine.forest.seed, 42);
    }

    #[test]
    fn test_overrides() {
        let config = from_json(
            r#"{"port": 8080, "strategy": "random_forest", "forest_trees": 25, "forest_seed": 7}"#,
        )
        .unwrap();
        let engine = config.to_engine_config().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(engine.strategy, StrategyKind::Ensemble);
        assert_eq!(engine.forest.n_trees, 25);
        assert_eq!(engine.forest.seed, 7);
    }

    #[test]
    fn test_unknown_strategy_fails() {
        let err = from_json(r#"{"strategy": "crystal_ball"}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("crystal_ball"));
    }

    #[test]
    fn test_invalid_port_fails() {
        assert!(from_json(r#"{"port": "not-a-port"}"#).is_err());
    }
}
