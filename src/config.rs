use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main extractor configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Page fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Minimum-quality gate thresholds
    #[serde(default)]
    pub gate: GateConfig,
    /// Order in which extraction strategies are tried
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
    /// Plugin adapter settings
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            gate: GateConfig::default(),
            strategies: default_strategies(),
            plugins: PluginsConfig::default(),
        }
    }
}

/// Configuration for the page fetch
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    /// A zero timeout would fail every request, so it reads as one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Thresholds a candidate must clear to be accepted
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    #[serde(default = "default_minimum")]
    pub min_ingredients: usize,
    /// Counts instruction steps only; section headers do not count
    #[serde(default = "default_minimum")]
    pub min_steps: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_ingredients: default_minimum(),
            min_steps: default_minimum(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PluginsConfig {
    /// Adapter names removed from the registry, e.g. `["cooked"]`
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// The extraction strategies, in their default priority order
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    StructuredData,
    Plugin,
    Generic,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::StructuredData => "structured_data",
            StrategyKind::Plugin => "plugin",
            StrategyKind::Generic => "generic",
        })
    }
}

// Default value functions
fn default_strategies() -> Vec<StrategyKind> {
    vec![
        StrategyKind::StructuredData,
        StrategyKind::Plugin,
        StrategyKind::Generic,
    ]
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; CrumbBot/1.0)".to_string()
}

fn default_minimum() -> usize {
    3
}

impl ExtractorConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CRUMB__ prefix
    /// 2. crumb.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: CRUMB__FETCH__TIMEOUT_SECS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from `crumb.toml` and `CRUMB__`-prefixed environment variables
pub fn load_config() -> Result<ExtractorConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("crumb").required(false))
        // Use double underscore for nested: CRUMB__GATE__MIN_STEPS
        .add_source(
            Environment::with_prefix("CRUMB")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("strategies")
                .with_list_parse_key("plugins.disabled")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ExtractorConfig::default();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.gate.min_ingredients, 3);
        assert_eq!(config.gate.min_steps, 3);
        assert_eq!(
            config.strategies,
            vec![
                StrategyKind::StructuredData,
                StrategyKind::Plugin,
                StrategyKind::Generic
            ]
        );
        assert!(config.plugins.disabled.is_empty());
    }

    #[test]
    fn test_zero_timeout_is_one_second() {
        let fetch = FetchConfig {
            timeout_secs: 0,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                strategies = ["plugin", "generic"]

                [gate]
                min_steps = 2

                [plugins]
                disabled = ["cooked"]
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: ExtractorConfig = settings.try_deserialize().unwrap();

        assert_eq!(
            config.strategies,
            vec![StrategyKind::Plugin, StrategyKind::Generic]
        );
        assert_eq!(config.gate.min_steps, 2);
        assert_eq!(config.gate.min_ingredients, 3);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.plugins.disabled, vec!["cooked".to_string()]);
    }

    #[test]
    fn test_load_config_without_file() {
        // No crumb.toml in the test working directory; every field defaults.
        let result = load_config();
        assert!(result.is_ok());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(StrategyKind::StructuredData.to_string(), "structured_data");
    }
}
