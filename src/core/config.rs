use crate::core::currency::CurrencyCode;
use crate::core::quote::Rounding;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSourceKind {
    #[default]
    Yahoo,
    Static,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateEntry {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Seconds a fetched rate is reused before it is looked up again. Zero
    /// disables caching.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_max_age_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_age_secs: default_max_age_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub rate_source: RateSourceKind,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxq", "fxq")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_BASE_URL, |p| &p.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
rate_source: static
rounding:
  decimal_places: 4
rates:
  - from: EUR
    to: GBP
    rate: 0.9
  - from: gbp
    to: usd
    rate: "1.6"
cache:
  max_age_secs: 60
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.rate_source, RateSourceKind::Static);
        assert_eq!(config.rounding.decimal_places, 4);
        assert_eq!(config.rates.len(), 2);
        assert_eq!(config.rates[0].from.as_str(), "EUR");
        assert_eq!(config.rates[0].rate, dec!(0.9));
        assert_eq!(config.rates[1].to.as_str(), "USD");
        assert_eq!(config.rates[1].rate, dec!(1.6));
        assert_eq!(config.cache.max_age_secs, 60);
        assert_eq!(config.yahoo_base_url(), DEFAULT_YAHOO_BASE_URL);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.rate_source, RateSourceKind::Yahoo);
        assert_eq!(config.rounding, Rounding::default());
        assert_eq!(config.rounding.decimal_places, 2);
        assert!(config.rates.is_empty());
        assert_eq!(config.cache.max_age_secs, 300);

        let yaml_with_providers = r#"
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_with_providers).unwrap();
        assert_eq!(config.yahoo_base_url(), "http://example.com/yahoo");
    }

    #[test]
    fn test_config_rejects_invalid_currency() {
        let yaml_str = r#"
rates:
  - from: EURO
    to: GBP
    rate: 0.9
"#;
        let err = serde_yaml::from_str::<AppConfig>(yaml_str).unwrap_err();
        assert!(err.to_string().contains("Invalid currency code"));
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "rate_source: static\n")?;

        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.rate_source, RateSourceKind::Static);

        let missing = AppConfig::load_from_path(file.path().with_extension("missing"));
        assert!(missing.unwrap_err().to_string().contains("Failed to read config file"));
        Ok(())
    }
}
