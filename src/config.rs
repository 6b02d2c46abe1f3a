use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::error::{Result, ScraperError};
use crate::fetch::RetryPolicy;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub marketplace: MarketplaceConfig,
    pub fx: FxConfig,
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub endpoint: String,
    pub provider: String,
    pub base_currency: String,
    pub target_currency: String,
    pub fallback_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub price_limit: f64,
    pub pacing_ms: u64,
    pub max_attempts: u32,
    pub backoff_unit_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_suffix: String,
    /// Category mirrored to a historically named file; empty disables it.
    pub legacy_slug: String,
    pub legacy_file_stem: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: constants::BASE_URL.to_string(),
            user_agent: constants::USER_AGENT.to_string(),
        }
    }
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::FX_ENDPOINT.to_string(),
            provider: constants::FX_PROVIDER.to_string(),
            base_currency: constants::BASE_CURRENCY.to_string(),
            target_currency: constants::TARGET_CURRENCY.to_string(),
            fallback_rate: constants::FALLBACK_USD_TO_AZN,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            price_limit: constants::PRICE_LIMIT_AZN,
            pacing_ms: constants::CATEGORY_PACING_MS,
            max_attempts: constants::FETCH_MAX_ATTEMPTS,
            backoff_unit_ms: constants::FETCH_BACKOFF_UNIT_MS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::OUTPUT_DIR),
            file_suffix: constants::FILE_SUFFIX.to_string(),
            legacy_slug: constants::LEGACY_SLUG.to_string(),
            legacy_file_stem: constants::LEGACY_FILE_STEM.to_string(),
        }
    }
}

impl Config {
    /// Loads from `path`, else `config.toml` if it exists, else defaults.
    /// `SKINS_OUTPUT_DIR` and `SKINS_PRICE_LIMIT` override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("SKINS_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output.dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(limit) = std::env::var("SKINS_PRICE_LIMIT") {
            self.harvest.price_limit = limit.trim().parse().map_err(|e| {
                ScraperError::Config(format!("SKINS_PRICE_LIMIT '{}' is not a number: {}", limit, e))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.harvest.price_limit.is_finite() && self.harvest.price_limit > 0.0) {
            return Err(ScraperError::Config(format!(
                "price_limit must be a positive number, got {}",
                self.harvest.price_limit
            )));
        }
        if !(self.fx.fallback_rate.is_finite() && self.fx.fallback_rate > 0.0) {
            return Err(ScraperError::Config(format!(
                "fallback_rate must be a positive number, got {}",
                self.fx.fallback_rate
            )));
        }
        if self.harvest.max_attempts == 0 {
            return Err(ScraperError::Config("max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn discovery_url(&self) -> String {
        format!("{}/", self.marketplace.base_url.trim_end_matches('/'))
    }

    pub fn category_url(&self, slug: &str) -> String {
        format!(
            "{}/{}/{}",
            self.marketplace.base_url.trim_end_matches('/'),
            constants::WEAPONS_PATH,
            slug
        )
    }

    pub fn fx_url(&self) -> String {
        format!(
            "{}?from={}&to={}",
            self.fx.endpoint, self.fx.base_currency, self.fx.target_currency
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.harvest.max_attempts,
            backoff_unit: Duration::from_millis(self.harvest.backoff_unit_ms),
            retryable_status: constants::RATE_LIMITED_STATUS,
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.harvest.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.discovery_url(), "https://csgoskins.gg/");
        assert_eq!(config.category_url("ak-47"), "https://csgoskins.gg/weapons/ak-47");
        assert_eq!(
            config.fx_url(),
            "https://api.frankfurter.app/latest?from=USD&to=AZN"
        );
        assert_eq!(config.harvest.price_limit, 20.0);
        assert_eq!(config.retry_policy().max_attempts, 4);
        assert_eq!(config.pacing(), Duration::from_millis(220));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            [harvest]
            price_limit = 35.5

            [output]
            dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.harvest.price_limit, 35.5);
        assert_eq!(config.harvest.pacing_ms, 220);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.file_suffix, "under-20-azn");
        assert_eq!(config.fx.target_currency, "AZN");
    }

    #[test]
    fn rejects_non_positive_limit() {
        let mut config = Config::default();
        config.harvest.price_limit = 0.0;
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut config = Config::default();
        config.harvest.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
