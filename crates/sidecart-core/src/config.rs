//! # Pricing Configuration
//!
//! Process-wide pricing settings: currency rounding, display mode and how
//! line discounts treat add-ons.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SIDECART_TAX_MODE=inclusive                                        │
//! │     SIDECART_ROUNDING=0.05                                             │
//! │     SIDECART_DISCOUNT_SCOPE=whole_line                                 │
//! │     SIDECART_CURRENCY=CHF                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/sidecart-pos/pricing.toml (Linux)                        │
//! │     ~/Library/Application Support/com.sidecart.pos/pricing.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     EUR, 0.01, exclusive, product_only                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricing.toml
//! tax_mode = "inclusive"          # exclusive | inclusive
//! discount_scope = "product_only" # product_only | whole_line
//!
//! [currency]
//! code = "CHF"
//! rounding = "0.05"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::Rounding;
use crate::pricing::DiscountScope;
use crate::types::TaxMode;
use crate::validation::parse_decimal;

// =============================================================================
// Currency Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code, informational only.
    #[serde(default = "default_currency_code")]
    pub code: String,

    /// Smallest step every monetary output is rounded to.
    #[serde(default)]
    pub rounding: Rounding,
}

fn default_currency_code() -> String {
    "EUR".to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            rounding: Rounding::default(),
        }
    }
}

// =============================================================================
// Main Pricing Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Which price a line displays.
    #[serde(default)]
    pub tax_mode: TaxMode,

    /// What a line discount applies to.
    #[serde(default)]
    pub discount_scope: DiscountScope,

    #[serde(default)]
    pub currency: CurrencySettings,
}

impl PricingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pricing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> CoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Pricing config saved");
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        let code = &self.currency.code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::InvalidConfig(format!(
                "currency code must be three uppercase letters, got: '{}'",
                code
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `SIDECART_*` overrides read through `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(mode) = lookup("SIDECART_TAX_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding tax mode from environment");
                    self.tax_mode = parsed;
                }
                Err(e) => warn!(mode = %mode, "Ignoring SIDECART_TAX_MODE: {}", e),
            }
        }

        if let Some(scope) = lookup("SIDECART_DISCOUNT_SCOPE") {
            match scope.parse() {
                Ok(parsed) => {
                    debug!(scope = %scope, "Overriding discount scope from environment");
                    self.discount_scope = parsed;
                }
                Err(e) => warn!(scope = %scope, "Ignoring SIDECART_DISCOUNT_SCOPE: {}", e),
            }
        }

        if let Some(raw) = lookup("SIDECART_ROUNDING") {
            match parse_decimal("rounding", &raw).and_then(Rounding::new) {
                Ok(rounding) => {
                    debug!(%rounding, "Overriding rounding from environment");
                    self.currency.rounding = rounding;
                }
                Err(e) => warn!(rounding = %raw, "Ignoring SIDECART_ROUNDING: {}", e),
            }
        }

        if let Some(code) = lookup("SIDECART_CURRENCY") {
            self.currency.code = code.trim().to_uppercase();
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "sidecart", "pos")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }

    pub fn rounding(&self) -> Rounding {
        self.currency.rounding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_mode, TaxMode::Exclusive);
        assert_eq!(config.discount_scope, DiscountScope::ProductOnly);
        assert_eq!(config.rounding(), Rounding::CENT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = PricingConfig::from_toml_str(
            r#"
            tax_mode = "total"
            discount_scope = "whole_line"

            [currency]
            code = "CHF"
            rounding = "0.05"
            "#,
        )
        .unwrap();

        assert_eq!(config.tax_mode, TaxMode::Inclusive);
        assert_eq!(config.discount_scope, DiscountScope::WholeLine);
        assert_eq!(config.rounding().precision(), dec!(0.05));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PricingConfig::from_toml_str("tax_mode = \"inclusive\"").unwrap();
        assert_eq!(config.currency, CurrencySettings::default());
    }

    #[test]
    fn test_rejects_zero_rounding() {
        let result = PricingConfig::from_toml_str("[currency]\nrounding = \"0\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_too_fine_rounding() {
        let result = PricingConfig::from_toml_str(
            "[currency]\nrounding = \"0.0000000000000000000000000001\"",
        );
        assert!(result.is_err());

        let mut config = PricingConfig::default();
        config.apply_overrides(|key| {
            (key == "SIDECART_ROUNDING").then(|| "0.0000000000000000000000000001".to_string())
        });
        assert_eq!(config.rounding(), Rounding::CENT);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SIDECART_TAX_MODE", "inclusive"),
            ("SIDECART_ROUNDING", "0.05"),
            ("SIDECART_DISCOUNT_SCOPE", "bogus"),
            ("SIDECART_CURRENCY", "chf"),
        ]
        .into_iter()
        .collect();

        let mut config = PricingConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.tax_mode, TaxMode::Inclusive);
        assert_eq!(config.rounding().precision(), dec!(0.05));
        assert_eq!(config.discount_scope, DiscountScope::ProductOnly);
        assert_eq!(config.currency.code, "CHF");
    }

    #[test]
    fn test_invalid_rounding_override_ignored() {
        let mut config = PricingConfig::default();
        config.apply_overrides(|key| (key == "SIDECART_ROUNDING").then(|| "-1".to_string()));
        assert_eq!(config.rounding(), Rounding::CENT);
    }

    #[test]
    fn test_validation() {
        let mut config = PricingConfig::default();
        config.currency.code = "euro".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("sidecart-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("pricing.toml");

        let mut config = PricingConfig::default();
        config.tax_mode = TaxMode::Inclusive;
        config.currency.rounding = Rounding::new(dec!(0.05)).unwrap();
        config.save(Some(path.clone())).unwrap();

        let loaded = PricingConfig::from_toml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
