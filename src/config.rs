use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

use crate::errors::SettlementError;

const DEFAULT_SELLER_COUNTRY: &str = "Pakistan";
const DEFAULT_CURRENCY: &str = "PKR";
const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;
const CONFIG_DIR: &str = "config";

/// Settlement engine configuration.
///
/// Loaded from an optional `config/settlement.toml` file with `BAZAAR_*`
/// environment variables layered on top.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Country used for payment-registry lookups when a seller has no country
    /// on record. A deliberate fallback so a misconfigured seller does not
    /// block checkout; the resolver logs it and marks the context.
    #[serde(default = "default_seller_country")]
    #[validate(length(min = 1, message = "default seller country must not be empty"))]
    pub default_seller_country: String,

    /// ISO currency code stamped on order submissions.
    #[serde(default = "default_currency")]
    #[validate(length(min = 3, max = 3, message = "currency must be a 3-letter code"))]
    pub currency: String,

    /// Capacity of the checkout event channel.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

fn default_seller_country() -> String {
    DEFAULT_SELLER_COUNTRY.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_seller_country: default_seller_country(),
            currency: default_currency(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `config/settlement.toml` (if present) and the
    /// `BAZAAR_*` environment, then validates it.
    pub fn load() -> Result<Self, SettlementError> {
        let mut builder = Config::builder();

        let file = Path::new(CONFIG_DIR).join("settlement");
        builder = builder.add_source(File::with_name(&file.to_string_lossy()).required(false));
        builder = builder.add_source(Environment::with_prefix("BAZAAR"));

        let config: AppConfig = builder
            .build()
            .map_err(|e| SettlementError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SettlementError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }
}
