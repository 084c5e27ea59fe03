//! Storefront configuration from environment variables.

use thiserror::Error;

use phytoshop_core::Money;
use phytoshop_core::money::CURRENCY_LABEL;
use phytoshop_observability::LogFormat;
use phytoshop_orders::{DEFAULT_CITY, DEFAULT_DELIVERY_FEE};

pub const ENV_DELIVERY_FEE: &str = "PHYTOSHOP_DELIVERY_FEE";
pub const ENV_DEFAULT_CITY: &str = "PHYTOSHOP_DEFAULT_CITY";
pub const ENV_CURRENCY_LABEL: &str = "PHYTOSHOP_CURRENCY_LABEL";
pub const ENV_LOG_FORMAT: &str = "PHYTOSHOP_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of francs, got {value:?}")]
    InvalidAmount { var: &'static str, value: String },

    #[error("{var} cannot be blank")]
    Blank { var: &'static str },

    #[error("{var}: {reason}")]
    InvalidLogFormat { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub delivery_fee: Money,
    pub default_city: String,
    pub currency_label: String,
    pub log_format: LogFormat,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            default_city: DEFAULT_CITY.to_string(),
            currency_label: CURRENCY_LABEL.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

fn non_blank(var: &'static str, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Blank { var });
    }
    Ok(trimmed.to_string())
}

fn amount(var: &'static str, raw: String) -> Result<Money, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Money::from_francs)
        .map_err(|_| ConfigError::InvalidAmount { var, value: raw })
}

fn log_format(var: &'static str, raw: String) -> Result<LogFormat, ConfigError> {
    raw.parse()
        .map_err(|reason| ConfigError::InvalidLogFormat { var, reason })
}

impl StorefrontConfig {
    /// Read from the process environment, falling back to defaults for unset
    /// or invalid values (invalid ones are logged).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lenient variant over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let warn = |err: ConfigError| {
            tracing::warn!(error = %err, "ignoring invalid configuration value");
        };

        if let Some(raw) = lookup(ENV_DELIVERY_FEE) {
            match amount(ENV_DELIVERY_FEE, raw) {
                Ok(fee) => config.delivery_fee = fee,
                Err(err) => warn(err),
            }
        }
        if let Some(raw) = lookup(ENV_DEFAULT_CITY) {
            match non_blank(ENV_DEFAULT_CITY, raw) {
                Ok(city) => config.default_city = city,
                Err(err) => warn(err),
            }
        }
        if let Some(raw) = lookup(ENV_CURRENCY_LABEL) {
            match non_blank(ENV_CURRENCY_LABEL, raw) {
                Ok(label) => config.currency_label = label,
                Err(err) => warn(err),
            }
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            match log_format(ENV_LOG_FORMAT, raw) {
                Ok(format) => config.log_format = format,
                Err(err) => warn(err),
            }
        }

        config
    }

    /// Strict variant: the first invalid value is an error.
    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            delivery_fee: lookup(ENV_DELIVERY_FEE)
                .map(|raw| amount(ENV_DELIVERY_FEE, raw))
                .transpose()?
                .unwrap_or(defaults.delivery_fee),
            default_city: lookup(ENV_DEFAULT_CITY)
                .map(|raw| non_blank(ENV_DEFAULT_CITY, raw))
                .transpose()?
                .unwrap_or(defaults.default_city),
            currency_label: lookup(ENV_CURRENCY_LABEL)
                .map(|raw| non_blank(ENV_CURRENCY_LABEL, raw))
                .transpose()?
                .unwrap_or(defaults.currency_label),
            log_format: lookup(ENV_LOG_FORMAT)
                .map(|raw| log_format(ENV_LOG_FORMAT, raw))
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }

    /// Price as shown to shoppers, e.g. `12 500 FC`.
    pub fn format_price(&self, amount: Money) -> String {
        format!("{} {}", amount.grouped(), self.currency_label)
    }
}
