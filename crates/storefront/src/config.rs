//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CHECKOUT_CARD_PROCESSING_SECS` - Simulated card processing delay (default: 10)
//! - `CHECKOUT_TAX_RATE` - Tax rate on the checkout page and persisted orders (default: 0.08)
//! - `CART_TAX_RATE` - Tax rate in the cart summary (default: 0.10)
//! - `CATALOG_CACHE_TTL_SECS` - Product and bank-details cache TTL (default: 300)
//! - `SESSION_IDLE_MINUTES` - Idle time before a shopper's state is dropped (default: 60, at most 30 days)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sable_core::PricingRules;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Longest accepted session idle timeout (30 days).
pub const MAX_SESSION_IDLE_MINUTES: u64 = 30 * 24 * 60;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// How long a simulated card payment "processes" before failing
    pub card_processing_delay: Duration,
    /// Tax rate for the checkout surface
    pub checkout_tax_rate: Decimal,
    /// Tax rate for the cart summary surface
    pub cart_tax_rate: Decimal,
    /// TTL for cached catalog reads
    pub catalog_cache_ttl: Duration,
    /// Idle time after which a shopper's cart and checkout are dropped
    pub session_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env
            .optional("STOREFRONT_DATABASE_URL")
            // Fallback set by managed Postgres attach
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

        let host = env.parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed_or("STOREFRONT_PORT", 3000_u16)?;

        let base_url = env.required("STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let card_processing_delay =
            Duration::from_secs(env.parsed_or("CHECKOUT_CARD_PROCESSING_SECS", 10_u64)?);
        let checkout_tax_rate = env.rate_or("CHECKOUT_TAX_RATE", PricingRules::checkout().tax_rate)?;
        let cart_tax_rate = env.rate_or("CART_TAX_RATE", PricingRules::cart_summary().tax_rate)?;
        let catalog_cache_ttl =
            Duration::from_secs(env.parsed_or("CATALOG_CACHE_TTL_SECS", 300_u64)?);
        let session_idle = env.minutes_or("SESSION_IDLE_MINUTES", 60)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            card_processing_delay,
            checkout_tax_rate,
            cart_tax_rate,
            catalog_cache_ttl,
            session_idle,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Pricing rules for the checkout page, placed orders and `/api/orders`.
    #[must_use]
    pub fn checkout_rules(&self) -> PricingRules {
        PricingRules::checkout().with_tax_rate(self.checkout_tax_rate)
    }

    /// Pricing rules for the cart summary.
    #[must_use]
    pub fn cart_rules(&self) -> PricingRules {
        PricingRules::cart_summary().with_tax_rate(self.cart_tax_rate)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// A whole number of minutes between 1 and [`MAX_SESSION_IDLE_MINUTES`].
    fn minutes_or(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        let minutes: u64 = self.parsed_or(key, default)?;
        if !(1..=MAX_SESSION_IDLE_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 1 and {MAX_SESSION_IDLE_MINUTES} minutes (got {minutes})"),
            ));
        }
        minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), "too large".to_string()))
    }

    /// A fractional rate in `[0, 1)`.
    fn rate_or(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        let rate: Decimal = self.parsed_or(key, default)?;
        if rate.is_sign_negative() || rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("rate must be between 0 and 1 (got {rate})"),
            ));
        }
        Ok(rate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("STOREFRONT_DATABASE_URL", "postgres://localhost/sable"),
        ("STOREFRONT_BASE_URL", "http://localhost:3000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.card_processing_delay, Duration::from_secs(10));
        assert_eq!(config.checkout_tax_rate, Decimal::new(8, 2));
        assert_eq!(config.cart_tax_rate, Decimal::new(10, 2));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.session_idle, Duration::from_secs(3600));
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_falls_back() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fallback/sable"),
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://fallback/sable"
        );
        assert!(config.is_secure());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("STOREFRONT_BASE_URL", "http://localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STOREFRONT_DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "postgres://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("STOREFRONT_PORT", "not-a-port"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let mut vars = MINIMAL.to_vec();
        vars.push(("CHECKOUT_TAX_RATE", "1.5"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let vars = [
            ("STOREFRONT_DATABASE_URL", "postgres://x"),
            ("STOREFRONT_BASE_URL", "not a url"),
        ];
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));
    }

    #[test]
    fn test_session_idle_bounds() {
        for bad in ["0", "43201", "18446744073709551615"] {
            let mut vars = MINIMAL.to_vec();
            vars.push(("SESSION_IDLE_MINUTES", bad));
            assert!(matches!(
                load(&vars),
                Err(ConfigError::InvalidEnvVar(key, _)) if key == "SESSION_IDLE_MINUTES"
            ));
        }

        let mut vars = MINIMAL.to_vec();
        vars.push(("SESSION_IDLE_MINUTES", "43200"));
        let config = load(&vars).unwrap();
        assert_eq!(config.session_idle, Duration::from_secs(30 * 24 * 3600));
    }

    #[test]
    fn test_overrides_flow_into_pricing_rules() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("CHECKOUT_TAX_RATE", "0.07"));
        vars.push(("CART_TAX_RATE", "0"));
        vars.push(("CHECKOUT_CARD_PROCESSING_SECS", "2"));
        let config = load(&vars).unwrap();

        assert_eq!(config.checkout_rules().tax_rate, Decimal::new(7, 2));
        assert_eq!(config.cart_rules().tax_rate, Decimal::ZERO);
        assert_eq!(config.card_processing_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://user:hunter2@db/sable"),
            ("STOREFRONT_BASE_URL", "http://localhost"),
        ])
        .unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
