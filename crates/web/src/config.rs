//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CAFE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CAFE_BASE_URL` - Public URL of the site; `https://` turns on secure cookies
//!
//! ## Optional
//! - `CAFE_HOST` - Bind address (default: 127.0.0.1)
//! - `CAFE_PORT` - Listen port (default: 3000)
//! - `CAFE_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.05)
//! - `CAFE_DELIVERY_FEE` - Flat fee for delivery orders (default: 30)
//! - `CAFE_CURRENCY_SYMBOL` - Prefix used when displaying money (default: ₹)
//! - `CAFE_DEFAULT_COUNTRY_CODE` - Dialling code for bare 10-digit phone numbers (default: 91)
//! - `CAFE_MENU_EDITOR_ROLE` - Lowest owner role allowed to edit the menu (default: staff)
//! - `CAFE_TRUST_PROXY_HEADERS` - Key rate limits on `X-Forwarded-For`/`X-Real-IP`
//!   instead of the peer address. Only set behind a proxy that overwrites them (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use cafe_core::{OwnerRole, PricingConfig};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct CafeConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Checkout tax rate and delivery fee
    pub pricing: PricingConfig,
    pub currency_symbol: String,
    /// Digits only, without the leading `+`
    pub default_country_code: String,
    /// Lowest role that may create, edit or delete menu items
    pub menu_editor_role: OwnerRole,
    /// Whether client IPs come from proxy headers rather than the socket peer
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl CafeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value is invalid.
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(vars);

        let database_url = env
            .optional("CAFE_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("CAFE_DATABASE_URL".to_string()))?;

        let host = env.parse_or("CAFE_HOST", "127.0.0.1")?;
        let port = env.parse_or("CAFE_PORT", "3000")?;
        let base_url = parse_base_url(&env.required("CAFE_BASE_URL")?)?;

        let tax_rate: Decimal = env.parse_or("CAFE_TAX_RATE", "0.05")?;
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(invalid("CAFE_TAX_RATE", "must be between 0 and 1"));
        }
        let delivery_fee: Decimal = env.parse_or("CAFE_DELIVERY_FEE", "30")?;
        if delivery_fee.is_sign_negative() {
            return Err(invalid("CAFE_DELIVERY_FEE", "cannot be negative"));
        }

        let currency_symbol = env.or_default("CAFE_CURRENCY_SYMBOL", "₹");
        let default_country_code = env.or_default("CAFE_DEFAULT_COUNTRY_CODE", "91");
        if default_country_code.is_empty()
            || default_country_code.len() > 3
            || !default_country_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("CAFE_DEFAULT_COUNTRY_CODE", "must be 1-3 digits"));
        }

        let menu_editor_role = OwnerRole::parse(&env.or_default("CAFE_MENU_EDITOR_ROLE", "staff"))
            .ok_or_else(|| invalid("CAFE_MENU_EDITOR_ROLE", "must be staff, manager or admin"))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            pricing: PricingConfig {
                tax_rate,
                delivery_fee,
            },
            currency_symbol,
            default_country_code,
            menu_editor_role,
            trust_proxy_headers: env.parse_or("CAFE_TRUST_PROXY_HEADERS", "false")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Format an amount with the configured currency symbol.
    #[must_use]
    pub fn money(&self, amount: Decimal) -> String {
        cafe_core::format_money(amount, &self.currency_symbol)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating an empty value as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, &e.to_string()))
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Validate the base URL and strip any trailing slash.
fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid("CAFE_BASE_URL", &e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("CAFE_BASE_URL", "must be an http or https URL"));
    }
    if url.host_str().is_none() {
        return Err(invalid("CAFE_BASE_URL", "must have a host"));
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
impl CafeConfig {
    /// Defaults for unit and router tests; nothing connects to this database.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn for_tests() -> Self {
        Self::from_vars(&|key| match key {
            "CAFE_DATABASE_URL" => Some("postgres://localhost/cafe_test".to_string()),
            "CAFE_BASE_URL" => Some("http://localhost:3000".to_string()),
            _ => None,
        })
        .unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<CafeConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CafeConfig::from_vars(&|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("CAFE_DATABASE_URL", "postgres://localhost/cafe"),
        ("CAFE_BASE_URL", "http://localhost:3000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.default_country_code, "91");
        assert_eq!(config.menu_editor_role, OwnerRole::Staff);
        assert!(!config.secure_cookies());
        assert!(config.sentry_dsn.is_none());
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn test_trust_proxy_headers_flag() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CAFE_TRUST_PROXY_HEADERS", "true"));
        assert!(load(&pairs).unwrap().trust_proxy_headers);

        pairs.pop();
        pairs.push(("CAFE_TRUST_PROXY_HEADERS", "yes"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fallback/cafe"),
            ("CAFE_BASE_URL", "https://cafe.example"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/cafe");
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[("CAFE_BASE_URL", "http://localhost:3000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "CAFE_DATABASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[
            ("CAFE_DATABASE_URL", "postgres://localhost/cafe"),
            ("CAFE_BASE_URL", "ftp://cafe.example"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "CAFE_BASE_URL"));
    }

    #[test]
    fn test_pricing_overrides() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CAFE_TAX_RATE", "0.18"));
        pairs.push(("CAFE_DELIVERY_FEE", "49.5"));
        let config = load(&pairs).unwrap();
        assert_eq!(config.pricing.tax_rate, Decimal::new(18, 2));
        assert_eq!(config.pricing.delivery_fee, Decimal::new(495, 1));
    }

    #[test]
    fn test_rejects_out_of_range_tax() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CAFE_TAX_RATE", "5"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn test_rejects_unknown_editor_role() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CAFE_MENU_EDITOR_ROLE", "owner"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn test_rejects_bad_country_code() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CAFE_DEFAULT_COUNTRY_CODE", "+91"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn test_money_uses_symbol() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.money(Decimal::new(261, 0)), "₹261.00");
    }

    #[test]
    fn test_socket_addr() {
        let config = load(MINIMAL).unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
