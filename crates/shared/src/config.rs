//! Application configuration management.
//!
//! Besides server and database settings this carries the read-only settings
//! snapshot the engine consumes: base currency, default VAT rate, and the
//! reconciliation matching thresholds. None of these are hard-coded in the
//! engine itself.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger settings snapshot.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Reconciliation matching thresholds.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger settings snapshot supplied by the settings subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Base currency code (ISO 4217).
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Default VAT rate as a fraction (e.g. 0.11 for 11%). Consumed by
    /// upstream event adapters when they build entry payloads; the engine
    /// performs no tax computation.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_vat_rate() -> Decimal {
    Decimal::new(11, 2)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            default_vat_rate: default_vat_rate(),
        }
    }
}

/// Reconciliation matching thresholds.
///
/// Defaults are reasonable, not contractual; every deployment may tune them.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Date window (in days, each side) for exact matches.
    #[serde(default = "default_exact_window")]
    pub exact_date_window_days: i64,
    /// Date window (in days, each side) for fuzzy matches.
    #[serde(default = "default_fuzzy_window")]
    pub fuzzy_date_window_days: i64,
    /// Minimum reference/description token overlap for an exact match,
    /// as a fraction in [0, 1].
    #[serde(default = "default_token_overlap")]
    pub token_overlap_threshold: Decimal,
}

fn default_exact_window() -> i64 {
    3
}

fn default_fuzzy_window() -> i64 {
    14
}

fn default_token_overlap() -> Decimal {
    Decimal::new(5, 1)
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            exact_date_window_days: default_exact_window(),
            fuzzy_date_window_days: default_fuzzy_window(),
            token_overlap_threshold: default_token_overlap(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciliation_defaults() {
        let cfg = ReconciliationConfig::default();
        assert_eq!(cfg.exact_date_window_days, 3);
        assert_eq!(cfg.fuzzy_date_window_days, 14);
        assert_eq!(cfg.token_overlap_threshold, dec!(0.5));
    }

    #[test]
    fn test_ledger_defaults() {
        let cfg = LedgerConfig::default();
        assert_eq!(cfg.base_currency, "USD");
        assert_eq!(cfg.default_vat_rate, dec!(0.11));
    }
}
