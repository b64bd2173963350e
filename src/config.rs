// configuration depuis l'environnement (.env chargé par dotenv dans main)

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub host: String,
    pub port: u16,
    /// Intervalle du tick de prix simulé (3600 = toutes les heures)
    pub price_tick_seconds: u64,
    /// IVA Costa Rica par défaut
    pub default_tax_rate: Decimal,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed_or("JWT_TTL_HOURS", 24)?,
            host: env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("APP_PORT", 8080)?,
            price_tick_seconds: non_zero("PRICE_TICK_SECONDS", parsed_or("PRICE_TICK_SECONDS", 3600)?)?,
            default_tax_rate: parsed_or("DEFAULT_TAX_RATE", Decimal::new(13, 0))?,
        })
    }

    /// Config minimale pour les tests (base SQLite en mémoire)
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            price_tick_seconds: 3600,
            default_tax_rate: Decimal::new(13, 0),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

// une période nulle ferait paniquer tokio::time::interval
fn non_zero(name: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid { name, value: value.to_string() });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let port: u16 = parsed_or("GOLD_LEDGER_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let err = required("GOLD_LEDGER_UNSET_SECRET").unwrap_err();
        assert_eq!(
            err.to_string(),
            "GOLD_LEDGER_UNSET_SECRET must be set in .env file"
        );
    }

    #[test]
    fn zero_tick_period_is_invalid() {
        assert!(matches!(
            non_zero("PRICE_TICK_SECONDS", 0),
            Err(ConfigError::Invalid { name: "PRICE_TICK_SECONDS", .. })
        ));
        assert_eq!(non_zero("PRICE_TICK_SECONDS", 60).unwrap(), 60);
    }
}
