//! Configuration module for sales-service.

use chrono_tz::Tz;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::models::MonthWindow;
use crate::services::AggregationSettings;

#[derive(Debug, Clone)]
pub struct SalesConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub aggregation: AggregationSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl SalesConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "sales-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?,
                max_connections: parse_pool_size(
                    "DATABASE_MAX_CONNECTIONS",
                    env::var("DATABASE_MAX_CONNECTIONS").ok().as_deref(),
                    10,
                )?,
                min_connections: parse_pool_size(
                    "DATABASE_MIN_CONNECTIONS",
                    env::var("DATABASE_MIN_CONNECTIONS").ok().as_deref(),
                    2,
                )?,
            },
            aggregation: parse_aggregation(
                env::var("SALES_TIMEZONE").ok().as_deref(),
                env::var("SALES_MONTH_WINDOW").ok().as_deref(),
            )?,
        })
    }
}

/// Parse a pool size variable. Unset or blank keeps `default`.
pub fn parse_pool_size(name: &str, raw: Option<&str>, default: u32) -> Result<u32, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid {} '{}': {}", name, value, e))
        }),
        None => Ok(default),
    }
}

/// Build aggregation settings from the raw `SALES_TIMEZONE` and
/// `SALES_MONTH_WINDOW` values. Unset means UTC and a rolling month.
pub fn parse_aggregation(
    timezone: Option<&str>,
    month_window: Option<&str>,
) -> Result<AggregationSettings, AppError> {
    let timezone = match timezone.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.parse::<Tz>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid SALES_TIMEZONE '{}': {}", name, e))
        })?,
        None => Tz::UTC,
    };

    let month_window = match month_window.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .to_ascii_lowercase()
            .parse::<MonthWindow>()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid SALES_MONTH_WINDOW: {}", e)))?,
        None => MonthWindow::Rolling,
    };

    Ok(AggregationSettings {
        timezone,
        month_window,
    })
}
