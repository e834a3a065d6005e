use std::env;

use anyhow::Context;

use crate::gateway::iamport::IamportConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub iamport: IamportConfig,
    pub orders: OrderSweepConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
    pub refresh_expiry_hours: i64,
}

/// Controls the background purge of orders that never got paid.
#[derive(Debug, Clone, Copy)]
pub struct OrderSweepConfig {
    pub expiry_minutes: i64,
    pub interval_secs: u64,
}

impl Default for OrderSweepConfig {
    fn default() -> Self {
        Self {
            expiry_minutes: 30,
            interval_secs: 30 * 60,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            expiry_hours: parse_or("JWT_EXPIRY_HOURS", 24),
            refresh_expiry_hours: parse_or("JWT_REFRESH_EXPIRY_HOURS", 24 * 14),
        };

        let iamport = IamportConfig {
            base_url: env::var("IAMPORT_BASE_URL")
                .unwrap_or_else(|_| "https://api.iamport.kr".to_string()),
            api_key: env::var("IAMPORT_API_KEY").context("IAMPORT_API_KEY is not set")?,
            api_secret: env::var("IAMPORT_API_SECRET").context("IAMPORT_API_SECRET is not set")?,
        };

        let defaults = OrderSweepConfig::default();
        let orders = OrderSweepConfig {
            expiry_minutes: parse_or("ORDER_EXPIRY_MINUTES", defaults.expiry_minutes),
            interval_secs: parse_or("ORDER_SWEEP_INTERVAL_SECS", defaults.interval_secs),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt,
            iamport,
            orders,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
