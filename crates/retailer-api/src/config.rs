use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use retailer_core::settings::{ServiceSettings, ValidationMode};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!(
                "unknown store kind '{other}' (expected 'postgres' or 'memory')"
            )),
        }
    }
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub settings: ServiceSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so callers can supply
    /// values without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store = match var("RETAILER_STORE_KIND") {
            Some(kind) => kind.parse().context("invalid RETAILER_STORE_KIND")?,
            None => StoreKind::Postgres,
        };

        let database_url = var("DATABASE_URL").or_else(|| var("RETAILER_DATABASE_URL"));
        if store == StoreKind::Postgres && database_url.is_none() {
            bail!("DATABASE_URL (or RETAILER_DATABASE_URL) must be set for the postgres store");
        }

        let max_connections = match var("RETAILER_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid RETAILER_DB_MAX_CONNECTIONS '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = var("RETAILER_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .context("invalid RETAILER_BIND_ADDR")?;

        let timezone = match var("RETAILER_TIMEZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|err| anyhow!("invalid RETAILER_TIMEZONE '{raw}': {err}"))?,
            None => Tz::UTC,
        };

        let validation = match var("RETAILER_VALIDATION") {
            Some(raw) => raw.parse::<ValidationMode>()?,
            None => ValidationMode::default(),
        };

        Ok(Self {
            store,
            database_url,
            max_connections,
            bind_addr,
            settings: ServiceSettings {
                timezone,
                validation,
            },
        })
    }
}
