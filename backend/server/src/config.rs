use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub redis_url: String,
    pub redis_timeout_ms: u64,
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store '{other}', expected redis or memory")),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5000"),
            store: try_load("STORE", "redis"),
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379"),
            redis_timeout_ms: try_load("REDIS_TIMEOUT_MS", "100"),
            allowed_origins: split_origins(&try_load::<String>(
                "ALLOWED_ORIGINS",
                "http://localhost:3000",
            )),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Credentialed CORS cannot use `*`, so it is dropped rather than passed to the layer.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .filter(|origin| {
            if origin == "*" {
                warn!("Ignoring wildcard origin, list allowed origins explicitly");
                return false;
            }
            true
        })
        .collect()
}
