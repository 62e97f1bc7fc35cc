use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use tracing::info;

use crate::AnyError;

/// Where the viewer reads results from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Store,
    Files,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "store" | "db" | "database" => Ok(Self::Store),
            "files" | "fs" | "filesystem" => Ok(Self::Files),
            other => Err(format!("unknown results source `{other}` (expected `store` or `files`)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: SocketAddr,
    pub mode: SourceMode,
    pub store_url: String,
    pub db_name: String,
    pub results_collection: String,
    pub results_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, AnyError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let host = var("BIND_HOST", "0.0.0.0");
        let port = var("PORT", "8080")
            .parse::<u16>()
            .map_err(|err| format!("invalid PORT: {err}"))?;
        let bind_address = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid BIND_HOST `{host}`: {err}"))?;

        Ok(Self {
            bind_address,
            mode: var("RESULTS_SOURCE", "store").parse::<SourceMode>()?,
            store_url: var("STORE_URL", "data"),
            db_name: var("DB_NAME", "notes_db"),
            results_collection: var("RESULTS_COLLECTION", "results"),
            results_dir: PathBuf::from(var("RESULTS_DIR", "results")),
        })
    }
}
