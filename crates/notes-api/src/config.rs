use std::{env, net::SocketAddr};

use tracing::info;

use crate::{AnyError, auth::Credentials};

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: SocketAddr,
    pub store_url: String,
    pub db_name: String,
    pub credentials: Credentials,
    pub notes_collection: String,
    pub results_collection: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, AnyError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source, falling back to
    /// defaults for anything unset.
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
        let port = var("PORT", "5000")
            .parse::<u16>()
            .map_err(|err| format!("invalid PORT: {err}"))?;
        let bind_address = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid BIND_HOST `{host}`: {err}"))?;

        Ok(Self {
            bind_address,
            store_url: var("STORE_URL", "data"),
            db_name: var("DB_NAME", "notes_db"),
            credentials: Credentials::new(var("API_USER", "admin"), var("API_PASSWORD", "password")),
            notes_collection: var("NOTES_COLLECTION", "notes"),
            results_collection: var("RESULTS_COLLECTION", "results"),
        })
    }
}
