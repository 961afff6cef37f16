//! Process configuration, read once at startup.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DASHBOARD_ORIGIN: &str = "http://localhost:8080";

/// Everything the process needs from the environment.
///
/// The store endpoint and API key are required; the service refuses to
/// start without them since every operation is a round trip to the store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted table-store, e.g. `https://xyz.supabase.co`.
    pub store_url: String,
    /// Public API key sent with every store request.
    pub store_api_key: String,
    /// Address the HTTP API listens on.
    pub bind_addr: SocketAddr,
    /// Origin of the dashboard allowed by CORS.
    pub dashboard_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_url = env::var("GYM_STORE_URL")
            .context("GYM_STORE_URL must be set to the table-store endpoint")?;
        let store_api_key = env::var("GYM_STORE_API_KEY")
            .context("GYM_STORE_API_KEY must be set to the store API key")?;

        let bind_addr = env::var("GYM_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("GYM_BIND_ADDR is not a valid socket address")?;

        let dashboard_origin = env::var("GYM_DASHBOARD_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_DASHBOARD_ORIGIN.to_string());

        Ok(Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            store_api_key,
            bind_addr,
            dashboard_origin,
        })
    }
}
