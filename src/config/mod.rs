use std::env;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::pagination::DEFAULT_PAGE_SIZE;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub api_url: String,
    pub mirror_dir: Option<PathBuf>,
    pub page_size: NonZeroUsize,
    pub allowed_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("EVENTBOARD_BIND")
            .and_then(|raw| match raw.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!("Config: invalid EVENTBOARD_BIND '{}': {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        let page_size = lookup("EVENTBOARD_PAGE_SIZE")
            .and_then(|raw| raw.trim().parse::<NonZeroUsize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            bind_addr,
            api_url: lookup("EVENTBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            mirror_dir: lookup("EVENTBOARD_MIRROR_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            page_size,
            allowed_origins,
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
