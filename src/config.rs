use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("HOST must be an IP address, got {0:?}")]
    InvalidHost(String)
}

/// Settings read once at startup and handed to the rest of the app.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf
}

impl Config {

    pub fn from_env() -> Result<Self, ConfigError> {

        Self::from_lookup(|name| std::env::var(name).ok())

    }

    // split out so tests don't have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>
    {

        // an empty key in .env is the same as no key at all
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let gemini_api_base = lookup("GEMINI_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { name: "GEMINI_TIMEOUT_SECS", value })?,
            None => DEFAULT_TIMEOUT_SECS
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host.trim().parse()
            .map_err(|_| ConfigError::InvalidHost(host.clone()))?;

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value })?,
            None => DEFAULT_PORT
        };

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frontend").join("uploads"));

        let frontend_dir = lookup("FRONTEND_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frontend"));

        Ok(Config {
            gemini_api_key,
            gemini_api_base,
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr: SocketAddr::new(ip, port),
            upload_dir,
            frontend_dir
        })

    }

}
