use crate::error::{Error, Result};
use crate::listing::DEFAULT_PAGE_SIZE;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub geocoder_url: String,
    pub uploads_dir: String,
    pub allowed_origin: Option<String>,
    pub public_rps: u32,
    pub listing_page_size: usize,
    pub search_debounce_ms: u64,
    pub http_timeout_secs: u64,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            geocoder_url: get_env_or("GEOCODER_URL", "https://nominatim.openstreetmap.org"),
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            allowed_origin: env::var("ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            listing_page_size: get_env_parse_or("LISTING_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            search_debounce_ms: get_env_parse_or("SEARCH_DEBOUNCE_MS", 300)?,
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", 10)?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 168)?,
            cookie_secure: get_env_parse_or("COOKIE_SECURE", false)?,
            log_format: match get_env_or("LOG_FORMAT", "pretty").to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
