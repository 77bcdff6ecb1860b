use crate::info;
use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

static DOTENV: Once = Once::new();

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

/// Reads the required settings file at `path`, then `<PREFIX>__<SECTION>__<KEY>` variables from the
/// environment (and a `.env` file, if present) on top of it.
pub fn load_config<T: DeserializeOwned>(path: &str, prefix: &str) -> Result<T, ConfigError> {
    DOTENV.call_once(|| match dotenv::dotenv() {
        Ok(_) => info!("Config loaded including .env file."),
        Err(_) => info!("Config loaded without .env file."),
    });
    Config::builder()
        .add_source(File::with_name(path).required(true))
        .add_source(Environment::with_prefix(prefix).try_parsing(true).separator("__"))
        .build()?
        .try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub db_path: String,
    pub db_cache_size_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub enable: bool,
    pub bind_address: SocketAddr,
    pub save_attempts: usize,
    #[serde(deserialize_with = "duration_from_millis")]
    pub save_retry_delay_ms: Duration,
}

impl AppConfig {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        load_config(path, "RECONBIT")
    }
}
