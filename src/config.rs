use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

/// All records belong to this state; the external API is filtered on it and
/// every stored record carries it verbatim.
pub const STATE_NAME: &str = "Uttar Pradesh";

pub const DEFAULT_FIN_YEAR: &str = "2024-25";

pub const DISTRICTS: [&str; 5] = ["Agra", "Lucknow", "Varanasi", "Kanpur Nagar", "Allahabad"];

/// Upper bound on records fetched per district per sync.
pub const FETCH_LIMIT: u32 = 100;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause between districts during a batch sync. The external API is
/// rate-limited.
pub const SYNC_DELAY: Duration = Duration::from_secs(2);

/// What a sync does when a record for the same district and fiscal year is
/// already stored. `Insert` appends a fresh row every time, `Upsert` replaces
/// the existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Upsert,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(WriteMode::Insert),
            "upsert" => Ok(WriteMode::Upsert),
            other => Err(format!("unknown write mode '{other}'")),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub environment: String,
    pub store_endpoint: String,
    pub store_project: String,
    pub store_database: String,
    pub store_collection: String,
    pub store_key: String,
    pub gov_api_key: String,
    pub write_mode: WriteMode,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "5000"),
            environment: try_load("APP_ENVIRONMENT", "development"),
            store_endpoint: try_load("APPWRITE_ENDPOINT", "https://fra.cloud.appwrite.io/v1"),
            store_project: try_load("APPWRITE_PROJECT", "6906074b000e78a3a942"),
            store_database: try_load("APPWRITE_DATABASE", "690609420002bfd26330"),
            store_collection: try_load("APPWRITE_COLLECTION", "mgnrega_data"),
            store_key: try_load("APPWRITE_KEY", ""),
            gov_api_key: try_load("GOV_API_KEY", ""),
            write_mode: try_load("SYNC_WRITE_MODE", "insert"),
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
