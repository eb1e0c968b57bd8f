use crate::errors::ConfigError;
use std::collections::BTreeMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_DATA_PATH: &str = "data/checked_dates.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address. The server holds a single process-wide session, so it
    /// stays on loopback unless `HOST` says otherwise.
    pub host: IpAddr,
    pub port: u16,
    pub data_path: PathBuf,
    /// Local accounts: lower-cased email → password.
    pub users: BTreeMap<String, String>,
    pub supabase: Option<SupabaseConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(DEFAULT_HOST);

        let port = get("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = get("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let users = match get("APP_USERS") {
            Some(raw) => parse_users(&raw)?,
            None => BTreeMap::new(),
        };

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            (Some(_), None) => {
                return Err(ConfigError::IncompleteSupabase("SUPABASE_URL", "SUPABASE_ANON_KEY"));
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteSupabase("SUPABASE_ANON_KEY", "SUPABASE_URL"));
            }
            (None, None) => None,
        };

        Ok(Self {
            host,
            port,
            data_path,
            users,
            supabase,
        })
    }
}

fn parse_users(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut users = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((email, password)) = entry.split_once(':') else {
            return Err(ConfigError::InvalidUser(entry.to_string()));
        };
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(ConfigError::InvalidUser(entry.to_string()));
        }
        users.insert(email, password.to_string());
    }
    Ok(users)
}
