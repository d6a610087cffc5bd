//! Configuration management for the API server

use std::time::Duration;

use anyhow::{
    Context,
    Result,
};
use geocoder::GeocoderConfig;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_PGHOST: &str = "localhost";
const DEFAULT_PGPORT: &str = "5432";
const DEFAULT_PGUSER: &str = "postgres";
const DEFAULT_PGPASSWORD: &str = "postgres";
const DEFAULT_PGDATABASE: &str = "nutrisync_db";
const DEFAULT_GEOCODE_TIMEOUT_SECS: &str = "5";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub api_port: u16,
    /// Allowed CORS origins; `*` means any origin
    pub cors_origins: Vec<String>,
    pub geocoder: GeocoderConfig,
}

impl Config {
    /// Create a new Config from environment variables
    ///
    /// # Errors
    /// Returns an error if a numeric variable (`PORT`, `PGPORT`,
    /// `GEOCODE_TIMEOUT_SECS`) cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a new Config with explicit values (mainly for testing)
    pub fn new(database_url: String, api_port: u16) -> Self {
        Self {
            database_url,
            api_port,
            cors_origins: vec!["*".to_string()],
            geocoder: GeocoderConfig::default(),
        }
    }

    /// Resolve the configuration through `lookup`; blank values count as unset.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_port = var("PORT", DEFAULT_PORT)
            .trim()
            .parse()
            .context("PORT must be a valid port number")?;

        let database_url = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => url,
            None => {
                let pg_port: u16 = var("PGPORT", DEFAULT_PGPORT)
                    .trim()
                    .parse()
                    .context("PGPORT must be a valid port number")?;
                format!(
                    "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                    var("PGUSER", DEFAULT_PGUSER),
                    var("PGPASSWORD", DEFAULT_PGPASSWORD),
                    var("PGHOST", DEFAULT_PGHOST),
                    pg_port,
                    var("PGDATABASE", DEFAULT_PGDATABASE),
                )
            }
        };

        let timeout_secs: u64 = var("GEOCODE_TIMEOUT_SECS", DEFAULT_GEOCODE_TIMEOUT_SECS)
            .trim()
            .parse()
            .context("GEOCODE_TIMEOUT_SECS must be a whole number of seconds")?;

        let geocoder = GeocoderConfig::new(
            var("NOMINATIM_BASE_URL", geocoder::DEFAULT_BASE_URL),
            var("NOMINATIM_USER_AGENT", geocoder::DEFAULT_USER_AGENT),
        )
        .with_timeout(Duration::from_secs(timeout_secs));

        Ok(Self {
            database_url,
            api_port,
            cors_origins: split_origins(&var("CORS_ORIGINS", "*")),
            geocoder,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Database URL with the password masked, for logging
    pub fn redacted_database_url(&self) -> String {
        redact_password(&self.database_url)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

fn redact_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
