//! Server configuration, read from `LEADSYNC_*` environment variables.
//!
//! | Variable                      | Default        |
//! |-------------------------------|----------------|
//! | `LEADSYNC_HOST`               | `127.0.0.1`    |
//! | `LEADSYNC_PORT`               | `8080`         |
//! | `LEADSYNC_DB_PATH`            | `leads.sqlite` |
//! | `LEADSYNC_SHEET_URL`          | unset          |
//! | `LEADSYNC_FETCH_TIMEOUT_SECS` | `15`           |
//! | `LEADSYNC_UPLOAD_LIMIT_MB`    | `10`           |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: String, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Shared spreadsheet merged into the lead view, if any.
    pub sheet_url: Option<String>,
    pub fetch_timeout: Duration,
    pub upload_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("leads.sqlite"),
            sheet_url: None,
            fetch_timeout: Duration::from_secs(15),
            upload_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_var(&var, "LEADSYNC_PORT")?.unwrap_or(defaults.port);
        let timeout_secs: u64 =
            parse_var(&var, "LEADSYNC_FETCH_TIMEOUT_SECS")?.unwrap_or(defaults.fetch_timeout.as_secs());
        let upload_limit_mb: usize = parse_var(&var, "LEADSYNC_UPLOAD_LIMIT_MB")?
            .unwrap_or(defaults.upload_limit_bytes / (1024 * 1024));

        Ok(Self {
            host: var("LEADSYNC_HOST").unwrap_or(defaults.host),
            port,
            database_path: var("LEADSYNC_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            sheet_url: var("LEADSYNC_SHEET_URL"),
            fetch_timeout: Duration::from_secs(timeout_secs),
            upload_limit_bytes: upload_limit_mb * 1024 * 1024,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
    }
}
