//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.
//! Variables that are set but cannot be parsed are rejected instead of
//! silently replaced by the default.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Environment (development/production)
    pub environment: Environment,
    /// Where records and preferences are persisted
    pub storage: StorageConfig,
    /// Upload directory path
    pub upload_dir: PathBuf,
    /// Frontend assets directory
    pub frontend_dir: String,
    /// Maximum upload file size in bytes
    pub max_upload_size: usize,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Prefix of generated tracking codes
    pub tracking_prefix: String,
    /// Base URL of the Nominatim-compatible geocoder
    pub geocoder_url: String,
    pub geocoder_timeout: Duration,
    pub analysis_delay: Duration,
    pub submission_delay: Duration,
    /// Wizard sessions untouched for longer than this are discarded
    pub session_idle: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// One JSON file per key under `data_path`
    File { data_path: PathBuf },
    Postgres { database_url: String },
    /// Nothing survives a restart
    Memory,
}

impl StorageConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StorageConfig::File { .. } => "file",
            StorageConfig::Postgres { .. } => "postgres",
            StorageConfig::Memory => "memory",
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let data_path = PathBuf::from(var("DATA_PATH").unwrap_or_else(|| "./data".to_string()));

        let storage = match var("STORAGE_BACKEND")
            .unwrap_or_else(|| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StorageConfig::File {
                data_path: data_path.clone(),
            },
            "postgres" | "postgresql" => StorageConfig::Postgres {
                database_url: database_url(&var)?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "STORAGE_BACKEND must be file, postgres or memory (got '{}')",
                    other
                )))
            }
        };

        let upload_dir = var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_path.join("uploads"));

        let session_idle = parse_or::<u64, _>(&var, "SESSION_IDLE_MINUTES", 60)?
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::Invalid("SESSION_IDLE_MINUTES is too large".to_string()))?;

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 8080)?,
            environment,
            storage,
            upload_dir,
            frontend_dir: var("FRONTEND_DIR").unwrap_or_else(|| "./frontend".to_string()),
            max_upload_size: parse_or(&var, "MAX_UPLOAD_SIZE", 50 * 1024 * 1024)?, // 50MB default
            cors_origins: var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["http://localhost:8080".to_string()]),
            tracking_prefix: var("TRACKING_PREFIX")
                .map(|p| p.trim().to_uppercase())
                .unwrap_or_else(|| "PARTICIPADF".to_string()),
            geocoder_url: var("GEOCODER_URL")
                .unwrap_or_else(|| "https://nominatim.openstreetmap.org".to_string()),
            geocoder_timeout: Duration::from_secs(parse_or(&var, "GEOCODER_TIMEOUT_SECS", 10)?),
            analysis_delay: Duration::from_millis(parse_or(&var, "ANALYSIS_DELAY_MS", 1800)?),
            submission_delay: Duration::from_millis(parse_or(&var, "SUBMISSION_DELAY_MS", 1500)?),
            session_idle,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}

// Build DATABASE_URL from various env var formats:
// 1. DATABASE_URL (standard)
// 2. DATABASE_SERVER_FULL (platform alias)
// 3. Individual components: DATABASE_SERVER_HOST, DATABASE_SERVER_PORT, DATABASE_SERVER_USER, DATABASE_PASSWORD, DATABASE_DB
fn database_url<F>(var: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("DATABASE_URL").or_else(|| var("DATABASE_SERVER_FULL")) {
        return Ok(url);
    }

    let components = || -> Option<String> {
        let host = var("DATABASE_SERVER_HOST").or_else(|| var("APP_DATABASE_SERVER"))?;
        let port = var("DATABASE_SERVER_PORT")
            .or_else(|| var("APP_DATABASE_PORT"))
            .unwrap_or_else(|| "5432".to_string());
        let user = var("DATABASE_SERVER_USER").or_else(|| var("APP_DATABASE_USER"))?;
        let password = var("DATABASE_PASSWORD").or_else(|| var("APP_DATABASE_PASSWORD"))?;
        let db = var("DATABASE_DB").or_else(|| var("APP_DATABASE_DB"))?;
        Some(format!(
            "postgres://{}:{}@{}:{}/{}",
            user, password, host, port, db
        ))
    };

    components().ok_or_else(|| {
        ConfigError::Missing(
            "STORAGE_BACKEND=postgres needs DATABASE_URL, DATABASE_SERVER_FULL, or DATABASE_SERVER_HOST + DATABASE_SERVER_USER + DATABASE_PASSWORD + DATABASE_DB".to_string(),
        )
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(!config.is_production());
        assert_eq!(
            config.storage,
            StorageConfig::File {
                data_path: PathBuf::from("./data")
            }
        );
        assert_eq!(config.upload_dir, PathBuf::from("./data/uploads"));
        assert_eq!(config.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(config.tracking_prefix, "PARTICIPADF");
        assert_eq!(config.analysis_delay, Duration::from_millis(1800));
        assert_eq!(config.submission_delay, Duration::from_millis(1500));
        assert_eq!(config.session_idle, Duration::from_secs(3600));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ENVIRONMENT", "prod"),
            ("STORAGE_BACKEND", "memory"),
            ("DATA_PATH", "/srv/ouvidoria"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("TRACKING_PREFIX", " ouvdf "),
            ("ANALYSIS_DELAY_MS", "0"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.storage.name(), "memory");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/ouvidoria/uploads"));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.tracking_prefix, "OUVDF");
        assert!(config.analysis_delay.is_zero());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "postgres")]),
            Err(ConfigError::Missing(_))
        ));

        let config = load(&[
            ("STORAGE_BACKEND", "postgres"),
            ("DATABASE_SERVER_HOST", "db"),
            ("DATABASE_SERVER_USER", "ouvidoria"),
            ("DATABASE_PASSWORD", "secret"),
            ("DATABASE_DB", "portal"),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Postgres {
                database_url: "postgres://ouvidoria:secret@db:5432/portal".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "redis")]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load(&[("MAX_UPLOAD_SIZE", "-1")]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_session_idle_overflow_is_rejected() {
        let huge = u64::MAX.to_string();
        assert!(matches!(
            load(&[("SESSION_IDLE_MINUTES", huge.as_str())]),
            Err(ConfigError::Invalid(_))
        ));
        let config = load(&[("SESSION_IDLE_MINUTES", "15")]).unwrap();
        assert_eq!(config.session_idle, Duration::from_secs(900));
    }
}
