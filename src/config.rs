use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use tracing::{info, warn};

const DEV_TOKEN_KEY: &str = "super secret development key that is long enough";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_key: String,
    pub environment: Environment,
    pub upload_dir: PathBuf,
    /// Base used to build absolute photo URLs.
    pub public_url: String,
    pub client_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://reactivities.db?mode=rwc".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            token_key: DEV_TOKEN_KEY.to_string(),
            environment: Environment::Development,
            upload_dir: PathBuf::from("uploads"),
            public_url: "http://127.0.0.1:5000".to_string(),
            client_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();
        let environment: Environment = try_load("APP_ENV", "development")?;
        let host = var("HOST").unwrap_or(defaults.host);
        let port: u16 = try_load("PORT", "5000")?;

        let token_key = match (var("TOKEN_KEY"), environment) {
            (Some(key), _) => key,
            (None, Environment::Development) => {
                warn!("TOKEN_KEY not set, using the development key");
                defaults.token_key
            }
            (None, Environment::Production) => bail!("TOKEN_KEY must be set in production"),
        };

        let public_url =
            var("PUBLIC_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            host,
            port,
            token_key,
            environment,
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_url,
            client_origin: var("CLIENT_ORIGIN"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value '{raw}'"))
}
