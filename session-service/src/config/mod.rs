use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Minimum secret length accepted in production (HS256 key material).
const MIN_PROD_SECRET_BYTES: usize = 32;

/// One week.
const MAX_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 7 * 24 * 60;

/// Ten years.
const MAX_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Upper bound on one store call; must stay below the request timeout.
    pub query_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Shared key accepted on `Authorization: ApiKey <key>`; unset disables
    /// service-to-service access.
    pub service_api_key: Option<Secret<String>>,
    pub request_timeout_seconds: u64,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = SessionConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("session-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1", is_prod)?,
                query_timeout_seconds: parse_env("DATABASE_QUERY_TIMEOUT_SECONDS", "5", is_prod)?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env("SECRET_KEY", None, is_prod)?),
                access_token_expiry_minutes: parse_env(
                    "ACCESS_TOKEN_EXPIRY_MINUTES",
                    "60",
                    is_prod,
                )?,
                refresh_token_expiry_days: parse_env("REFRESH_TOKEN_EXPIRY_DAYS", "60", is_prod)?,
            },
            security: SecurityConfig {
                service_api_key: get_optional_env("SERVICE_API_KEY").map(Secret::new),
                request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS", "10", is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SECRET_KEY must not be empty"
            )));
        }

        if !(1..=MAX_ACCESS_TOKEN_EXPIRY_MINUTES).contains(&self.jwt.access_token_expiry_minutes) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ACCESS_TOKEN_EXPIRY_MINUTES must be between 1 and {}",
                MAX_ACCESS_TOKEN_EXPIRY_MINUTES
            )));
        }

        if !(1..=MAX_REFRESH_TOKEN_EXPIRY_DAYS).contains(&self.jwt.refresh_token_expiry_days) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "REFRESH_TOKEN_EXPIRY_DAYS must be between 1 and {}",
                MAX_REFRESH_TOKEN_EXPIRY_DAYS
            )));
        }

        if self.security.request_timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "REQUEST_TIMEOUT_SECONDS must be positive"
            )));
        }

        if self.database.query_timeout_seconds == 0
            || self.database.query_timeout_seconds >= self.security.request_timeout_seconds
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_QUERY_TIMEOUT_SECONDS must be positive and below REQUEST_TIMEOUT_SECONDS"
            )));
        }

        if self.environment == Environment::Prod
            && self.jwt.secret.expose_secret().len() < MIN_PROD_SECRET_BYTES
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SECRET_KEY must be at least {} bytes in production",
                MIN_PROD_SECRET_BYTES
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
