use std::env;
use std::time::Duration;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service_url: String,
    pub max_upload_size_mb: u64,
    pub request_timeout_seconds: u64,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            max_upload_size_mb: 16,
            request_timeout_seconds: 60,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        info!("Loading client configuration from environment variables");

        let defaults = Self::default();
        let config = ClientConfig {
            service_url: env::var("AURA_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    info!("AURA_SERVICE_URL not set, using default: {}", DEFAULT_SERVICE_URL);
                    defaults.service_url.clone()
                }),
            max_upload_size_mb: Self::parse_env_var("MAX_UPLOAD_SIZE_MB", defaults.max_upload_size_mb)
                .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
            request_timeout_seconds: Self::parse_env_var(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )
            .context("Failed to parse REQUEST_TIMEOUT_SECONDS")?,
            log_format: Self::parse_env_var("LOG_FORMAT", defaults.log_format)
                .context("Failed to parse LOG_FORMAT")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(anyhow::anyhow!("AURA_SERVICE_URL must not be empty"));
        }
        if !(self.service_url.starts_with("http://") || self.service_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "AURA_SERVICE_URL must start with http:// or https:// (got {})",
                self.service_url
            ));
        }
        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.max_upload_size_bytes().is_none() {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB is out of range (got {})",
                self.max_upload_size_mb
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS must be greater than 0"));
        }
        Ok(())
    }

    pub fn max_upload_size_bytes(&self) -> Option<u64> {
        self.max_upload_size_mb.checked_mul(1024 * 1024)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
