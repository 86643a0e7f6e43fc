use crate::error::AppError;
use serde::Deserialize;
use std::time::Duration;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ws_outbound_buffer() -> usize {
    64
}

fn default_ws_heartbeat_interval_secs() -> u64 {
    5
}

fn default_ws_client_timeout_secs() -> u64 {
    30
}

fn default_run_migrations() -> bool {
    true
}

/// Service configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Frames queued per viewer before a broadcast counts as a delivery failure
    #[serde(default = "default_ws_outbound_buffer")]
    pub ws_outbound_buffer: usize,
    #[serde(default = "default_ws_heartbeat_interval_secs")]
    pub ws_heartbeat_interval_secs: u64,
    #[serde(default = "default_ws_client_timeout_secs")]
    pub ws_client_timeout_secs: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

/// Knobs for one live-view connection.
#[derive(Debug, Clone, Copy)]
pub struct LiveViewSettings {
    pub outbound_buffer: usize,
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

impl Default for LiveViewSettings {
    fn default() -> Self {
        Self {
            outbound_buffer: default_ws_outbound_buffer(),
            heartbeat_interval: Duration::from_secs(default_ws_heartbeat_interval_secs()),
            client_timeout: Duration::from_secs(default_ws_client_timeout_secs()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let cfg: Config = envy::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build from explicit key/value pairs, using the same names as the environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let cfg: Config = envy::from_iter(vars).map_err(|e| AppError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.ws_outbound_buffer == 0 {
            return Err(AppError::Config(
                "WS_OUTBOUND_BUFFER must be greater than zero".into(),
            ));
        }
        if self.ws_heartbeat_interval_secs == 0 {
            return Err(AppError::Config(
                "WS_HEARTBEAT_INTERVAL_SECS must be greater than zero".into(),
            ));
        }
        if self.ws_client_timeout_secs <= self.ws_heartbeat_interval_secs {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn live_view(&self) -> LiveViewSettings {
        LiveViewSettings {
            outbound_buffer: self.ws_outbound_buffer,
            heartbeat_interval: Duration::from_secs(self.ws_heartbeat_interval_secs),
            client_timeout: Duration::from_secs(self.ws_client_timeout_secs),
        }
    }
}
