use std::env;
use std::time::Duration;

use crate::dispatch::notify::PushConfig;
use crate::error::AppError;
use crate::state::DispatchSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub dispatch_queue_size: usize,
    pub event_buffer_size: usize,
    pub dispatch_radius_meters: f64,
    /// 0 means unlimited fan-out.
    pub max_fanout: usize,
    pub notify_timeout_ms: u64,
    pub push: PushConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            dispatch_queue_size: parse_or_default("DISPATCH_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            dispatch_radius_meters: parse_or_default("DISPATCH_RADIUS_METERS", 10_000.0)?,
            max_fanout: parse_or_default("MAX_FANOUT", 0)?,
            notify_timeout_ms: parse_or_default("NOTIFY_TIMEOUT_MS", 3_000)?,
            push: PushConfig {
                endpoint: env::var("PUSH_ENDPOINT")
                    .unwrap_or_else(|_| "log://push".to_string()),
                api_key: env::var("PUSH_API_KEY").unwrap_or_default(),
            },
        })
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            radius_meters: self.dispatch_radius_meters,
            max_fanout: self.max_fanout,
            notify_timeout: Duration::from_millis(self.notify_timeout_ms),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
