//! Event-based configuration.
//!
//! Each PPL event runs its own deployment of the API. `PPL_EVENT` picks the
//! event; its settings are the general defaults plus that event's overrides.
//! An unknown event name is a startup error.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::metrics::MetricsConfig;

pub const EVENT_ENV_VAR: &str = "PPL_EVENT";
pub const LISTEN_ENV_VAR: &str = "PPL_LISTEN";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const TEST_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_QUEUES_PER_CHALLENGER: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PPL_EVENT={0} is an invalid value")]
    UnknownEvent(String),
    #[error("invalid listen address \"{addr}\": {reason}")]
    InvalidListenAddr { addr: String, reason: String },
}

/// The event a deployment serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PplEvent {
    #[default]
    General,
    East,
    West,
    Aus,
    Online,
    Test,
}

impl PplEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            PplEvent::General => "general",
            PplEvent::East => "east",
            PplEvent::West => "west",
            PplEvent::Aus => "aus",
            PplEvent::Online => "online",
            PplEvent::Test => "test",
        }
    }
}

impl fmt::Display for PplEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PplEvent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(PplEvent::General),
            "east" => Ok(PplEvent::East),
            "west" => Ok(PplEvent::West),
            "aus" => Ok(PplEvent::Aus),
            "online" => Ok(PplEvent::Online),
            "test" => Ok(PplEvent::Test),
            other => Err(ConfigError::UnknownEvent(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub event: PplEvent,
    pub listen_addr: SocketAddr,
    /// How many leader queues one challenger may sit in at once
    pub max_queues_per_challenger: u32,
    pub metrics: MetricsConfig,
}

/// Per-event differences from the general config.
#[derive(Debug, Default)]
struct EventOverrides {
    listen_addr: Option<&'static str>,
    max_queues_per_challenger: Option<u32>,
}

impl EventOverrides {
    fn for_event(event: PplEvent) -> Self {
        match event {
            PplEvent::Test => Self {
                listen_addr: Some(TEST_LISTEN_ADDR),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

impl Config {
    /// Select the config from `PPL_EVENT` (default `general`), honouring a
    /// `PPL_LISTEN` override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let event = std::env::var(EVENT_ENV_VAR).ok();
        let listen = std::env::var(LISTEN_ENV_VAR).ok();
        Self::load(event.as_deref(), listen.as_deref())
    }

    pub fn load(event: Option<&str>, listen_override: Option<&str>) -> Result<Self, ConfigError> {
        let event = match event {
            Some(name) => name.parse()?,
            None => PplEvent::default(),
        };
        let overrides = EventOverrides::for_event(event);

        let listen = listen_override
            .or(overrides.listen_addr)
            .unwrap_or(DEFAULT_LISTEN_ADDR);
        let listen_addr = listen
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidListenAddr {
                addr: listen.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            event,
            listen_addr,
            max_queues_per_challenger: overrides
                .max_queues_per_challenger
                .unwrap_or(DEFAULT_MAX_QUEUES_PER_CHALLENGER),
            metrics: MetricsConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DEFAULT_PRUNE_INTERVAL, DEFAULT_RETENTION_WINDOW};

    #[test]
    fn defaults_to_general_event() {
        let cfg = Config::load(None, None).unwrap();
        assert_eq!(cfg.event, PplEvent::General);
        assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.max_queues_per_challenger, DEFAULT_MAX_QUEUES_PER_CHALLENGER);
        assert_eq!(cfg.metrics.retention_window, DEFAULT_RETENTION_WINDOW);
        assert_eq!(cfg.metrics.prune_interval, DEFAULT_PRUNE_INTERVAL);
        assert_eq!(cfg.metrics.correlation_id_bytes, 4);
    }

    #[test]
    fn every_event_name_round_trips() {
        for name in ["general", "east", "west", "aus", "online", "test"] {
            let event: PplEvent = name.parse().unwrap();
            assert_eq!(event.to_string(), name);
        }
    }

    #[test]
    fn test_event_listens_on_loopback() {
        let cfg = Config::load(Some("test"), None).unwrap();
        assert!(cfg.listen_addr.ip().is_loopback());
    }

    #[test]
    fn unknown_event_is_rejected() {
        let err = Config::load(Some("mars"), None).unwrap_err();
        assert_eq!(err, ConfigError::UnknownEvent("mars".into()));
        assert_eq!(err.to_string(), "PPL_EVENT=mars is an invalid value");
    }

    #[test]
    fn listen_override_wins_over_event() {
        let cfg = Config::load(Some("test"), Some("127.0.0.1:8080")).unwrap();
        assert_eq!(cfg.listen_addr.port(), 8080);
    }

    #[test]
    fn bad_listen_override_is_rejected() {
        let err = Config::load(None, Some("not-an-addr")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListenAddr { .. }));
    }
}
