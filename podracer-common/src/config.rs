use log::*;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Server {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub poll_interval_ms: u64,
    pub countdown_from: u8,
    pub countdown_period_ms: u64,
    pub countdown_lead_in_ms: u64,
    /// Subtracted from the id returned when a race is created before it is used in race URLs.
    /// The race server numbers races from 1 on creation but indexes them from 0, set this to 0
    /// for a server without that off-by-one.
    pub race_id_offset: u32,
}

impl Default for Race {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            countdown_from: 3,
            countdown_period_ms: 1000,
            countdown_lead_in_ms: 1000,
            race_id_offset: 1,
        }
    }
}

/// Tokio intervals need a period above zero
const MIN_PERIOD_MS: u64 = 1;

impl Race {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_PERIOD_MS))
    }

    pub fn countdown_period(&self) -> Duration {
        Duration::from_millis(self.countdown_period_ms.max(MIN_PERIOD_MS))
    }

    pub fn countdown_lead_in(&self) -> Duration {
        Duration::from_millis(self.countdown_lead_in_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub server: Server,
    pub race: Race,
}

impl Config {
    pub fn new_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config_file = match read_to_string(path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to read config file: {}", e);
                return Err(Box::new(e));
            }
        };

        match toml::from_str(&config_file) {
            Ok(c) => Ok(c),
            Err(e) => {
                error!("Failed to parse config file: {}", e);
                Err(Box::new(e))
            }
        }
    }
}
