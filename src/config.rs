//! Serial port settings, read from a small JSON file.
//!
//! ```json
//! { "Port": "/dev/ttyUSB0", "Baud": 19200, "Timeout": 50 }
//! ```
//!
//! `Timeout` is the per-read timeout in milliseconds. Optional keys are `Delivery`
//! (`"chunked"` or `"streaming"`) and `Patience`, the total time in milliseconds a
//! streaming exchange may wait for its reply. Keys left out take their defaults.

use std::{fs::File, io::BufReader, path::Path};

use fugit::MillisDurationU32;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{session::ReadPolicy, transport::DeliveryMode};

/// Where settings are looked for unless told otherwise.
pub const DEFAULT_CONFIG_FILE: &str = "port.conf";
pub const DEFAULT_BAUD: u32 = 19200;
pub const DEFAULT_TIMEOUT_MS: u32 = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    pub port: String,
    pub baud: u32,
    /// Per-read timeout in milliseconds.
    pub timeout: u32,
    pub delivery: Option<DeliveryMode>,
    /// Total streaming patience in milliseconds.
    pub patience: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port().to_string(),
            baud: DEFAULT_BAUD,
            timeout: DEFAULT_TIMEOUT_MS,
            delivery: None,
            patience: None,
        }
    }
}

/// The first USB serial adapter on Linux, the first COM port on Windows.
pub fn default_port() -> &'static str {
    if cfg!(windows) { "COM1" } else { "/dev/ttyUSB0" }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let settings: Self = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.as_ref().display(), ?settings, "settings loaded");
        Ok(settings)
    }

    /// Load `path`, falling back to [`Settings::default`] if it's missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|err| {
            warn!(path = %path.as_ref().display(), %err, "using default settings");
            Self::default()
        })
    }

    pub fn read_timeout(&self) -> MillisDurationU32 {
        MillisDurationU32::millis(self.timeout)
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery.unwrap_or_else(DeliveryMode::platform_default)
    }

    pub fn read_policy(&self) -> ReadPolicy {
        let policy = ReadPolicy::default();
        match self.patience {
            Some(patience) => {
                policy.with_patience(MillisDurationU32::millis(patience), self.read_timeout())
            }
            None => policy,
        }
    }
}
