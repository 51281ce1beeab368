use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key under which a config entry stores the opener's device id.
pub const CONF_DEVICE_ID: &str = "device_id";

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
    pub polling: PollingConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// JSON file polled for snapshots. Falls back to the simulated opener when unset.
    pub snapshot_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                device_id: "ryobi-gdo-001".to_string(),
            },
            polling: PollingConfig { interval_secs: 30 },
            input: InputConfig {
                snapshot_file: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(device_id) = std::env::var("RYOBI_DEVICE_ID") {
            config.device.device_id = device_id;
        }
        if let Ok(interval) = std::env::var("RYOBI_POLL_INTERVAL_SECS")
            && let Ok(i) = interval.parse()
        {
            config.polling.interval_secs = i;
        }
        if let Ok(path) = std::env::var("RYOBI_SNAPSHOT_FILE") {
            config.input.snapshot_file = Some(PathBuf::from(path));
        }

        config
    }

    /// Reject values the polling loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.device.device_id.trim().is_empty() {
            return Err(BridgeError::InvalidDeviceId(self.device.device_id.clone()));
        }
        if self.polling.interval_secs == 0 {
            return Err(BridgeError::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    /// Build the per-device config entry handed to platform setup.
    pub fn to_entry(&self) -> ConfigEntry {
        let mut data = Map::new();
        data.insert(
            CONF_DEVICE_ID.to_string(),
            Value::String(self.device.device_id.clone()),
        );
        ConfigEntry::new(format!("ryobi_gdo_{}", self.device.device_id), data)
    }
}

/// Per-device configuration entry, as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ConfigEntry {
    pub fn new(entry_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            entry_id: entry_id.into(),
            data,
        }
    }

    /// The device id this entry was created for.
    ///
    /// Numeric ids are accepted and rendered as strings.
    pub fn device_id(&self) -> Result<String> {
        match self.data.get(CONF_DEVICE_ID) {
            None => Err(BridgeError::MissingDeviceId),
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(BridgeError::InvalidDeviceId(other.to_string())),
        }
    }
}
