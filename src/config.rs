//! # Configuration
//!
//! Settings for the admin client and the `openttd-multitool` binary.
//!
//! ## Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Environment variables via `from_env()` (`TTD_ADMIN_*`)
//! - `Default` impls for everything except the password
//!
//! Command-line flags are layered on top of these by the binary.
//!
//! ## Example
//! ```toml
//! [client]
//! host = "localhost"
//! port = 3977
//! password = "admin_password from openttd.cfg"
//!
//! [schedule]
//! daily = []
//! monthly = ["say \"It is %Y-%M-%D\""]
//! yearly = ["save autosave-%Y"]
//! ```

use crate::error::{constants, ProtocolError, Result};
use crate::protocol::scheduler::{CalendarScheduler, Period};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default admin port of an OpenTTD server
pub const DEFAULT_ADMIN_PORT: u16 = 3977;

/// Fixed delay between a disconnect and the next connection attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Client name announced in the join packet
pub const DEFAULT_BOT_NAME: &str = "openttd-multitool";

const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(10);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Everything the binary needs: where to connect, what to send, how to log
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub client: ClientConfig,

    /// RCON command templates per period
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AdminConfig {
    /// Read and parse a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ProtocolError::ConfigError(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ProtocolError::ConfigError(format!("Invalid TOML: {e}")))
    }

    /// Defaults overridden by any `TTD_ADMIN_*` variables that are set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override connection settings with any `TTD_ADMIN_*` variables that are set.
    pub fn apply_env(&mut self) {
        self.client.apply_env();
    }

    /// A starter config file with one command per period
    pub fn example_config() -> String {
        let example = Self {
            schedule: ScheduleConfig {
                daily: Vec::new(),
                monthly: vec![String::from("say \"It is %Y-%M-%D\"")],
                yearly: vec![String::from("save autosave-%Y")],
            },
            ..Self::default()
        };
        match toml::to_string_pretty(&example) {
            Ok(text) => text,
            Err(e) => format!("# example unavailable: {e}\n"),
        }
    }

    /// Every problem found in the configuration; empty when it is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.client.validate();
        errors.extend(self.schedule.validate());
        errors.extend(self.logging.validate());
        errors
    }

    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
    }
}

fn strict(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(ProtocolError::ConfigError(format!(
        "invalid configuration:\n  - {}",
        errors.join("\n  - ")
    )))
}

/// Connection settings for the admin port
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hostname or IP address of the server
    pub host: String,

    pub port: u16,

    /// `admin_password` from the server's openttd.cfg
    pub password: String,

    /// Name announced to the server
    pub bot_name: String,

    /// Version announced to the server
    pub bot_version: String,

    /// Pause after a disconnect, in milliseconds in the file
    #[serde(with = "millis")]
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: DEFAULT_ADMIN_PORT,
            password: String::new(),
            bot_name: String::from(DEFAULT_BOT_NAME),
            bot_version: String::from(env!("CARGO_PKG_VERSION")),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ClientConfig {
    /// `host:port` as passed to the connector
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("TTD_ADMIN_HOST") {
            self.host = host;
        }
        if let Some(port) = env_parsed("TTD_ADMIN_PORT") {
            self.port = port;
        }
        if let Ok(password) = std::env::var("TTD_ADMIN_PASSWORD") {
            self.password = password;
        }
        if let Some(ms) = env_parsed::<u64>("TTD_ADMIN_RECONNECT_DELAY_MS") {
            self.reconnect_delay = Duration::from_millis(ms);
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.trim().is_empty() {
            errors.push(constants::ERR_EMPTY_HOSTNAME.to_string());
        }
        if self.port == 0 {
            errors.push(constants::ERR_INVALID_PORT.to_string());
        }
        if self.password.is_empty() {
            errors.push(constants::ERR_MISSING_PASSWORD.to_string());
        }

        for (field, value) in [
            ("password", &self.password),
            ("bot_name", &self.bot_name),
            ("bot_version", &self.bot_version),
        ] {
            if value.contains('\0') {
                errors.push(format!("{field} cannot contain NUL bytes"));
            }
        }

        match self.reconnect_delay {
            d if d < MIN_RECONNECT_DELAY => errors.push(format!(
                "Reconnect delay too short: {d:?} (minimum {MIN_RECONNECT_DELAY:?})"
            )),
            d if d > MAX_RECONNECT_DELAY => errors.push(format!(
                "Reconnect delay too long: {d:?} (maximum {MAX_RECONNECT_DELAY:?})"
            )),
            _ => {}
        }

        errors
    }

    /// Like [`validate`](Self::validate), folded into one error.
    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
    }
}

/// Unset or unparsable variables are ignored.
fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// RCON command templates, keyed by period
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleConfig {
    pub daily: Vec<String>,
    pub monthly: Vec<String>,
    pub yearly: Vec<String>,
}

impl ScheduleConfig {
    pub fn commands(&self, period: Period) -> &[String] {
        match period {
            Period::Daily => &self.daily,
            Period::Monthly => &self.monthly,
            Period::Yearly => &self.yearly,
        }
    }

    /// Build a scheduler holding every configured command, in file order.
    pub fn to_scheduler(&self) -> CalendarScheduler {
        let mut scheduler = CalendarScheduler::new();
        for period in Period::ALL {
            for command in self.commands(period) {
                scheduler.register(period, command.trim());
            }
        }
        scheduler
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for period in Period::ALL {
            for command in self.commands(period) {
                if command.trim().is_empty() {
                    errors.push(format!("Empty {period} command"));
                } else if command.contains('\0') {
                    errors.push(format!("{period} command contains a NUL byte: {command:?}"));
                }
            }
        }
        errors
    }
}

/// Output settings for the `tracing` subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Attached to the startup log line
    pub app_name: String,

    /// Used when `RUST_LOG` is not set
    #[serde(with = "level")]
    pub log_level: Level,

    /// One JSON object per line instead of human-readable text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from(DEFAULT_BOT_NAME),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        if self.app_name.trim().is_empty() {
            vec!["Logging app_name cannot be empty".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// `Duration` as a whole number of milliseconds
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// `tracing::Level` as a lowercase name
mod level {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(value: &Level, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.as_str().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Level, D::Error> {
        let name = String::deserialize(d)?;
        name.parse()
            .map_err(|_| de::Error::custom(format!("unknown log level {name:?}")))
    }
}
