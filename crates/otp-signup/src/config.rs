//! Configuration for the signup service.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// OTP issuance configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Notification channel configuration
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Device registration storage configuration
    #[serde(default)]
    pub devices: DevicesConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid SERVER__LISTEN_ADDR: {}", self.listen_addr))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// How long an issued code stays valid
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Maximum number of pending verifications held in memory
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Interval between expired-entry sweeps (0 disables the sweeper)
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,

    /// Message sent to the user; `{code}` is replaced by the code
    #[serde(default = "default_message_template")]
    pub message_template: String,
}

/// Notification backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyBackend {
    /// Write the message to the log, no delivery
    Log,
    /// Deliver through a Signal CLI REST API
    Signal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Which channel delivers codes
    #[serde(default = "default_notify_backend")]
    pub backend: NotifyBackend,

    /// Signal CLI REST API URL
    #[serde(default = "default_signal_api_url")]
    pub signal_api_url: String,

    /// Registered Signal number codes are sent from
    #[serde(default)]
    pub signal_sender: Option<String>,
}

/// Device store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicesBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevicesConfig {
    /// Storage backend for device registrations
    #[serde(default = "default_devices_backend")]
    pub backend: DevicesBackend,

    /// Path of the JSON file used by the `file` backend
    #[serde(default = "default_devices_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_pending: default_max_pending(),
            sweep_interval: default_sweep_interval(),
            message_template: default_message_template(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            backend: default_notify_backend(),
            signal_api_url: default_signal_api_url(),
            signal_sender: None,
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            backend: default_devices_backend(),
            path: default_devices_path(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origins() -> String {
    "*".into()
}

fn default_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_max_pending() -> usize {
    10_000
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_message_template() -> String {
    "Your verification code is: {code}".into()
}

fn default_notify_backend() -> NotifyBackend {
    NotifyBackend::Log
}

fn default_signal_api_url() -> String {
    "http://signal-api:8080".into()
}

fn default_devices_backend() -> DevicesBackend {
    DevicesBackend::Memory
}

fn default_devices_path() -> PathBuf {
    PathBuf::from("/data/devices.json")
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

impl CorsConfig {
    /// Parsed origin list. `None` means any origin is allowed.
    pub fn origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot start.
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        if self.otp.ttl.is_zero() {
            bail!("OTP__TTL must be greater than zero");
        }
        if chrono::Duration::from_std(self.otp.ttl).is_err() {
            bail!("OTP__TTL is out of range: {:?}", self.otp.ttl);
        }
        if self.otp.max_pending == 0 {
            bail!("OTP__MAX_PENDING must be greater than zero");
        }
        if !self.otp.message_template.contains("{code}") {
            bail!("OTP__MESSAGE_TEMPLATE must contain a {{code}} placeholder");
        }
        if self.notify.backend == NotifyBackend::Signal
            && self.notify.signal_sender.as_deref().map_or(true, str::is_empty)
        {
            bail!("NOTIFY__SIGNAL_SENDER is required when NOTIFY__BACKEND=signal");
        }
        Ok(())
    }
}
