//! Bridge Configuration
//!
//! YAML file layered with `ALERT_BRIDGE_*` environment overrides, validated
//! before anything else starts.

use config::{Environment as EnvSource, File, FileFormat, Map};
use poll_scheduler::{FetchFailurePolicy, SchedulerConfig};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

/// Prefix of environment variables overriding file values
pub const ENV_PREFIX: &str = "ALERT_BRIDGE";

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Unsupported configuration format: {0} (expected .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

/// Minimum level of emitted log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// How often the log file is rolled over
///
/// `weekly` and `monthly` roll daily and keep a week or a month of files
/// unless `max_files` says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Never,
}

impl RotationPolicy {
    /// Rolled files kept when `max_files` is unset
    pub fn default_retention(self) -> Option<usize> {
        match self {
            RotationPolicy::Weekly => Some(7),
            RotationPolicy::Monthly => Some(30),
            RotationPolicy::Hourly | RotationPolicy::Daily | RotationPolicy::Never => None,
        }
    }
}

/// Log file output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileOutput {
    /// Log file path; rolled files get a date suffix
    pub file_path: PathBuf,
    #[serde(default)]
    pub rotation: RotationPolicy,
    /// Rolled files to keep, unlimited when unset
    #[serde(default)]
    pub max_files: Option<usize>,
}

/// Logging section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Write JSON lines to a rolling file instead of stdout
    #[serde(default)]
    pub file_output: Option<FileOutput>,
}

/// Bot token, kept out of `Debug` output
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BotToken(String);

impl BotToken {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<redacted>)")
    }
}

fn default_api_url() -> String {
    notifier::DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> Duration {
    alert_source::DEFAULT_TIMEOUT
}

/// Complete bridge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telegram bot token
    pub bot_token: BotToken,
    /// Destination chat
    pub telegram_chat_id: i64,
    /// Bot API base URL
    #[serde(default = "default_api_url")]
    pub telegram_api_url: String,
    /// Alerts endpoint, e.g. `http://prometheus:9090/api/v1/alerts`
    pub alert_manager_url: String,
    /// Time between polls
    #[serde(with = "humantime_serde")]
    pub polling_interval: Duration,
    /// Minimum time between notifications for the same alert
    #[serde(with = "humantime_serde")]
    pub repeat_notification_interval: Duration,
    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Handling of failed alert fetches
    #[serde(default)]
    pub on_fetch_error: FetchFailurePolicy,
}

impl BridgeConfig {
    /// Load and validate the configuration at `path` with process environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        ConfigLoader::new(path).load()
    }

    /// Reject values the bridge cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.expose().trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bot_token",
                reason: "must not be empty".into(),
            });
        }
        if self.telegram_chat_id == 0 {
            return Err(ConfigError::Invalid {
                field: "telegram_chat_id",
                reason: "must be a non-zero Telegram chat id".into(),
            });
        }
        check_http_url("alert_manager_url", &self.alert_manager_url)?;
        check_http_url("telegram_api_url", &self.telegram_api_url)?;
        check_non_zero("polling_interval", self.polling_interval)?;
        check_non_zero("repeat_notification_interval", self.repeat_notification_interval)?;
        check_non_zero("request_timeout", self.request_timeout)?;
        Ok(())
    }

    /// Scheduler settings derived from this configuration
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            poll_interval: self.polling_interval,
            repeat_interval: self.repeat_notification_interval,
            on_fetch_error: self.on_fetch_error,
        }
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("{}: {}", value, e),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}

fn check_non_zero(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".into(),
        })
    } else {
        Ok(())
    }
}

/// Loader for the YAML configuration file
pub struct ConfigLoader {
    path: PathBuf,
    /// Environment override source; `None` reads the process environment
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            env: None,
        }
    }

    /// Use `vars` instead of the process environment for overrides
    pub fn with_env(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Read, layer, deserialize and validate
    pub fn load(self) -> Result<BridgeConfig, ConfigError> {
        if !self.is_yaml_file() {
            return Err(ConfigError::UnsupportedFormat(self.path));
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        let settings = config::Config::builder()
            .add_source(File::from_str(&contents, FileFormat::Yaml))
            .add_source(
                EnvSource::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.env),
            )
            .build()?;

        let config: BridgeConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn is_yaml_file(&self) -> bool {
        matches!(
            self.path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        )
    }
}
