//! Logging Setup

use crate::config::{Environment, FileOutput, LogLevel, LoggingConfig, RotationPolicy};
use anyhow::{anyhow, Context};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Logs go to a rolling JSON file when `file_output` is set, otherwise to
/// stdout (JSON in `prod`, human-readable in `dev`). `RUST_LOG` directives
/// override the configured level. The returned guard must live until
/// shutdown so buffered file output is flushed.
pub fn init_logging(
    logging: &LoggingConfig,
    environment: Environment,
) -> anyhow::Result<Option<WorkerGuard>> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(logging.level, rust_log.as_deref()))
        .with_target(true);

    match (&logging.file_output, environment) {
        (Some(file), _) => {
            let appender = file_appender(file)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;
            Ok(Some(guard))
        }
        (None, Environment::Prod) => {
            builder
                .json()
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;
            Ok(None)
        }
        (None, Environment::Dev) => {
            builder
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;
            Ok(None)
        }
    }
}

/// Configured level as the default directive, refined by `RUST_LOG`-style directives
fn env_filter(level: LogLevel, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(Level::from(level)).into())
        .parse_lossy(directives.unwrap_or_default())
}

fn file_appender(file: &FileOutput) -> anyhow::Result<RollingFileAppender> {
    let directory = file
        .file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = file
        .file_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("log file path {} has no file name", file.file_path.display()))?;

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation(file.rotation))
        .filename_prefix(prefix);
    if let Some(max_files) = file.max_files.or(file.rotation.default_retention()) {
        builder = builder.max_log_files(max_files);
    }

    builder
        .build(directory)
        .with_context(|| format!("failed to open log directory {}", directory.display()))
}

fn rotation(policy: RotationPolicy) -> Rotation {
    match policy {
        RotationPolicy::Hourly => Rotation::HOURLY,
        RotationPolicy::Daily | RotationPolicy::Weekly | RotationPolicy::Monthly => {
            Rotation::DAILY
        }
        RotationPolicy::Never => Rotation::NEVER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_appender_creates_log() {
        let dir = TempDir::new().unwrap();
        let file = FileOutput {
            file_path: dir.path().join("bridge.log"),
            rotation: RotationPolicy::Never,
            max_files: Some(3),
        };

        file_appender(&file).unwrap();
        assert!(dir.path().join("bridge.log").exists());
    }

    #[test]
    fn test_file_appender_weekly_rotation() {
        let dir = TempDir::new().unwrap();
        let file = FileOutput {
            file_path: dir.path().join("bridge.log"),
            rotation: RotationPolicy::Weekly,
            max_files: None,
        };
        assert!(file_appender(&file).is_ok());
        assert_eq!(rotation(RotationPolicy::Weekly), Rotation::DAILY);
        assert_eq!(rotation(RotationPolicy::Monthly), Rotation::DAILY);
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        let filter = env_filter(LogLevel::Warning, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_env_filter_directives_override_level() {
        let filter = env_filter(LogLevel::Error, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_file_appender_requires_file_name() {
        let file = FileOutput {
            file_path: "/".into(),
            rotation: RotationPolicy::Daily,
            max_files: None,
        };
        assert!(file_appender(&file).is_err());
    }
}
