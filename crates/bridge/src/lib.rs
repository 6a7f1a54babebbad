//! Alert Bridge
//!
//! Polls the monitoring API for firing alerts and forwards them to a
//! Telegram chat, announcing when everything has cleared.

pub mod config;
mod logging;

pub use self::config::{BridgeConfig, ConfigError, ConfigLoader};
pub use logging::init_logging;

use alert_source::{check_reachable, HttpAlertSource};
use alerting::messages;
use anyhow::Context;
use notifier::{deliver, TelegramNotifier};
use poll_scheduler::Scheduler;
use std::future::Future;
use tracing::{error, info};

/// Start the bridge and poll until `shutdown` resolves
///
/// Fails before polling starts if the bot token is rejected or the alert
/// source is unreachable; in the latter case a service-down message is sent
/// first. Once polling, no error stops the loop.
pub async fn run<F>(config: BridgeConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let notifier = TelegramNotifier::new(
        &config.telegram_api_url,
        config.bot_token.expose(),
        config.telegram_chat_id,
        config.request_timeout,
    )
    .context("failed to create Telegram client")?;
    notifier
        .identify()
        .await
        .context("Telegram bot authorization failed")?;

    if let Err(e) = check_reachable(&config.alert_manager_url, config.request_timeout).await {
        error!("Service check failed: {}", e);
        deliver(&notifier, &messages::service_down(&e.to_string()), "service down").await;
        return Err(e).context("alert source is not reachable");
    }

    let source = HttpAlertSource::new(&config.alert_manager_url, config.request_timeout)
        .context("failed to create alert source")?;

    deliver(&notifier, messages::STARTUP, "startup").await;

    let mut scheduler = Scheduler::new(config.scheduler());
    scheduler.run(&source, &notifier, shutdown).await;

    info!("Alert bridge stopped");
    Ok(())
}
