//! Notification channels that deliver codes to phones.

mod signal;

pub use signal::SignalChannel;

use crate::config::{NotifyBackend, NotifyConfig};
use crate::error::SignupError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Delivers a text message to a phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name for logs and health output.
    fn name(&self) -> &'static str;

    /// Send `message` to `phone_number`.
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), SignupError>;

    /// Whether the channel's backend is reachable.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Channel that only writes the message to the log.
///
/// Used for development and for deployments where delivery happens out of
/// band. The message (and so the code) appears in the service log.
#[derive(Debug, Default, Clone)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, phone_number: &str, message: &str) -> Result<(), SignupError> {
        info!(phone_number = %phone_number, message = %message, "Notification (not delivered)");
        Ok(())
    }
}

/// Build the channel selected by configuration.
pub fn build_channel(config: &NotifyConfig) -> Result<Arc<dyn NotificationChannel>, SignupError> {
    match config.backend {
        NotifyBackend::Log => Ok(Arc::new(LogChannel)),
        NotifyBackend::Signal => {
            let sender = config.signal_sender.clone().ok_or_else(|| {
                SignupError::Internal("Signal sender number is not configured".to_string())
            })?;
            Ok(Arc::new(SignalChannel::new(&config.signal_api_url, sender)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_channel_always_succeeds() {
        let channel = LogChannel;
        assert!(channel
            .send("+14155551234", "Your verification code is: 1234")
            .await
            .is_ok());
        assert!(channel.health_check().await);
    }

    #[test]
    fn test_build_log_channel() {
        let channel = build_channel(&NotifyConfig::default()).unwrap();
        assert_eq!(channel.name(), "log");
    }

    #[test]
    fn test_build_signal_channel_requires_sender() {
        let config = NotifyConfig {
            backend: NotifyBackend::Signal,
            ..NotifyConfig::default()
        };
        assert!(build_channel(&config).is_err());

        let config = NotifyConfig {
            backend: NotifyBackend::Signal,
            signal_sender: Some("+14155550000".into()),
            ..NotifyConfig::default()
        };
        assert_eq!(build_channel(&config).unwrap().name(), "signal");
    }
}
