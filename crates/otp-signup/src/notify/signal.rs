//! Signal CLI REST API delivery.

use super::NotificationChannel;
use crate::error::SignupError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Outgoing message request for `/v2/send`.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    message: &'a str,
    number: &'a str,
    recipients: Vec<&'a str>,
}

/// Upper bound on a `/v1/health` probe so health output stays responsive.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Sends codes as Signal messages from a registered sender number.
#[derive(Clone)]
pub struct SignalChannel {
    client: Client,
    base_url: String,
    sender: String,
    health_timeout: Duration,
}

impl SignalChannel {
    /// Create a new Signal channel.
    pub fn new(base_url: impl Into<String>, sender: impl Into<String>) -> Result<Self, SignupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SignupError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sender: sender.into(),
            health_timeout: HEALTH_TIMEOUT,
        })
    }

    /// Override the health probe timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// The number messages are sent from.
    pub fn sender(&self) -> &str {
        &self.sender
    }
}

#[async_trait]
impl NotificationChannel for SignalChannel {
    fn name(&self) -> &'static str {
        "signal"
    }

    #[instrument(skip(self, message))]
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), SignupError> {
        let request = SendMessageRequest {
            message,
            number: &self.sender,
            recipients: vec![phone_number],
        };

        let response = self
            .client
            .post(format!("{}/v2/send", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Signal send failed");

            return Err(SignupError::Dispatch(format!(
                "Signal send failed: {} - {}",
                status, body
            )));
        }

        debug!(phone_number = %phone_number, "Code delivered via Signal");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
