//! Callback webhook client.
//!
//! # Responsibilities
//! - Post callback requests to the configured automation endpoint
//! - Distinguish transient failures (network, 5xx) from permanent ones
//!
//! # Design Decisions
//! - Every request carries its own timeout; the retry layer imposes none
//! - Non-2xx responses are errors, and only 5xx are worth retrying

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::config::WebhookConfig;

pub const USER_AGENT: &str = "CommunityPulse/1.0";
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Error type for webhook delivery.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned status {status}")]
    Status { status: u16, body: String },
}

impl WebhookError {
    /// Network failures and 5xx responses are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            WebhookError::Transport(e) => !e.is_builder(),
            WebhookError::Status { status, .. } => *status >= 500,
        }
    }
}

/// Body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub contact_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub subject: String,
    pub message: String,
    pub timestamp: String,
    pub source: &'static str,
    pub environment: &'static str,
}

/// Delivery port for callback requests.
#[async_trait]
pub trait CallbackNotifier: Send + Sync {
    async fn notify(&self, payload: &CallbackPayload) -> Result<(), WebhookError>;
}

/// `reqwest`-backed notifier.
#[derive(Debug, Clone)]
pub struct HttpCallbackNotifier {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpCallbackNotifier {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a notifier when a webhook URL is configured.
    pub fn from_config(config: &WebhookConfig) -> Result<Option<Self>, WebhookError> {
        match &config.url {
            Some(url) => Self::new(
                url.clone(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CallbackNotifier for HttpCallbackNotifier {
    async fn notify(&self, payload: &CallbackPayload) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(contact_id = %payload.contact_id, status = %status, "Callback webhook accepted");
        Ok(())
    }
}
