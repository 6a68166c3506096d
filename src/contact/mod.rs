//! Contact message subsystem.
//!
//! # Data Flow
//! ```text
//! Validated request body
//!     → form.rs (field checks → VALIDATION / INVALID_REQUEST)
//!     → store.rs (insert, retried on DATABASE failures)
//!     → webhook.rs (callback request, retried on network / 5xx failures)
//!     → on webhook failure: record marked webhook_failed, request still succeeds
//! ```
//!
//! # Design Decisions
//! - Storage and webhook delivery sit behind traits so tests inject failures
//! - A callback failure never fails the submission

pub mod form;
pub mod store;
pub mod webhook;

use std::sync::Arc;

use serde_json::json;

pub use form::ContactForm;
pub use store::{ContactRecord, ContactStatus, ContactStore, MemoryContactStore};
pub use webhook::{CallbackNotifier, CallbackPayload, HttpCallbackNotifier, WebhookError};

use crate::config::{Environment, RetriesConfig};
use crate::errors::{ClassifiedError, ErrorKind};
use crate::observability::metrics;
use crate::resilience::with_retry;

/// Accepts contact submissions and triggers callbacks.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    notifier: Option<Arc<dyn CallbackNotifier>>,
    retries: RetriesConfig,
    environment: Environment,
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ContactStore>,
        notifier: Option<Arc<dyn CallbackNotifier>>,
        retries: RetriesConfig,
        environment: Environment,
    ) -> Self {
        Self {
            store,
            notifier,
            retries,
            environment,
        }
    }

    /// Validate, persist, and request a callback when asked for.
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactRecord, ClassifiedError> {
        form.validate()?;

        let mut record = self.save(form).await?;
        tracing::info!(contact_id = %record.id, callback = form.callback_requested, "Contact message saved");

        if let Some(phone) = form.callback_phone() {
            if !self.request_callback(&record, phone).await {
                record.status = ContactStatus::WebhookFailed;
            }
        }

        Ok(record)
    }

    async fn save(&self, form: &ContactForm) -> Result<ContactRecord, ClassifiedError> {
        let store = self.store.as_ref();
        with_retry(
            &self.retries.database,
            |e: &ClassifiedError| e.kind() == ErrorKind::Database,
            move || store.insert(form),
        )
        .await
    }

    /// Returns `false` when delivery failed and the record was flagged.
    async fn request_callback(&self, record: &ContactRecord, phone: &str) -> bool {
        let Some(notifier) = self.notifier.as_deref() else {
            tracing::warn!(contact_id = %record.id, "Callback requested but no webhook is configured");
            return true;
        };

        let payload = CallbackPayload {
            contact_id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone_number: phone.to_string(),
            subject: record.subject.clone(),
            message: record.message.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: "contact_form",
            environment: self.environment.as_str(),
        };
        let payload = &payload;

        let delivered = with_retry(
            &self.retries.webhook,
            WebhookError::is_retryable,
            move || notifier.notify(payload),
        )
        .await;

        let Err(cause) = delivered else {
            return true;
        };

        let error = ClassifiedError::external("WEBHOOK_FAILED", "Error sending to callback webhook")
            .with_details(json!({ "contactId": record.id }))
            .with_cause(cause);
        tracing::error!(
            contact_id = %record.id,
            kind = %error.kind(),
            code = error.code(),
            cause = ?error.cause().map(|c| c.to_string()),
            "Callback webhook failed"
        );
        metrics::record_error(error.kind());

        if let Err(e) = self
            .store
            .update_status(record.id, ContactStatus::WebhookFailed)
            .await
        {
            tracing::error!(contact_id = %record.id, error = %e, "Failed to update contact status after webhook failure");
        }

        false
    }
}
