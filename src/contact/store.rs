//! Contact message persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::contact::form::ContactForm;
use crate::errors::{ClassifiedError, ErrorKind};

/// Processing state of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    WebhookFailed,
}

/// A persisted contact message.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub subject: String,
    pub message: String,
    pub callback_requested: bool,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContactRecord {
    pub fn from_form(form: &ContactForm) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone(),
            subject: form.subject.clone(),
            message: form.message.clone(),
            callback_requested: form.callback_requested,
            status: ContactStatus::New,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Storage port for contact messages.
///
/// Implementations classify their own failures; a failed write is
/// DATABASE-kind so callers can retry it.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, form: &ContactForm) -> Result<ContactRecord, ClassifiedError>;

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), ClassifiedError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    records: RwLock<HashMap<Uuid, ContactRecord>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<ContactRecord> {
        self.records
            .read()
            .expect("contact store lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("contact store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, form: &ContactForm) -> Result<ContactRecord, ClassifiedError> {
        let record = ContactRecord::from_form(form);
        self.records
            .write()
            .expect("contact store lock poisoned")
            .insert(record.id, record.clone());

        tracing::debug!(contact_id = %record.id, "Contact message stored");
        Ok(record)
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), ClassifiedError> {
        let mut records = self.records.write().expect("contact store lock poisoned");
        match records.get_mut(&id) {
            Some(record) => {
                record.status = status;
                record.updated_at = Some(Utc::now());
                Ok(())
            }
            None => Err(ClassifiedError::new(
                ErrorKind::NotFound,
                "CONTACT_NOT_FOUND",
                format!("No contact message with id {id}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.org".into(),
            subject: "Streetlight out".into(),
            message: "The light on 5th Ave is out.".into(),
            ..ContactForm::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryContactStore::new();
        let record = store.insert(&form()).await.unwrap();

        assert_eq!(record.status, ContactStatus::New);
        assert!(record.updated_at.is_none());

        let stored = store.get(record.id).unwrap();
        assert_eq!(stored.email, "grace@example.org");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryContactStore::new();
        let record = store.insert(&form()).await.unwrap();

        store.update_status(record.id, ContactStatus::WebhookFailed).await.unwrap();

        let stored = store.get(record.id).unwrap();
        assert_eq!(stored.status, ContactStatus::WebhookFailed);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = MemoryContactStore::new();
        let err = store
            .update_status(Uuid::new_v4(), ContactStatus::WebhookFailed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "CONTACT_NOT_FOUND");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(ContactStatus::New).unwrap(), "new");
        assert_eq!(
            serde_json::to_value(ContactStatus::WebhookFailed).unwrap(),
            "webhook_failed"
        );
    }
}
