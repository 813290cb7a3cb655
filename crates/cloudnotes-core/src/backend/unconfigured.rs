//! Degraded backend used when startup configuration fails.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{AccessLevel, AuthProvider, DataApi, ObjectStore, SignInRequest};
use crate::auth::{AuthEvent, AuthSessionStatus};
use crate::models::{NoteId, NoteRecord};
use crate::{Error, Result};

/// Backend with no capabilities. Its event stream is closed from the start.
#[derive(Debug, Default)]
pub struct UnconfiguredBackend;

#[async_trait]
impl AuthProvider for UnconfiguredBackend {
    async fn fetch_session(&self) -> Result<AuthSessionStatus> {
        Err(Error::NotConfigured)
    }

    fn events(&self) -> broadcast::Receiver<AuthEvent> {
        // Sender dropped here, so the receiver reports `Closed` on first recv.
        let (_sender, receiver) = broadcast::channel(1);
        receiver
    }

    async fn sign_in(&self, _request: SignInRequest) -> Result<()> {
        Err(Error::NotConfigured)
    }

    async fn sign_out(&self) -> Result<()> {
        Err(Error::NotConfigured)
    }
}

#[async_trait]
impl DataApi for UnconfiguredBackend {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        Err(Error::NotConfigured)
    }

    async fn create_note(&self, _note: NoteRecord) -> Result<NoteRecord> {
        Err(Error::NotConfigured)
    }

    async fn delete_note(&self, _id: &NoteId) -> Result<NoteRecord> {
        Err(Error::NotConfigured)
    }
}

#[async_trait]
impl ObjectStore for UnconfiguredBackend {
    async fn upload(&self, _key: &str, _bytes: Vec<u8>, _access: AccessLevel) -> Result<()> {
        Err(Error::NotConfigured)
    }

    async fn download(&self, _key: &str, _access: AccessLevel) -> Result<Vec<u8>> {
        Err(Error::NotConfigured)
    }

    async fn remove(&self, _key: &str, _access: AccessLevel) -> Result<()> {
        Err(Error::NotConfigured)
    }
}
