//! Backend capability surface consumed by the session orchestrator.
//!
//! The managed platform is split into three capability groups (auth, data
//! API, object storage). Each group is a trait so the orchestrator can run
//! against the real adapters, the degraded [`UnconfiguredBackend`], or test
//! fakes.

mod unconfigured;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::auth::{
    AuthEvent, AuthSession, AuthSessionStatus, SessionPersistence, SupabaseAuthProvider,
};
use crate::config::BackendConfig;
use crate::data::GraphQlDataApi;
use crate::models::{NoteId, NoteRecord};
use crate::storage::R2ObjectStore;
use crate::Result;

pub use unconfigured::UnconfiguredBackend;

/// Credentials handed to the auth provider's sign-in flow.
#[derive(Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Visibility scope applied to stored objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// Readable by anyone, stored under `public/`.
    Guest,
    /// Readable by anyone, writable by the owner, stored under `protected/{user}/`.
    Protected,
    /// Owner only, stored under `private/{user}/`.
    #[default]
    Private,
}

impl AccessLevel {
    /// Object key prefix for this level.
    ///
    /// `Guest` objects are not namespaced by user.
    pub fn key_prefix(self, user_id: &str) -> String {
        match self {
            Self::Guest => "public/".to_string(),
            Self::Protected => format!("protected/{user_id}/"),
            Self::Private => format!("private/{user_id}/"),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// One-shot fetch of the current session state.
    async fn fetch_session(&self) -> Result<AuthSessionStatus>;

    /// Subscribe to the live auth event stream.
    ///
    /// The stream ends (receiver reports `Closed`) when the provider is gone.
    fn events(&self) -> broadcast::Receiver<AuthEvent>;

    async fn sign_in(&self, request: SignInRequest) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;
}

/// Source of the signed-in user's credentials for data and storage calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn current_session(&self) -> Result<AuthSession>;
}

#[async_trait]
pub trait DataApi: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>>;

    async fn create_note(&self, note: NoteRecord) -> Result<NoteRecord>;

    async fn delete_note(&self, id: &NoteId) -> Result<NoteRecord>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: Vec<u8>, access: AccessLevel) -> Result<()>;

    async fn download(&self, key: &str, access: AccessLevel) -> Result<Vec<u8>>;

    async fn remove(&self, key: &str, access: AccessLevel) -> Result<()>;
}

/// Handle bundling the three capability groups of the managed backend.
#[derive(Clone)]
pub struct BackendClient {
    auth: Arc<dyn AuthProvider>,
    data: Arc<dyn DataApi>,
    storage: Arc<dyn ObjectStore>,
}

impl BackendClient {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        data: Arc<dyn DataApi>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            auth,
            data,
            storage,
        }
    }

    /// Degraded client: every capability fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        let backend = Arc::new(UnconfiguredBackend::default());
        Self::new(backend.clone(), backend.clone(), backend)
    }

    /// Build the managed-platform adapters from configuration.
    ///
    /// Object storage is optional; without it, storage calls fail with
    /// `NotConfigured` while auth and data keep working.
    pub fn from_config<S: SessionPersistence>(config: &BackendConfig, store: S) -> Result<Self> {
        let auth = Arc::new(SupabaseAuthProvider::new(
            &config.supabase_url,
            &config.supabase_anon_key,
            store,
        )?);
        let data = Arc::new(GraphQlDataApi::new(
            &config.graphql_endpoint,
            &config.supabase_anon_key,
            auth.clone(),
        )?);
        let storage: Arc<dyn ObjectStore> = match &config.storage {
            Some(storage) => Arc::new(R2ObjectStore::new(storage.clone(), auth.clone())),
            None => Arc::new(UnconfiguredBackend::default()),
        };

        Ok(Self::new(auth, data, storage))
    }

    /// Like [`Self::from_config`], but a configuration failure is logged and
    /// the degraded client is returned so the app keeps running.
    pub fn from_config_or_degraded<S: SessionPersistence>(
        config: crate::Result<BackendConfig>,
        store: S,
    ) -> Self {
        match config.and_then(|config| Self::from_config(&config, store)) {
            Ok(client) => {
                tracing::info!("Backend client configured");
                client
            }
            Err(error) => {
                tracing::error!(
                    "Backend configuration failed, running without backend: {}",
                    error
                );
                Self::unconfigured()
            }
        }
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn data(&self) -> &dyn DataApi {
        self.data.as_ref()
    }

    pub fn storage(&self) -> &dyn ObjectStore {
        self.storage.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_prefixes() {
        assert_eq!(AccessLevel::Guest.key_prefix("u1"), "public/");
        assert_eq!(AccessLevel::Protected.key_prefix("u1"), "protected/u1/");
        assert_eq!(AccessLevel::Private.key_prefix("u1"), "private/u1/");
    }

    #[test]
    fn sign_in_request_debug_redacts_password() {
        let rendered = format!("{:?}", SignInRequest::new("a@example.com", "hunter2"));
        assert!(rendered.contains("a@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn degraded_client_fails_every_capability() {
        let client = BackendClient::from_config_or_degraded(
            Err(crate::Error::Configuration("missing".to_string())),
            crate::auth::MemorySessionStore::default(),
        );
        assert!(matches!(
            client.auth().fetch_session().await,
            Err(crate::Error::NotConfigured)
        ));
        assert!(client.data().list_notes().await.is_err());
        assert!(client
            .storage()
            .download("k", AccessLevel::Private)
            .await
            .is_err());
    }
}
