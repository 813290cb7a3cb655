//! Supabase-backed auth provider with a live event stream.

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::client::{
    AuthError, AuthSession, RestoredSession, SessionPersistence, SupabaseAuthClient,
};
use super::events::{AuthEvent, AuthSessionStatus};
use crate::backend::{AuthProvider, SignInRequest, TokenSource};
use crate::Result;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Auth capability over the Supabase REST client.
///
/// Keeps the active session in memory and publishes an [`AuthEvent`] for
/// every sign-in state change it observes.
pub struct SupabaseAuthProvider<S: SessionPersistence> {
    client: SupabaseAuthClient<S>,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl<S: SessionPersistence> SupabaseAuthProvider<S> {
    pub fn new(url: &str, anon_key: &str, store: S) -> super::AuthResult<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client: SupabaseAuthClient::new(url, anon_key, store)?,
            session: RwLock::new(None),
            events,
        })
    }

    fn publish(&self, event: AuthEvent) {
        tracing::debug!(%event, "Publishing auth event");
        // No receivers is fine; the event has no audience yet.
        let _ = self.events.send(event);
    }

    async fn expire_session(&self) {
        *self.session.write().await = None;
        if let Err(error) = self.client.store().clear_session() {
            tracing::warn!("Failed to clear expired session: {}", error);
        }
        self.publish(AuthEvent::SessionExpired);
    }
}

#[async_trait]
impl<S: SessionPersistence> AuthProvider for SupabaseAuthProvider<S> {
    async fn fetch_session(&self) -> Result<AuthSessionStatus> {
        if let Some(session) = self.session.read().await.as_ref() {
            if !session.is_expired() {
                return Ok(AuthSessionStatus { is_signed_in: true });
            }
        }

        let is_signed_in = match self.client.restore_session().await? {
            RestoredSession::Missing => false,
            RestoredSession::Active(session) => {
                *self.session.write().await = Some(session);
                true
            }
            RestoredSession::Refreshed(session) => {
                *self.session.write().await = Some(session);
                self.publish(AuthEvent::Other("token_refreshed".to_string()));
                true
            }
            RestoredSession::Expired => {
                self.expire_session().await;
                false
            }
        };
        Ok(AuthSessionStatus { is_signed_in })
    }

    fn events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, request: SignInRequest) -> Result<()> {
        let session = self
            .client
            .sign_in(&request.email, &request.password)
            .await?;
        *self.session.write().await = Some(session);
        self.publish(AuthEvent::SignedIn);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let current = self.session.read().await.clone();
        match current {
            Some(session) => self.client.sign_out(&session.access_token).await?,
            None => self.client.store().clear_session()?,
        }
        *self.session.write().await = None;
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }
}

#[async_trait]
impl<S: SessionPersistence> TokenSource for SupabaseAuthProvider<S> {
    async fn current_session(&self) -> Result<AuthSession> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Err(AuthError::NotSignedIn.into());
        };
        if !session.is_expired() {
            return Ok(session);
        }

        match self.client.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                *self.session.write().await = Some(refreshed.clone());
                self.publish(AuthEvent::Other("token_refreshed".to_string()));
                Ok(refreshed)
            }
            Err(error) => {
                tracing::warn!("Failed to refresh session: {}", error);
                self.expire_session().await;
                Err(AuthError::SessionExpired.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthUser, MemorySessionStore};
    use crate::util::unix_timestamp_now;

    fn provider_with(store: MemorySessionStore) -> SupabaseAuthProvider<MemorySessionStore> {
        SupabaseAuthProvider::new("https://demo.supabase.co", "anon", store).unwrap()
    }

    fn live_session() -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: unix_timestamp_now() + 3600,
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some("user@example.com".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn fetch_session_without_stored_session_is_signed_out() {
        let provider = provider_with(MemorySessionStore::default());
        let status = provider.fetch_session().await.unwrap();
        assert!(!status.is_signed_in);
    }

    #[tokio::test]
    async fn fetch_session_restores_persisted_session() {
        let store = MemorySessionStore::default();
        store.save_session(&live_session()).unwrap();
        let provider = provider_with(store);

        assert!(provider.fetch_session().await.unwrap().is_signed_in);
        let session = provider.current_session().await.unwrap();
        assert_eq!(session.user.id, "user-1");
    }

    #[tokio::test]
    async fn current_session_requires_sign_in() {
        let provider = provider_with(MemorySessionStore::default());
        assert!(matches!(
            provider.current_session().await,
            Err(crate::Error::Auth(AuthError::NotSignedIn))
        ));
    }

    #[tokio::test]
    async fn sign_out_without_session_clears_store_and_publishes() {
        let provider = provider_with(MemorySessionStore::default());
        let mut events = provider.events();

        provider.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn sign_in_rejects_blank_credentials_without_events() {
        let provider = provider_with(MemorySessionStore::default());
        let mut events = provider.events();

        let result = provider.sign_in(SignInRequest::new(" ", "secret")).await;
        assert!(result.is_err());
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
