//! Authentication: Supabase client, session persistence, and the auth event
//! stream that drives sign-in reconciliation.

mod client;
mod events;
mod provider;

pub use client::{
    normalize_auth_url, AuthError, AuthResult, AuthSession, AuthUser, MemorySessionStore,
    RestoredSession, SessionPersistence, SupabaseAuthClient,
};
pub use events::{AuthEvent, AuthSessionStatus, SignInStatus};
pub use provider::SupabaseAuthProvider;
