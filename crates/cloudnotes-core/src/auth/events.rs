//! Auth event vocabulary and the event-to-status filter.

use std::fmt;

/// Notification pushed by the auth provider whenever its state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    SessionExpired,
    /// Any provider event without a sign-in meaning (token refresh, user
    /// attribute updates, ...). Carries the provider's event name.
    Other(String),
}

impl AuthEvent {
    /// Sign-in status carried by this event, if any.
    ///
    /// `Other` yields `None` and must be dropped before it reaches the
    /// model so it never overwrites a known status.
    #[must_use]
    pub const fn signal(&self) -> Option<bool> {
        match self {
            Self::SignedIn => Some(true),
            Self::SignedOut | Self::SessionExpired => Some(false),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignedIn => f.write_str("signed_in"),
            Self::SignedOut => f.write_str("signed_out"),
            Self::SessionExpired => f.write_str("session_expired"),
            Self::Other(name) => write!(f, "other({name})"),
        }
    }
}

/// Tri-state sign-in status. `Unknown` only before the first definite value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInStatus {
    #[default]
    Unknown,
    SignedIn,
    SignedOut,
}

impl SignInStatus {
    #[must_use]
    pub const fn from_signed_in(is_signed_in: bool) -> Self {
        if is_signed_in {
            Self::SignedIn
        } else {
            Self::SignedOut
        }
    }

    #[must_use]
    pub const fn is_signed_in(self) -> bool {
        matches!(self, Self::SignedIn)
    }
}

/// Result of the one-shot session fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSessionStatus {
    pub is_signed_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_maps_status_events() {
        assert_eq!(AuthEvent::SignedIn.signal(), Some(true));
        assert_eq!(AuthEvent::SignedOut.signal(), Some(false));
        assert_eq!(AuthEvent::SessionExpired.signal(), Some(false));
    }

    #[test]
    fn signal_filters_other_events() {
        assert_eq!(AuthEvent::Other("token_refreshed".to_string()).signal(), None);
    }

    #[test]
    fn status_defaults_to_unknown() {
        let status = SignInStatus::default();
        assert_eq!(status, SignInStatus::Unknown);
        assert!(!status.is_signed_in());
        assert!(SignInStatus::from_signed_in(true).is_signed_in());
        assert_eq!(SignInStatus::from_signed_in(false), SignInStatus::SignedOut);
    }
}
