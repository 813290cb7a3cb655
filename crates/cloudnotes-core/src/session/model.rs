//! UI-facing model observed by the presentation layer.

use crate::auth::SignInStatus;
use crate::models::Note;

/// Snapshot of what the UI renders: sign-in status and the notes list.
///
/// Only the session reconciler mutates it. `notes` is non-empty only while
/// signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiModel {
    pub(super) status: SignInStatus,
    pub(super) notes: Vec<Note>,
    pub(super) loading: bool,
}

impl UiModel {
    pub const fn status(&self) -> SignInStatus {
        self.status
    }

    pub const fn is_signed_in(&self) -> bool {
        self.status.is_signed_in()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Whether the automatic load issued on sign-in is still in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }
}
