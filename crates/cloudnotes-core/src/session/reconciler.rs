//! Sign-in reconciliation: the reducer that folds auth signals and request
//! completions into the UI model.

use crate::auth::{AuthEvent, SignInStatus};
use crate::models::{Note, NoteId};

use super::model::UiModel;

/// Where a sign-in signal came from. Only used for logging; both sources
/// are last-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    InitialFetch,
    EventStream,
}

/// Why a note listing was issued. Both kinds carry the session epoch
/// current when the request went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListReason {
    /// Automatic load after a transition to signed in.
    SignedIn { epoch: u64 },
    /// Explicit `list_notes` call.
    Requested { epoch: u64 },
}

impl ListReason {
    pub const fn epoch(self) -> u64 {
        match self {
            Self::SignedIn { epoch } | Self::Requested { epoch } => epoch,
        }
    }
}

/// Input to the reducer. Every variant is a successful outcome; failures
/// are logged where they happen and never reach the model, except a failed
/// automatic load, which only releases the pending-load slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SignInChanged {
        is_signed_in: bool,
        source: SignalSource,
    },
    NotesListed {
        reason: ListReason,
        notes: Vec<Note>,
    },
    NotesListFailed {
        epoch: u64,
    },
    NoteCreated {
        note: Note,
        epoch: u64,
    },
    NoteDeleted(NoteId),
}

impl Message {
    /// Map an auth event to a sign-in message, dropping events that carry
    /// no status.
    pub fn from_auth_event(event: &AuthEvent) -> Option<Self> {
        event.signal().map(|is_signed_in| Self::SignInChanged {
            is_signed_in,
            source: SignalSource::EventStream,
        })
    }
}

/// Follow-up work requested by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListNotes { epoch: u64 },
}

/// Owns the UI model plus the bookkeeping needed to keep it consistent.
///
/// `epoch` advances on every sign-out so listings and created notes issued
/// for an earlier session are discarded. `pending_load` holds the epoch of the automatic
/// load in flight, so one sign-in issues at most one load.
#[derive(Debug, Default)]
pub struct Reconciler {
    model: UiModel,
    epoch: u64,
    pending_load: Option<u64>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn model(&self) -> &UiModel {
        &self.model
    }

    /// Epoch of the current session. Requests capture it when issued.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn apply(&mut self, message: Message) -> Option<Action> {
        match message {
            Message::SignInChanged {
                is_signed_in,
                source,
            } => self.apply_sign_in(is_signed_in, source),
            Message::NotesListed { reason, notes } => {
                if let ListReason::SignedIn { epoch } = reason {
                    self.release_pending(epoch);
                }
                if !self.is_current(reason.epoch()) {
                    tracing::debug!(?reason, "Dropping note listing from an ended session");
                    return None;
                }
                tracing::debug!(count = notes.len(), "Appending listed notes");
                self.model.notes.extend(notes);
                None
            }
            Message::NotesListFailed { epoch } => {
                self.release_pending(epoch);
                None
            }
            Message::NoteCreated { note, epoch } => {
                if self.is_current(epoch) {
                    self.model.notes.push(note);
                } else {
                    tracing::debug!(
                        note_id = %note.id,
                        "Dropping note created in an ended session"
                    );
                }
                None
            }
            Message::NoteDeleted(id) => {
                self.model.notes.retain(|note| note.id != id);
                None
            }
        }
    }

    fn apply_sign_in(&mut self, is_signed_in: bool, source: SignalSource) -> Option<Action> {
        let previous = self.model.status;
        self.model.status = SignInStatus::from_signed_in(is_signed_in);
        tracing::debug!(
            ?previous,
            current = ?self.model.status,
            ?source,
            "Sign-in status applied"
        );

        if !is_signed_in {
            self.model.notes.clear();
            if previous != SignInStatus::SignedOut {
                self.epoch += 1;
            }
            self.set_pending(None);
            return None;
        }

        if self.model.notes.is_empty() && self.pending_load.is_none() {
            self.set_pending(Some(self.epoch));
            return Some(Action::ListNotes { epoch: self.epoch });
        }
        None
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.model.is_signed_in()
    }

    fn release_pending(&mut self, epoch: u64) {
        if self.pending_load == Some(epoch) {
            self.set_pending(None);
        }
    }

    fn set_pending(&mut self, pending: Option<u64>) {
        self.pending_load = pending;
        self.model.loading = pending.is_some();
    }
}
