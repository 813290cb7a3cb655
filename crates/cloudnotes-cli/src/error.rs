use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] cloudnotes_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note name cannot be empty")]
    EmptyNoteName,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Not signed in. Run `cloudnotes sign-in --email <EMAIL> --password <PASSWORD>` first.")]
    NotSignedIn,
    #[error("Backend is not configured. Provide --config or set SUPABASE_URL, SUPABASE_ANON_KEY and GRAPHQL_ENDPOINT.")]
    NotConfigured,
    #[error("Timed out after {0}s waiting for the backend")]
    Timeout(u64),
    #[error("{0} failed, see log output for details")]
    OperationFailed(&'static str),
}
