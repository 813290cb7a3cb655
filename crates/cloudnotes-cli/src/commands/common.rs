use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cloudnotes_core::config::{BackendConfig, OrchestratorConfig};
use cloudnotes_core::{BackendClient, Note, SessionOrchestrator, SignInStatus, UiModel};
use serde::Serialize;

use crate::error::CliError;
use crate::session_store::KeyringSessionStore;

const CONFIG_PATH_ENV: &str = "CLOUDNOTES_CONFIG";

/// Running backend client plus the orchestrator observing it.
pub struct App {
    pub backend: BackendClient,
    pub orchestrator: SessionOrchestrator,
    configured: bool,
    wait: Duration,
}

impl App {
    pub fn start(config_path: Option<PathBuf>, wait_secs: u64) -> Self {
        let config_path = resolve_config_path(config_path);
        let config = BackendConfig::load(config_path.as_deref());
        let configured = config.is_ok();
        let backend =
            BackendClient::from_config_or_degraded(config, KeyringSessionStore::default());
        let orchestrator =
            SessionOrchestrator::start(backend.clone(), OrchestratorConfig::default());

        Self {
            backend,
            orchestrator,
            configured,
            wait: Duration::from_secs(wait_secs),
        }
    }

    pub const fn is_configured(&self) -> bool {
        self.configured
    }

    /// Wait until `predicate` holds for the published model.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&UiModel) -> bool,
    ) -> Result<UiModel, CliError> {
        let mut model = self.orchestrator.model();
        let result = tokio::time::timeout(self.wait, model.wait_for(predicate))
            .await
            .map_err(|_| CliError::Timeout(self.wait.as_secs()))?;
        let snapshot = result.map_err(|_| CliError::OperationFailed("Session"))?;
        Ok(snapshot.clone())
    }

    /// Wait for a definite sign-in status and for the automatic note load
    /// to finish.
    pub async fn settle(&self) -> Result<UiModel, CliError> {
        if !self.configured {
            return Err(CliError::NotConfigured);
        }
        self.wait_for(|model| model.status() != SignInStatus::Unknown && !model.is_loading())
            .await
    }

    pub async fn require_signed_in(&self) -> Result<UiModel, CliError> {
        let model = self.settle().await?;
        if model.is_signed_in() {
            Ok(model)
        } else {
            Err(CliError::NotSignedIn)
        }
    }

    pub async fn shutdown(self) {
        self.orchestrator.shutdown().await;
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        name: note.name.clone(),
        description: note.description.clone(),
        image: note.image.clone(),
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let id = note.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let name = truncate_chars(&note.name, 30);
            let description = note
                .description
                .as_deref()
                .map(|text| truncate_chars(text, 40))
                .unwrap_or_default();

            let line = match &note.image {
                Some(image) => format!("{short_id:<13}  {name:<30}  {description:<40}  [{image}]"),
                None => format!("{short_id:<13}  {name:<30}  {description}"),
            };
            line.trim_end().to_string()
        })
        .collect()
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn normalize_note_name(name: &str) -> Result<String, CliError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteName)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Explicit path, then `CLOUDNOTES_CONFIG`, then the default config file if
/// it exists. `None` means configuration comes from the environment.
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    cli_path
        .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .or_else(|| default_config_path().filter(|path| path.is_file()))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cloudnotes").join("config.json"))
}

pub fn describe_status(model: &UiModel) -> String {
    match model.status() {
        SignInStatus::Unknown => "unknown".to_string(),
        SignInStatus::SignedOut => "signed out".to_string(),
        SignInStatus::SignedIn if model.is_loading() => "signed in (loading notes)".to_string(),
        SignInStatus::SignedIn => format!("signed in ({} notes)", model.notes().len()),
    }
}
