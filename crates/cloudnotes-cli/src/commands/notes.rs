use cloudnotes_core::{Note, NoteId};

use crate::commands::common::{
    format_note_lines, normalize_note_identifier, normalize_note_name, note_to_list_item, App,
    NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(app: &App, as_json: bool) -> Result<(), CliError> {
    let model = app.require_signed_in().await?;

    if as_json {
        let json_items = model
            .notes()
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if model.notes().is_empty() {
        println!("No notes");
    } else {
        for line in format_note_lines(model.notes()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_add(
    app: &App,
    name: &str,
    description: Option<&str>,
    image: Option<&str>,
) -> Result<(), CliError> {
    let name = normalize_note_name(name)?;
    app.require_signed_in().await?;

    let mut note = Note::new(name);
    if let Some(description) = description.map(str::trim).filter(|text| !text.is_empty()) {
        note = note.with_description(description);
    }
    if let Some(image) = image.map(str::trim).filter(|key| !key.is_empty()) {
        note = note.with_image(image);
    }
    let id = note.id.clone();

    app.orchestrator.create_note(note).finished().await;
    app.orchestrator.flush().await;

    let created = app
        .orchestrator
        .snapshot()
        .notes()
        .iter()
        .any(|note| note.id == id);
    if !created {
        return Err(CliError::OperationFailed("Create note"));
    }
    println!("{id}");
    Ok(())
}

pub async fn run_delete(app: &App, id: &str) -> Result<(), CliError> {
    let id = NoteId::from(normalize_note_identifier(id)?);
    let model = app.require_signed_in().await?;
    if !model.notes().iter().any(|note| note.id == id) {
        return Err(CliError::NoteNotFound(id.to_string()));
    }

    app.orchestrator.delete_note(&id).finished().await;
    app.orchestrator.flush().await;

    let still_present = app
        .orchestrator
        .snapshot()
        .notes()
        .iter()
        .any(|note| note.id == id);
    if still_present {
        return Err(CliError::OperationFailed("Delete note"));
    }
    println!("{id}");
    Ok(())
}
