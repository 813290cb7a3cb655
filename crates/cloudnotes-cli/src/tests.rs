use std::path::PathBuf;

use clap::Parser;
use cloudnotes_core::auth::{AuthSession, AuthUser, SessionPersistence};
use cloudnotes_core::{AccessLevel, Note};
use pretty_assertions::assert_eq;

use crate::cli::{AccessArg, Cli, Commands, ImageCommands, NotesCommands};
use crate::commands::common::{
    format_note_lines, normalize_note_identifier, normalize_note_name, note_to_list_item,
    resolve_config_path, truncate_chars,
};
use crate::error::CliError;
use crate::session_store::KeyringSessionStore;

#[test]
fn normalize_note_name_trims_and_rejects_empty() {
    assert_eq!(normalize_note_name("  groceries ").unwrap(), "groceries");
    assert!(matches!(
        normalize_note_name(" \t "),
        Err(CliError::EmptyNoteName)
    ));
}

#[test]
fn normalize_note_identifier_rejects_blank() {
    assert!(matches!(
        normalize_note_identifier(""),
        Err(CliError::EmptyNoteId)
    ));
    assert_eq!(normalize_note_identifier(" abc ").unwrap(), "abc");
}

#[test]
fn truncate_chars_collapses_whitespace_and_adds_ellipsis() {
    assert_eq!(truncate_chars("a  b\nc", 10), "a b c");
    assert_eq!(truncate_chars("abcdefghij", 6), "abc...");
}

#[test]
fn format_note_lines_shows_image_key() {
    let plain = Note::new("plain");
    let with_image = Note::new("photo")
        .with_description("holiday")
        .with_image("cat.png");

    let lines = format_note_lines(&[plain.clone(), with_image]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&plain.id.to_string()[..13]));
    assert!(lines[0].ends_with("plain"));
    assert!(lines[1].contains("holiday"));
    assert!(lines[1].ends_with("[cat.png]"));
}

#[test]
fn note_list_item_serializes_optional_fields() {
    let note = Note::new("first").with_description("details");
    let json = serde_json::to_value(note_to_list_item(&note)).unwrap();
    assert_eq!(json["name"], "first");
    assert_eq!(json["description"], "details");
    assert!(json["image"].is_null());
}

#[test]
fn explicit_config_path_wins() {
    let path = PathBuf::from("/tmp/cloudnotes-test.json");
    assert_eq!(resolve_config_path(Some(path.clone())), Some(path));
}

#[test]
fn access_arg_maps_to_access_level() {
    assert_eq!(AccessLevel::from(AccessArg::Guest), AccessLevel::Guest);
    assert_eq!(AccessLevel::from(AccessArg::Protected), AccessLevel::Protected);
    assert_eq!(AccessLevel::from(AccessArg::Private), AccessLevel::Private);
}

#[test]
fn cli_parses_note_and_image_commands() {
    let cli = Cli::try_parse_from(["cloudnotes", "notes", "add", "milk", "-d", "2 liters"]).unwrap();
    match cli.command {
        Commands::Notes {
            command:
                NotesCommands::Add {
                    name, description, ..
                },
        } => {
            assert_eq!(name, "milk");
            assert_eq!(description.as_deref(), Some("2 liters"));
        }
        _ => panic!("expected notes add"),
    }

    let cli = Cli::try_parse_from([
        "cloudnotes",
        "image",
        "get",
        "cat.png",
        "--access",
        "public",
        "--wait",
        "3",
    ])
    .unwrap();
    assert_eq!(cli.wait, 3);
    match cli.command {
        Commands::Image {
            command: ImageCommands::Get { key, access, output },
        } => {
            assert_eq!(key, "cat.png");
            assert_eq!(access, AccessArg::Guest);
            assert!(output.is_none());
        }
        _ => panic!("expected image get"),
    }
}

#[test]
fn cli_requires_credentials_for_sign_in() {
    assert!(Cli::try_parse_from(["cloudnotes", "sign-in", "--email", "a@example.com"]).is_err());
}

#[test]
fn session_store_round_trips_and_clears() {
    let store = KeyringSessionStore::new("tests-round-trip");
    let session = AuthSession {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: 1_700_000_000,
        user: AuthUser {
            id: "user-1".to_string(),
            email: Some("me@example.com".to_string()),
        },
    };

    store.save_session(&session).unwrap();
    assert_eq!(store.load_session().unwrap(), Some(session));

    store.clear_session().unwrap();
    assert_eq!(store.load_session().unwrap(), None);
}
