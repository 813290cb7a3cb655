//! cloudnotes CLI - notes and images against the managed backend
//!
//! Every command drives the same session orchestrator a UI would use and
//! reads its results back from the published UI model.

mod cli;
mod commands;
mod error;
mod session_store;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ImageCommands, NotesCommands};
use crate::commands::auth_cmd::{run_sign_in, run_sign_out};
use crate::commands::common::App;
use crate::commands::image::{run_get, run_put, run_rm};
use crate::commands::notes::{run_add, run_delete, run_list};
use crate::commands::status::{run_status, run_watch};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "cloudnotes=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::start(cli.config, cli.wait);
    let result = dispatch(&app, cli.command).await;
    app.shutdown().await;
    result
}

async fn dispatch(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Status => run_status(app).await,
        Commands::Watch => run_watch(app).await,
        Commands::SignIn { email, password } => run_sign_in(app, &email, &password).await,
        Commands::SignOut => run_sign_out(app).await,
        Commands::Notes { command } => match command {
            NotesCommands::List { json } => run_list(app, json).await,
            NotesCommands::Add {
                name,
                description,
                image,
            } => run_add(app, &name, description.as_deref(), image.as_deref()).await,
            NotesCommands::Delete { id } => run_delete(app, &id).await,
        },
        Commands::Image { command } => match command {
            ImageCommands::Put { key, file, access } => {
                run_put(app, &key, &file, access.into()).await
            }
            ImageCommands::Get {
                key,
                output,
                access,
            } => run_get(app, &key, output.as_deref(), access.into()).await,
            ImageCommands::Rm { key, access } => run_rm(app, &key, access.into()).await,
        },
    }
}
