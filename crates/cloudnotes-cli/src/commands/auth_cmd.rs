use cloudnotes_core::{SignInRequest, SignInStatus};

use crate::commands::common::App;
use crate::error::CliError;

pub async fn run_sign_in(app: &App, email: &str, password: &str) -> Result<(), CliError> {
    app.settle().await?;
    app.orchestrator
        .sign_in(SignInRequest::new(email.trim(), password))
        .finished()
        .await;

    // The request outcome is only logged; the provider's state tells whether it worked.
    let status = app.backend.auth().fetch_session().await?;
    if !status.is_signed_in {
        return Err(CliError::OperationFailed("Sign in"));
    }

    let model = app
        .wait_for(|model| model.is_signed_in() && !model.is_loading())
        .await?;
    println!("Signed in as {} ({} notes)", email.trim(), model.notes().len());
    Ok(())
}

pub async fn run_sign_out(app: &App) -> Result<(), CliError> {
    let model = app.settle().await?;
    if !model.is_signed_in() {
        println!("Already signed out");
        return Ok(());
    }

    app.orchestrator.sign_out().finished().await;
    let status = app.backend.auth().fetch_session().await?;
    if status.is_signed_in {
        return Err(CliError::OperationFailed("Sign out"));
    }

    app.wait_for(|model| model.status() == SignInStatus::SignedOut)
        .await?;
    println!("Signed out");
    Ok(())
}
