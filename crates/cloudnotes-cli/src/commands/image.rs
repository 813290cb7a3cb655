use std::io::{self, Write};
use std::path::Path;

use cloudnotes_core::AccessLevel;
use tokio::sync::oneshot;

use crate::commands::common::App;
use crate::error::CliError;

async fn ensure_access(app: &App, access: AccessLevel) -> Result<(), CliError> {
    if access == AccessLevel::Guest {
        app.settle().await?;
    } else {
        app.require_signed_in().await?;
    }
    Ok(())
}

pub async fn run_put(
    app: &App,
    key: &str,
    file: &Path,
    access: AccessLevel,
) -> Result<(), CliError> {
    let bytes = tokio::fs::read(file).await?;
    ensure_access(app, access).await?;

    let size = bytes.len();
    app.backend.storage().upload(key, bytes, access).await?;
    println!("Stored {key} ({size} bytes)");
    Ok(())
}

pub async fn run_get(
    app: &App,
    key: &str,
    output: Option<&Path>,
    access: AccessLevel,
) -> Result<(), CliError> {
    ensure_access(app, access).await?;

    let (bytes_tx, bytes_rx) = oneshot::channel();
    let _download = app.orchestrator.retrieve_image(key, access, move |bytes| {
        let _ = bytes_tx.send(bytes);
    });
    // The callback is dropped unused when the download fails.
    let bytes = bytes_rx
        .await
        .map_err(|_| CliError::OperationFailed("Image download"))?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &bytes).await?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub async fn run_rm(app: &App, key: &str, access: AccessLevel) -> Result<(), CliError> {
    ensure_access(app, access).await?;
    app.backend.storage().remove(key, access).await?;
    println!("Removed {key}");
    Ok(())
}
