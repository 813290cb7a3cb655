use crate::commands::common::{describe_status, App};
use crate::error::CliError;

pub async fn run_status(app: &App) -> Result<(), CliError> {
    if !app.is_configured() {
        println!("Backend not configured; sign-in status unknown");
        return Ok(());
    }

    let model = app.settle().await?;
    println!("{}", describe_status(&model));
    Ok(())
}

/// Print the model every time it changes, until Ctrl-C.
pub async fn run_watch(app: &App) -> Result<(), CliError> {
    let mut model = app.orchestrator.model();
    println!("{}", describe_status(&model.borrow_and_update()));

    loop {
        tokio::select! {
            changed = model.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", describe_status(&model.borrow_and_update()));
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }
    Ok(())
}
