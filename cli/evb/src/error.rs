//! Error handling and display for the CLI.

use colored::Colorize;
use eventboard_sync::{CommitError, FailureKind, SyncError};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Not authenticated. Run `evb auth login` to authenticate.")]
    NotAuthenticated,

    #[error("Invalid date {0:?}. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid {kind} ID: {source}")]
    InvalidId {
        kind: &'static str,
        #[source]
        source: eventboard_id::IdError,
    },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".dimmed(), cause);
    }

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(CliError::NotAuthenticated) = err.downcast_ref::<CliError>() {
        return Some("Run `evb auth login --token <TOKEN>` to authenticate.");
    }

    let sync_err = err
        .downcast_ref::<SyncError>()
        .or_else(|| err.downcast_ref::<CommitError>().map(|e| &e.error))?;

    match sync_err {
        SyncError::NotAuthenticated => {
            Some("Your session may have expired. Run `evb auth login`.")
        }
        SyncError::Api { status: 403, .. } => {
            Some("You may not have permission for this operation.")
        }
        SyncError::Api { status: 404, .. } => Some("The event may have been deleted."),
        SyncError::UnknownEvent(_) => Some("Run `evb events list` to see available events."),
        SyncError::Network(_) | SyncError::Timeout { .. } => {
            Some("Check your network connection and API endpoint (EVB_API_URL).")
        }
        other if other.kind() == FailureKind::Busy => {
            Some("Wait for the pending change to finish and try again.")
        }
        _ => None,
    }
}
