//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use climasync_core::{Settings, SourceUser, Tally, load_users};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Load the users export named by `--users-file` or `[source] users_file`.
pub fn read_users(
    flag: Option<PathBuf>,
    settings: &Settings,
) -> Result<Vec<SourceUser>, CliError> {
    let path = flag.unwrap_or_else(|| settings.source.users_file.clone());
    tracing::debug!(path = %path.display(), "loading users");
    Ok(load_users(&path)?)
}

pub fn tally_counts(tally: &Tally) -> [(&'static str, u32); 4] {
    [
        ("created", tally.created),
        ("updated", tally.updated),
        ("unchanged", tally.unchanged),
        ("errors", tally.errors),
    ]
}

/// Cut long free text for table cells.
pub fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
