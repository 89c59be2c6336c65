//! Command dispatch: bridges CLI args -> `Synchronizer` workflows -> output formatting.

pub mod bulletin;
pub mod campaigns;
pub mod cities;
pub mod config_cmd;
pub mod contacts;
pub mod segments;
pub mod send;
pub mod templates;
pub mod util;
pub mod weather;

use climasync_core::{Settings, Synchronizer};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a Mautic-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    sync: &Synchronizer,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Contacts(args) => contacts::handle(sync, settings, args, global).await,
        Command::Cities(args) => cities::handle(sync, settings, args, global).await,
        Command::Companies(args) => cities::handle_companies(sync, args, global).await,
        Command::Segments(args) => segments::handle(sync, args, global).await,
        Command::Emails(args) => templates::handle_emails(sync, args, global).await,
        Command::Sms(args) => templates::handle_sms(sync, args, global).await,
        Command::Campaigns(args) => campaigns::handle(sync, args, global).await,
        Command::Weather(args) => weather::handle(sync, args, global).await,
        Command::Send(args) => send::handle(sync, args, global).await,
        Command::Bulletin(args) => bulletin::handle(sync, settings, args, global).await,
        // Config, Completions and the campaign trigger are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a Mautic connection".into(),
        )),
    }
}
