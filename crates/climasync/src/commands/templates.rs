//! Email and SMS template handlers.

use tabled::Tabled;

use climasync_core::{EmailTemplate, SmsTemplate, Synchronizer, Tally};

use crate::cli::{GlobalOpts, SyncCommand, TemplatesArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EmailRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Subject")]
    subject: String,
}

impl From<&EmailTemplate> for EmailRow {
    fn from(e: &EmailTemplate) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            subject: e.subject.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct SmsRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&SmsTemplate> for SmsRow {
    fn from(s: &SmsTemplate) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            message: util::truncate(s.message.as_deref().unwrap_or_default(), 60),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

fn print_tally(tally: &Tally, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_counts(
        &global.output,
        tally,
        &util::tally_counts(tally),
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_emails(
    sync: &Synchronizer,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SyncCommand::Sync => print_tally(&sync.sync_email_templates().await?, global),

        SyncCommand::List => {
            let emails = sync.list::<EmailTemplate>().await?;
            let out = output::render_list(
                &global.output,
                &emails,
                |e| EmailRow::from(e),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

pub async fn handle_sms(
    sync: &Synchronizer,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SyncCommand::Sync => print_tally(&sync.sync_sms_templates().await, global),

        SyncCommand::List => {
            let smses = sync.list::<SmsTemplate>().await?;
            let out = output::render_list(
                &global.output,
                &smses,
                |s| SmsRow::from(s),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
