//! Campaign creation and the console-driven trigger.

use std::time::Duration;

use climasync_config::Config;
use climasync_core::trigger::console;
use climasync_core::{
    CampaignReport, ConsoleConfig, RetryPolicy, Synchronizer, trigger_campaigns,
};

use crate::cli::{CampaignsArgs, CampaignsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn print_report(report: &CampaignReport, global: &GlobalOpts) -> Result<(), CliError> {
    let counts = [
        ("created", report.created),
        ("skipped", report.skipped),
        ("errors", report.errors),
    ];
    let out = output::render_counts(
        &global.output,
        report,
        &counts,
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    sync: &Synchronizer,
    args: CampaignsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CampaignsCommand::Create { city: Some(city) } => {
            let report = sync.create_campaign(&city).await;
            print_report(&report, global)
        }

        CampaignsCommand::Create { city: None } => {
            let report = sync.create_campaigns().await;
            print_report(&report, global)
        }

        CampaignsCommand::Trigger { .. } => Err(CliError::Internal(
            "campaign trigger does not use the Mautic API".into(),
        )),
    }
}

/// Run the trigger sequence through the configured console.
pub async fn trigger(
    cfg: &Config,
    attempts: Option<u32>,
    delay: Option<u64>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let console_config = ConsoleConfig::from(&cfg.console);
    let mut policy = RetryPolicy::from(&console_config);
    if let Some(n) = attempts {
        policy.max_attempts = n.max(1);
    }
    if let Some(secs) = delay {
        policy.delay = Duration::from_secs(secs);
    }

    let runner = console(&console_config);
    tracing::debug!(command = %runner.command_line("<command>"), "console launcher");
    let report = trigger_campaigns(&runner, &policy).await;

    let counts = [
        ("attempts", report.attempts),
        ("drained", u32::from(report.drained)),
        ("failures", report.failures),
    ];
    let out = output::render_counts(
        &global.output,
        &report,
        &counts,
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
