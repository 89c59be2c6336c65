//! Bulletin delivery.

use climasync_core::{Channel, Synchronizer};

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    sync: &Synchronizer,
    args: SendArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let channel = Channel::from(args.channel);
    let prompt = format!(
        "Send {channel} template {} to every subscribed contact?",
        args.template_id
    );
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    let report = sync.send_bulletin(channel, &args.template_id).await;
    let counts = [
        ("recipients", report.recipients),
        ("sent", report.sent),
        ("errors", report.errors),
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
