//! Full bulletin pipeline.

use climasync_core::{Settings, Synchronizer, Tally};

use crate::cli::{GlobalOpts, ImportArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn prefixed(prefix: &'static str, tally: &Tally) -> [(String, u32); 4] {
    util::tally_counts(tally).map(|(name, n)| (format!("{prefix}.{name}"), n))
}

pub async fn handle(
    sync: &Synchronizer,
    settings: &Settings,
    args: ImportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let users = util::read_users(args.users_file, settings)?;
    let report = sync
        .run_bulletin(&users, &settings.source.mapping, args.match_by.into())
        .await?;

    let mut owned: Vec<(String, u32)> = Vec::new();
    owned.extend(prefixed("contacts", &report.contacts));
    owned.extend(prefixed("segments", &report.segments.segments));
    owned.push(("memberships".into(), report.segments.memberships));
    owned.push(("membership_errors".into(), report.segments.membership_errors));
    owned.extend(prefixed("emails", &report.emails));
    owned.extend(prefixed("sms", &report.sms));
    let counts: Vec<(&str, u32)> = owned.iter().map(|(n, c)| (n.as_str(), *c)).collect();

    let out = output::render_counts(
        &global.output,
        &report,
        &counts,
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
