//! Segment command handlers.

use tabled::Tabled;

use climasync_core::{Segment, Synchronizer};

use crate::cli::{GlobalOpts, SegmentsArgs, SyncCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Segment> for SegmentRow {
    fn from(s: &Segment) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            description: util::truncate(s.description.as_deref().unwrap_or_default(), 60),
        }
    }
}

pub async fn handle(
    sync: &Synchronizer,
    args: SegmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SyncCommand::Sync => {
            let report = sync.sync_segments().await;
            let s = report.segments;
            let counts = [
                ("segments.created", s.created),
                ("segments.updated", s.updated),
                ("segments.unchanged", s.unchanged),
                ("segments.errors", s.errors),
                ("memberships", report.memberships),
                ("membership_errors", report.membership_errors),
                ("skipped_contacts", report.skipped_contacts),
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

        SyncCommand::List => {
            let segments = sync.list::<Segment>().await?;
            let out = output::render_list(
                &global.output,
                &segments,
                |s| SegmentRow::from(s),
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
