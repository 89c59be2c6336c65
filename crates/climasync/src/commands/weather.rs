//! Contact weather enrichment.

use climasync_core::Synchronizer;

use crate::cli::{GlobalOpts, WeatherArgs, WeatherCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    sync: &Synchronizer,
    args: WeatherArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WeatherCommand::Enrich => {
            let tally = sync.enrich_weather().await;
            let out = output::render_counts(
                &global.output,
                &tally,
                &util::tally_counts(&tally),
                output::should_color(&global.color),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
