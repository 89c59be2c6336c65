//! City import and company listing.

use tabled::Tabled;

use climasync_core::{Company, Settings, Synchronizer};

use crate::cli::{CitiesArgs, CitiesCommand, CompaniesArgs, GlobalOpts, ListOnly};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CompanyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Weather (°C)")]
    weather: String,
}

impl From<&Company> for CompanyRow {
    fn from(c: &Company) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone().unwrap_or_default(),
            weather: c.weather.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(
    sync: &Synchronizer,
    settings: &Settings,
    args: CitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CitiesCommand::Import { users_file } => {
            let users = util::read_users(users_file, settings)?;
            let tally = sync.import_cities(&users, &settings.source.mapping).await;
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

pub async fn handle_companies(
    sync: &Synchronizer,
    args: CompaniesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ListOnly::List => {
            let companies = sync.list::<Company>().await?;
            let out = output::render_list(
                &global.output,
                &companies,
                |c| CompanyRow::from(c),
                |c| c.name.clone().unwrap_or_else(|| c.id.to_string()),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
