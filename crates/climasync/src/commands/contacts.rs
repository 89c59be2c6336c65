//! Contact command handlers.

use tabled::Tabled;

use climasync_core::{Contact, Settings, Synchronizer};

use crate::cli::{ContactsArgs, ContactsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Mobile")]
    mobile: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bulletin")]
    subscribed: String,
    #[tabled(rename = "Cities")]
    cities: String,
}

impl From<&Contact> for ContactRow {
    fn from(c: &Contact) -> Self {
        Self {
            id: c.id.to_string(),
            email: c.email.clone().unwrap_or_default(),
            mobile: c.mobile.clone().unwrap_or_default(),
            name: c.firstname.clone().unwrap_or_default(),
            subscribed: if c.subscribed { "yes" } else { "no" }.into(),
            cities: c.cities.join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    sync: &Synchronizer,
    settings: &Settings,
    args: ContactsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ContactsCommand::Import(import) => {
            let users = util::read_users(import.users_file, settings)?;
            let tally = sync
                .import_contacts(&users, &settings.source.mapping, import.match_by.into())
                .await;
            let out = output::render_counts(
                &global.output,
                &tally,
                &util::tally_counts(&tally),
                output::should_color(&global.color),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContactsCommand::List => {
            let contacts = sync.list::<Contact>().await?;
            let out = output::render_list(
                &global.output,
                &contacts,
                |c| ContactRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
