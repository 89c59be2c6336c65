use std::collections::BTreeSet;

use tracing::{info, warn};

use super::Synchronizer;
use crate::error::CoreError;
use crate::naming;
use crate::reconcile::Desired;
use crate::record::{Contact, fields};
use crate::resource::MauticResource;
use crate::tally::Tally;
use crate::templates::{EmailLayout, sms_text};

impl Synchronizer {
    /// Distinct cities across all contacts, one per template name.
    ///
    /// `None` when the contact listing failed.
    async fn template_cities(&self) -> Option<Vec<(String, String)>> {
        let contacts = match self.list::<Contact>().await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(error = %e, "cannot list contacts");
                return None;
            }
        };
        let cities: BTreeSet<String> = contacts.into_iter().flat_map(|c| c.cities).collect();

        let mut named: Vec<(String, String)> = Vec::new();
        for city in cities {
            let name = naming::template_name(&self.bulletin.template_prefix, &city);
            if named.iter().all(|(_, n)| *n != name) {
                named.push((city, name));
            }
        }
        info!(count = named.len(), "cities found on contacts");
        Some(named)
    }

    /// Create or refresh one email template per city.
    ///
    /// The template body carries today's temperature, so an existing
    /// template is patched whenever the reading changed.
    pub async fn sync_email_templates(&self) -> Result<Tally, CoreError> {
        let layout = EmailLayout::load(self.bulletin.email_template.as_deref())?;
        let resource = MauticResource::emails(&self.client);
        let reconciler = self.reconciler();
        let mut tally = Tally::default();
        let Some(cities) = self.template_cities().await else {
            tally.error();
            return Ok(tally);
        };

        for (city, name) in cities {
            let Some(reading) = self.weather.reading(&city).await else {
                tally.error();
                continue;
            };
            let html = match layout.render(&city, &reading) {
                Ok(html) => html,
                Err(e) => {
                    warn!(city, error = %e, "cannot render email");
                    tally.error();
                    continue;
                }
            };

            let desired = Desired::new(&name)
                .field(fields::CUSTOM_HTML, html)
                .create_only(fields::NAME, name.as_str())
                .create_only(fields::SUBJECT, self.bulletin.email_subject.as_str());
            tally.record(reconciler.upsert(&resource, &desired).await.outcome);
        }

        Ok(tally)
    }

    /// Create or refresh one SMS template per city.
    pub async fn sync_sms_templates(&self) -> Tally {
        let resource = MauticResource::smses(&self.client);
        let reconciler = self.reconciler();
        let mut tally = Tally::default();
        let Some(cities) = self.template_cities().await else {
            tally.error();
            return tally;
        };

        for (city, name) in cities {
            let Some(reading) = self.weather.reading(&city).await else {
                tally.error();
                continue;
            };

            let desired = Desired::new(&name)
                .field(fields::MESSAGE, sms_text(&city, &reading))
                .create_only(fields::NAME, name.as_str());
            tally.record(reconciler.upsert(&resource, &desired).await.outcome);
        }

        tally
    }
}
