use tracing::{info, warn};

use super::Synchronizer;
use crate::reconcile::FieldMap;
use crate::record::fields;
use crate::resource::{ContactKey, MauticResource};
use crate::tally::Tally;
use crate::templates::date_only;

impl Synchronizer {
    /// Write the current temperature of a subscriber's first two cities
    /// onto the contact (`temperature1`, `temperature2`, `datenow`).
    ///
    /// Only fields whose value changed are patched.
    pub async fn enrich_weather(&self) -> Tally {
        let mut tally = Tally::default();
        let subscribed = match self.subscribed_contacts().await {
            Ok(subscribed) => subscribed,
            Err(e) => {
                warn!(error = %e, "cannot list subscribed contacts");
                tally.error();
                return tally;
            }
        };
        let resource = MauticResource::contacts(&self.client, ContactKey::Email);
        let reconciler = self.reconciler();

        for (record, contact) in subscribed {
            let mut cities = contact.cities.iter();
            let Some(first) = cities.next() else {
                warn!(contact = %contact.id, "no cities defined");
                tally.error();
                continue;
            };
            let Some(reading) = self.weather.reading(first).await else {
                tally.error();
                continue;
            };

            let mut desired = FieldMap::new();
            if let Some(time) = reading.time.as_deref() {
                desired.insert(fields::DATE_NOW.into(), date_only(time).into());
            }
            desired.insert(
                fields::TEMPERATURE_1.into(),
                reading.temperature.to_string().into(),
            );
            if let Some(second) = cities.next() {
                match self.weather.reading(second).await {
                    Some(r) => {
                        desired.insert(fields::TEMPERATURE_2.into(), r.temperature.to_string().into());
                    }
                    None => warn!(contact = %contact.id, city = %second, "second city has no reading"),
                }
            }

            tally.record(reconciler.reconcile(&resource, &record, &desired).await.outcome);
        }

        info!(
            updated = tally.updated,
            unchanged = tally.unchanged,
            errors = tally.errors,
            "weather enrichment finished"
        );
        tally
    }
}
