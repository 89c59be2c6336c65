use tracing::info;

use super::Synchronizer;
use crate::reconcile::Desired;
use crate::record::fields;
use crate::resource::MauticResource;
use crate::source::{FieldMapping, SourceUser, unique_cities};
use crate::tally::Tally;

impl Synchronizer {
    /// Upsert one company per distinct city with its current temperature.
    pub async fn import_cities(&self, users: &[SourceUser], mapping: &FieldMapping) -> Tally {
        let key = mapping.local_key(fields::CITIES).unwrap_or(fields::CITIES);
        let cities = unique_cities(users, key);
        info!(count = cities.len(), "importing cities");

        let resource = MauticResource::companies(&self.client);
        let reconciler = self.reconciler();
        let mut tally = Tally::default();

        for city in cities {
            let Some(reading) = self.weather.reading(&city).await else {
                tally.error();
                continue;
            };
            let desired = Desired::new(&city)
                .field(fields::COMPANY_NAME, city.as_str())
                .field(fields::WEATHER, reading.temperature.to_string());
            tally.record(reconciler.upsert(&resource, &desired).await.outcome);
        }

        info!(
            created = tally.created,
            updated = tally.updated,
            unchanged = tally.unchanged,
            errors = tally.errors,
            "city import finished"
        );
        tally
    }
}
