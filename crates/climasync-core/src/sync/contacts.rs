use tracing::info;

use super::Synchronizer;
use crate::reconcile::Desired;
use crate::resource::{ContactKey, MauticResource};
use crate::source::{FieldMapping, SourceUser};
use crate::tally::Tally;

impl Synchronizer {
    /// Upsert every user from the export as a Mautic contact.
    ///
    /// Users are matched on `key` (email by default). Users without a
    /// usable key are counted as errors and skipped.
    pub async fn import_contacts(
        &self,
        users: &[SourceUser],
        mapping: &FieldMapping,
        key: ContactKey,
    ) -> Tally {
        let resource = MauticResource::contacts(&self.client, key);
        let reconciler = self.reconciler();
        let mut tally = Tally::default();

        for user in users {
            let fields = mapping.desired_fields(user);
            let natural = self
                .normalizer
                .normalize(key.field(), fields.get(key.field()))
                .to_string();
            let desired = Desired::new(&natural).with_fields(fields);
            tally.record(reconciler.upsert(&resource, &desired).await.outcome);
        }

        info!(
            created = tally.created,
            updated = tally.updated,
            unchanged = tally.unchanged,
            errors = tally.errors,
            "contact import finished"
        );
        tally
    }
}
