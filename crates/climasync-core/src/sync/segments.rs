use serde::Serialize;
use tracing::{info, warn};

use super::Synchronizer;
use crate::naming;
use crate::reconcile::Desired;
use crate::record::{Contact, fields};
use crate::resource::MauticResource;
use crate::tally::Tally;

/// Result of a segment sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentReport {
    /// Upserts, one per (contact, city) pair.
    pub segments: Tally,
    pub memberships: u32,
    pub membership_errors: u32,
    /// Contacts not subscribed or without cities.
    pub skipped_contacts: u32,
}

impl Synchronizer {
    /// Put every subscribed contact into one segment per city.
    ///
    /// Segments are created on first sight and never edited afterwards;
    /// membership adds are idempotent on the Mautic side. A failed contact
    /// listing is counted as one segment error.
    pub async fn sync_segments(&self) -> SegmentReport {
        let mut report = SegmentReport::default();
        let contacts = match self.list::<Contact>().await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(error = %e, "cannot list contacts");
                report.segments.error();
                return report;
            }
        };
        let resource = MauticResource::segments(&self.client);
        let reconciler = self.reconciler();

        for contact in contacts {
            if !contact.subscribed {
                info!(contact = %contact.id, "not subscribed to the weather bulletin");
                report.skipped_contacts += 1;
                continue;
            }
            if contact.cities.is_empty() {
                info!(contact = %contact.id, "no cities defined");
                report.skipped_contacts += 1;
                continue;
            }

            for (city, name) in naming::segment_names(&self.bulletin.segment_prefix, &contact.cities) {
                let desired = Desired::new(&name)
                    .create_only(fields::NAME, name.as_str())
                    .create_only(fields::DESCRIPTION, naming::segment_description(&city));
                let upserted = reconciler.upsert(&resource, &desired).await;
                report.segments.record(upserted.outcome);

                let Some(segment) = upserted.id else {
                    warn!(segment = %name, contact = %contact.id, "no segment id, membership skipped");
                    report.membership_errors += 1;
                    continue;
                };
                match self
                    .client
                    .add_contact_to_segment(segment.as_str(), contact.id.as_str())
                    .await
                {
                    Ok(()) => {
                        info!(segment = %name, contact = %contact.id, "contact added to segment");
                        report.memberships += 1;
                    }
                    Err(e) => {
                        warn!(segment = %name, contact = %contact.id, error = %e, "cannot add contact to segment");
                        report.membership_errors += 1;
                    }
                }
            }
        }

        report
    }
}
