use serde::Serialize;
use tracing::info;

use super::Synchronizer;
use super::segments::SegmentReport;
use crate::error::CoreError;
use crate::resource::ContactKey;
use crate::source::{FieldMapping, SourceUser};
use crate::tally::Tally;

/// Combined result of the full bulletin run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulletinReport {
    pub contacts: Tally,
    pub segments: SegmentReport,
    pub emails: Tally,
    pub sms: Tally,
}

impl Synchronizer {
    /// Contacts, then segments, then email and SMS templates.
    pub async fn run_bulletin(
        &self,
        users: &[SourceUser],
        mapping: &FieldMapping,
        key: ContactKey,
    ) -> Result<BulletinReport, CoreError> {
        info!("importing contacts");
        let contacts = self.import_contacts(users, mapping, key).await;

        info!("syncing segments");
        let segments = self.sync_segments().await;

        info!("syncing email templates");
        let emails = self.sync_email_templates().await?;

        info!("syncing sms templates");
        let sms = self.sync_sms_templates().await;

        Ok(BulletinReport {
            contacts,
            segments,
            emails,
            sms,
        })
    }
}
