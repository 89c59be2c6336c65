// Mautic action endpoints
//
// Calls that act on a pair of records rather than a single resource:
// segment membership and one-off sends of email/SMS templates.

use tracing::debug;

use super::client::MauticClient;
use crate::error::Error;

impl MauticClient {
    /// Add a contact to a segment.
    ///
    /// `POST /api/segments/{segment_id}/contact/{contact_id}/add`.
    /// Mautic treats repeated additions as no-ops.
    pub async fn add_contact_to_segment(
        &self,
        segment_id: &str,
        contact_id: &str,
    ) -> Result<(), Error> {
        debug!(segment_id, contact_id, "adding contact to segment");
        self.post_no_body(&format!("segments/{segment_id}/contact/{contact_id}/add"))
            .await
    }

    /// Send an email template to one contact.
    ///
    /// `POST /api/emails/{email_id}/contact/{contact_id}/send`
    pub async fn send_email(&self, email_id: &str, contact_id: &str) -> Result<(), Error> {
        debug!(email_id, contact_id, "sending email");
        self.post_no_body(&format!("emails/{email_id}/contact/{contact_id}/send"))
            .await
    }

    /// Send an SMS template to one contact.
    ///
    /// `GET /api/smses/{sms_id}/contact/{contact_id}/send` (Mautic exposes
    /// this one as a GET).
    pub async fn send_sms(&self, sms_id: &str, contact_id: &str) -> Result<(), Error> {
        debug!(sms_id, contact_id, "sending sms");
        self.get_no_response(&format!("smses/{sms_id}/contact/{contact_id}/send"))
            .await
    }
}
