use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{info, warn};

use super::Synchronizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub recipients: u32,
    pub sent: u32,
    pub errors: u32,
}

impl Synchronizer {
    /// Send template `template_id` to every subscribed contact.
    pub async fn send_bulletin(
        &self,
        channel: Channel,
        template_id: &str,
    ) -> SendReport {
        let mut report = SendReport::default();
        let contacts = match self.subscribed_contacts().await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(%channel, error = %e, "cannot list subscribed contacts");
                report.errors += 1;
                return report;
            }
        };
        if contacts.is_empty() {
            info!(%channel, "no subscribed contacts");
            return report;
        }

        for (_, contact) in contacts {
            report.recipients += 1;
            let id = contact.id.as_str();
            let result = match channel {
                Channel::Email => self.client.send_email(template_id, id).await,
                Channel::Sms => self.client.send_sms(template_id, id).await,
            };
            match result {
                Ok(()) => {
                    info!(%channel, contact = id, "bulletin sent");
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(%channel, contact = id, error = %e, "cannot send bulletin");
                    report.errors += 1;
                }
            }
        }

        report
    }
}
