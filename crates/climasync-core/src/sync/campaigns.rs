use serde::Serialize;
use tracing::{info, warn};

use climasync_api::Endpoint;

use super::Synchronizer;
use crate::campaign::CampaignPlan;
use crate::naming;
use crate::reconcile::Resource;
use crate::record::{RecordId, Segment};
use crate::resource::MauticResource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    pub created: u32,
    /// Cities missing a segment or template.
    pub skipped: u32,
    pub errors: u32,
}

impl Synchronizer {
    /// One campaign per bulletin segment.
    ///
    /// Campaign creation is not idempotent: every run posts new campaigns.
    pub async fn create_campaigns(&self) -> CampaignReport {
        let prefix = &self.bulletin.segment_prefix;
        let mut report = CampaignReport::default();
        let segments = match self.list::<Segment>().await {
            Ok(segments) => segments,
            Err(e) => {
                warn!(error = %e, "cannot list segments");
                report.errors += 1;
                return report;
            }
        };

        for segment in &segments {
            let Some(city) = naming::city_from_segment(prefix, &segment.name) else {
                continue;
            };
            self.create_campaign_into(city, &mut report).await;
        }
        report
    }

    /// A campaign for a single city.
    pub async fn create_campaign(&self, city: &str) -> CampaignReport {
        let mut report = CampaignReport::default();
        self.create_campaign_into(naming::city_label(city), &mut report).await;
        report
    }

    async fn create_campaign_into(&self, city: &str, report: &mut CampaignReport) {
        let Some(plan) = self.plan_campaign(city).await else {
            report.skipped += 1;
            return;
        };

        match self.client.create(Endpoint::CAMPAIGNS, &plan.payload()).await {
            Ok(created) => {
                let id = created.get("id").and_then(RecordId::from_value);
                info!(city, id = ?id.as_ref().map(RecordId::as_str), "campaign created");
                report.created += 1;
            }
            Err(e) => {
                warn!(city, error = %e, "cannot create campaign");
                report.errors += 1;
            }
        }
    }

    /// Resolve the segment and both templates for `city`.
    async fn plan_campaign(&self, city: &str) -> Option<CampaignPlan> {
        let segment_name = naming::segment_name(&self.bulletin.segment_prefix, city);
        let template_name = naming::template_name(&self.bulletin.template_prefix, city);

        let segment = self
            .find_id(&MauticResource::segments(&self.client), &segment_name)
            .await?;
        let email = self
            .find_id(&MauticResource::emails(&self.client), &template_name)
            .await?;
        let sms = self
            .find_id(&MauticResource::smses(&self.client), &template_name)
            .await?;

        Some(CampaignPlan {
            city: city.to_owned(),
            segment,
            email,
            sms,
            webhook_url: self.bulletin.webhook_url.clone(),
        })
    }

    async fn find_id(&self, resource: &MauticResource<'_>, name: &str) -> Option<RecordId> {
        let found = match resource.resolve(name).await {
            Ok(found) => found,
            Err(e) => {
                warn!(resource = resource.label(), name, error = %e, "lookup failed");
                None
            }
        };
        let id = found.as_ref().and_then(|r| r.id()).cloned();
        if id.is_none() {
            info!(resource = resource.label(), name, "not found, skipping campaign");
        }
        id
    }
}
