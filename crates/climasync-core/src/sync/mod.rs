// ── Workflow orchestration ──
//
// `Synchronizer` owns the Mautic client, the weather service and the field
// schema, and exposes one method per command. Each workflow lives in its
// own file as an inherent `impl` block. All calls are awaited in sequence.

mod campaigns;
mod cities;
mod contacts;
mod enrich;
mod pipeline;
mod segments;
mod send;
mod templates;

pub use campaigns::CampaignReport;
pub use pipeline::BulletinReport;
pub use segments::SegmentReport;
pub use send::{Channel, SendReport};

use climasync_api::mautic::search;
use climasync_api::{Endpoint, MauticClient, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::normalize::Normalizer;
use crate::reconcile::Reconciler;
use crate::record::{Contact, RemoteRecord, TypedRecord, fields};
use crate::settings::{BulletinConfig, Settings, TlsVerification};
use crate::weather::WeatherService;

/// Runs the bulletin workflows against one Mautic instance.
pub struct Synchronizer {
    client: MauticClient,
    weather: WeatherService,
    normalizer: Normalizer,
    bulletin: BulletinConfig,
    page_size: usize,
}

impl Synchronizer {
    /// Build clients from settings.
    pub fn new(settings: &Settings) -> Result<Self, CoreError> {
        let tls = match &settings.mautic.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(settings.mautic.timeout);

        let client = MauticClient::new(
            settings.mautic.url.as_str(),
            settings.mautic.username.clone(),
            settings.mautic.password.clone(),
            &transport,
        )?;
        let weather = WeatherService::new(&settings.weather)?;

        Ok(Self::from_parts(client, weather, settings.bulletin.clone())
            .with_page_size(settings.mautic.page_size))
    }

    /// Assemble from pre-built clients.
    pub fn from_parts(client: MauticClient, weather: WeatherService, bulletin: BulletinConfig) -> Self {
        Self {
            client,
            weather,
            normalizer: Normalizer::default(),
            bulletin,
            page_size: 100,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn client(&self) -> &MauticClient {
        &self.client
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn bulletin(&self) -> &BulletinConfig {
        &self.bulletin
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.normalizer)
    }

    // ── Listing ──────────────────────────────────────────────────────

    async fn fetch_all(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<Vec<RemoteRecord>, CoreError> {
        let raw = self.client.list_all(endpoint, params, self.page_size).await?;
        Ok(raw.into_iter().filter_map(RemoteRecord::from_value).collect())
    }

    /// Every record of a typed resource, skipping rows without an id.
    pub async fn list<T: TypedRecord>(&self) -> Result<Vec<T>, CoreError> {
        let records = self.fetch_all(T::KIND.endpoint(), &[]).await?;
        Ok(records.iter().filter_map(T::from_record).collect())
    }

    /// Contacts whose `climabulletin` opt-in is set, with their raw records.
    ///
    /// The server-side search is only a prefilter; the opt-in is re-checked
    /// locally so loose search matches are dropped.
    async fn subscribed_contacts(&self) -> Result<Vec<(RemoteRecord, Contact)>, CoreError> {
        let query = search(&format!("{}:1", fields::CLIMA_BULLETIN));
        let records = self.fetch_all(Endpoint::CONTACTS, &query).await?;
        Ok(records
            .into_iter()
            .filter_map(|r| Contact::from_record(&r).map(|c| (r, c)))
            .filter(|(_, c)| c.subscribed)
            .collect())
    }
}
