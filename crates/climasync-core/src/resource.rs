// ── Mautic-backed resources ──
//
// One `Resource` implementation drives all five entity kinds; only the
// endpoint, the natural-key field and the lookup query differ.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use climasync_api::mautic::{search, where_eq};
use climasync_api::{Endpoint, MauticClient};

use crate::error::CoreError;
use crate::reconcile::{Diff, FieldMap, Resource};
use crate::record::{RecordId, RemoteRecord, fields};
use crate::resolve::select_exact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Contact,
    Company,
    Segment,
    Email,
    Sms,
    Campaign,
}

impl ResourceKind {
    pub fn endpoint(self) -> Endpoint {
        match self {
            Self::Contact => Endpoint::CONTACTS,
            Self::Company => Endpoint::COMPANIES,
            Self::Segment => Endpoint::SEGMENTS,
            Self::Email => Endpoint::EMAILS,
            Self::Sms => Endpoint::SMSES,
            Self::Campaign => Endpoint::CAMPAIGNS,
        }
    }

    /// Field holding the natural key.
    pub fn key_field(self) -> &'static str {
        match self {
            Self::Contact => fields::EMAIL,
            Self::Company => fields::COMPANY_NAME,
            Self::Segment | Self::Email | Self::Sms | Self::Campaign => fields::NAME,
        }
    }
}

/// Which natural key identifies a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContactKey {
    #[default]
    Email,
    Mobile,
}

impl ContactKey {
    pub fn field(self) -> &'static str {
        match self {
            Self::Email => fields::EMAIL,
            Self::Mobile => fields::MOBILE,
        }
    }
}

/// How candidates are fetched before exact matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    /// `where[0][col]=<key field>&where[0][expr]=eq&where[0][val]=<key>`
    Where,
    /// `search="<key>"`, quoted so the name is matched as one phrase
    Phrase,
    /// `search=<key field>:<key>`
    FieldSearch,
}

/// A Mautic collection addressed by one natural key.
pub struct MauticResource<'a> {
    client: &'a MauticClient,
    kind: ResourceKind,
    key_field: &'static str,
    lookup: Lookup,
}

impl<'a> MauticResource<'a> {
    fn new(client: &'a MauticClient, kind: ResourceKind, lookup: Lookup) -> Self {
        Self {
            client,
            kind,
            key_field: kind.key_field(),
            lookup,
        }
    }

    pub fn contacts(client: &'a MauticClient, key: ContactKey) -> Self {
        match key {
            ContactKey::Email => Self::new(client, ResourceKind::Contact, Lookup::Where),
            ContactKey::Mobile => Self {
                key_field: fields::MOBILE,
                ..Self::new(client, ResourceKind::Contact, Lookup::FieldSearch)
            },
        }
    }

    pub fn companies(client: &'a MauticClient) -> Self {
        Self::new(client, ResourceKind::Company, Lookup::Where)
    }

    pub fn segments(client: &'a MauticClient) -> Self {
        Self::new(client, ResourceKind::Segment, Lookup::Phrase)
    }

    pub fn emails(client: &'a MauticClient) -> Self {
        Self::new(client, ResourceKind::Email, Lookup::Where)
    }

    pub fn smses(client: &'a MauticClient) -> Self {
        Self::new(client, ResourceKind::Sms, Lookup::Where)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn query(&self, key: &str) -> Vec<(&'static str, String)> {
        match self.lookup {
            Lookup::Where => where_eq(self.key_field, key),
            Lookup::Phrase => search(&format!("\"{key}\"")),
            Lookup::FieldSearch => search(&format!("{}:{key}", self.key_field)),
        }
    }
}

impl Resource for MauticResource<'_> {
    fn label(&self) -> &str {
        match self.kind {
            ResourceKind::Contact => "contact",
            ResourceKind::Company => "company",
            ResourceKind::Segment => "segment",
            ResourceKind::Email => "email template",
            ResourceKind::Sms => "sms template",
            ResourceKind::Campaign => "campaign",
        }
    }

    async fn resolve(&self, key: &str) -> Result<Option<RemoteRecord>, CoreError> {
        let records = self
            .client
            .list(self.kind.endpoint(), &self.query(key))
            .await?;
        Ok(select_exact(records, self.key_field, key))
    }

    async fn create(&self, body: &FieldMap) -> Result<Option<RecordId>, CoreError> {
        let created = self.client.create(self.kind.endpoint(), body).await?;
        Ok(created.get("id").and_then(RecordId::from_value))
    }

    async fn update(&self, id: &RecordId, diff: &Diff) -> Result<(), CoreError> {
        self.client
            .edit(self.kind.endpoint(), id.as_str(), diff)
            .await?;
        Ok(())
    }
}
