// Wire shapes shared by every Mautic collection endpoint.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Route and envelope keys for one Mautic resource.
///
/// Mautic names the collection and single-item envelopes differently per
/// resource (segments live under `lists` / `list`, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path segment under `/api/`.
    pub path: &'static str,
    /// Key holding the records in list responses.
    pub collection: &'static str,
    /// Key holding the record in create/edit responses.
    pub item: &'static str,
}

impl Endpoint {
    pub const CONTACTS: Self = Self {
        path: "contacts",
        collection: "contacts",
        item: "contact",
    };
    pub const COMPANIES: Self = Self {
        path: "companies",
        collection: "companies",
        item: "company",
    };
    pub const SEGMENTS: Self = Self {
        path: "segments",
        collection: "lists",
        item: "list",
    };
    pub const EMAILS: Self = Self {
        path: "emails",
        collection: "emails",
        item: "email",
    };
    pub const SMSES: Self = Self {
        path: "smses",
        collection: "smses",
        item: "sms",
    };
    pub const CAMPAIGNS: Self = Self {
        path: "campaigns",
        collection: "campaigns",
        item: "campaign",
    };
}

/// A list payload as Mautic returns it.
///
/// Depending on version and resource, records arrive keyed by id
/// (`{"12": {...}}`) or as a plain array. Empty collections are `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordSet {
    Keyed(IndexMap<String, Value>),
    List(Vec<Value>),
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl RecordSet {
    /// Flatten into records, preserving the server's order.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Keyed(map) => map.into_values().collect(),
            Self::List(list) => list,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Keyed(map) => map.len(),
            Self::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mautic error envelope: `{"errors": [{"message": "...", "code": 404}]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub message: Option<String>,
}
