// ── Remote records ──
//
// Mautic returns records as loose JSON. Contacts and companies nest their
// attributes under `fields.core.<name>.value` or `fields.custom.<name>.value`;
// segments and templates carry them at the top level. `RemoteRecord`
// hides that behind a single accessor, and the typed views below pull out
// what the CLI and workflows need.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::naming;
use crate::normalize::{FieldKind, NormalizedValue, normalize_as};
use crate::resource::ResourceKind;

/// Mautic field aliases used across the workflows.
pub mod fields {
    pub const EMAIL: &str = "email";
    pub const MOBILE: &str = "mobile";
    pub const FIRSTNAME: &str = "firstname";
    pub const LASTNAME: &str = "lastname";
    pub const FORECAST_BULLETIN: &str = "forecastbulletin";
    pub const CLIMA_BULLETIN: &str = "climabulletin";
    pub const CITIES: &str = "cities";
    pub const DATE_NOW: &str = "datenow";
    pub const TEMPERATURE_1: &str = "temperature1";
    pub const TEMPERATURE_2: &str = "temperature2";
    pub const COMPANY_NAME: &str = "companyname";
    pub const WEATHER: &str = "weather";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const SUBJECT: &str = "subject";
    pub const CUSTOM_HTML: &str = "customHtml";
    pub const MESSAGE: &str = "message";
}

/// Opaque remote identifier. Mautic sends numbers; we keep the text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an id from a JSON number or non-empty string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_owned())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record as returned by a list call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    id: Option<RecordId>,
    raw: Map<String, Value>,
}

impl RemoteRecord {
    /// Wrap a JSON object; anything else is not a record.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) => Some(Self::from_map(raw)),
            _ => None,
        }
    }

    pub fn from_map(raw: Map<String, Value>) -> Self {
        let id = raw.get("id").and_then(RecordId::from_value);
        Self { id, raw }
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// `fields.<group>.<name>.value`, ignoring nulls.
    fn grouped(&self, group: &str, name: &str) -> Option<&Value> {
        self.raw
            .get("fields")?
            .get(group)?
            .get(name)?
            .get("value")
            .filter(|v| !v.is_null())
    }

    /// Field value: core group first, then custom, then the top level.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.grouped("core", name)
            .or_else(|| self.grouped("custom", name))
            .or_else(|| self.raw.get(name).filter(|v| !v.is_null()))
    }

    /// Field value as trimmed text; `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        let text = normalize_as(FieldKind::Text, self.field(name)?).to_string();
        if text.is_empty() { None } else { Some(text) }
    }
}

// ── Typed views ─────────────────────────────────────────────────────

/// A record shape with a fixed Mautic resource behind it.
pub trait TypedRecord: Sized {
    const KIND: ResourceKind;

    /// `None` when the record has no id.
    fn from_record(record: &RemoteRecord) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub id: RecordId,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub firstname: Option<String>,
    /// Normalized `climabulletin` opt-in.
    pub subscribed: bool,
    pub cities: Vec<String>,
}

impl TypedRecord for Contact {
    const KIND: ResourceKind = ResourceKind::Contact;

    fn from_record(record: &RemoteRecord) -> Option<Self> {
        let subscribed = record
            .field(fields::CLIMA_BULLETIN)
            .map_or(NormalizedValue::Bool(false), |v| {
                normalize_as(FieldKind::Boolean, v)
            })
            .is_true();
        let cities = record
            .field(fields::CITIES)
            .map(|v| naming::split_cities(&normalize_as(FieldKind::List, v).to_string()))
            .unwrap_or_default();

        Some(Self {
            id: record.id()?.clone(),
            email: record.text(fields::EMAIL),
            mobile: record.text(fields::MOBILE),
            firstname: record.text(fields::FIRSTNAME),
            subscribed,
            cities,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: RecordId,
    pub name: Option<String>,
    pub weather: Option<String>,
}

impl TypedRecord for Company {
    const KIND: ResourceKind = ResourceKind::Company;

    fn from_record(record: &RemoteRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?.clone(),
            name: record.text(fields::COMPANY_NAME),
            weather: record.text(fields::WEATHER),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
}

impl TypedRecord for Segment {
    const KIND: ResourceKind = ResourceKind::Segment;

    fn from_record(record: &RemoteRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?.clone(),
            name: record.text(fields::NAME).unwrap_or_default(),
            description: record.text(fields::DESCRIPTION),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailTemplate {
    pub id: RecordId,
    pub name: String,
    pub subject: Option<String>,
}

impl TypedRecord for EmailTemplate {
    const KIND: ResourceKind = ResourceKind::Email;

    fn from_record(record: &RemoteRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?.clone(),
            name: record.text(fields::NAME).unwrap_or_default(),
            subject: record.text(fields::SUBJECT),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmsTemplate {
    pub id: RecordId,
    pub name: String,
    pub message: Option<String>,
}

impl TypedRecord for SmsTemplate {
    const KIND: ResourceKind = ResourceKind::Sms;

    fn from_record(record: &RemoteRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?.clone(),
            name: record.text(fields::NAME).unwrap_or_default(),
            message: record.text(fields::MESSAGE),
        })
    }
}
