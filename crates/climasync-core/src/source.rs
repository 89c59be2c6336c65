//! Local users export.
//!
//! The source is a JSON array of flat objects with the exporter's own key
//! names. [`FieldMapping`] translates those keys into Mautic field aliases.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CoreError;
use crate::naming::split_cities;
use crate::reconcile::FieldMap;
use crate::record::fields;

/// One user from the export.
pub type SourceUser = Map<String, Value>;

/// Read the users file.
pub fn load_users(path: &Path) -> Result<Vec<SourceUser>, CoreError> {
    let source_err = |reason: String| CoreError::Source {
        path: path.display().to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| source_err(e.to_string()))?;
    let users: Vec<SourceUser> =
        serde_json::from_str(&raw).map_err(|e| source_err(e.to_string()))?;
    debug!(path = %path.display(), count = users.len(), "loaded users");
    Ok(users)
}

/// Mautic field alias → local key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(IndexMap<String, String>);

impl Default for FieldMapping {
    fn default() -> Self {
        [
            (fields::FIRSTNAME, "name"),
            (fields::LASTNAME, "last_name"),
            (fields::EMAIL, "mail"),
            (fields::MOBILE, "phone_mobile"),
            ("mobilewithoutplus", "phone_mobile_withous_plus"),
            (fields::FORECAST_BULLETIN, "forecast_bulletin"),
            (fields::CLIMA_BULLETIN, "clima_bulletin"),
            (fields::CITIES, "cities"),
        ]
        .into_iter()
        .map(|(remote, local)| (remote.to_owned(), local.to_owned()))
        .collect()
    }
}

impl FromIterator<(String, String)> for FieldMapping {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FieldMapping {
    /// Local key feeding the given Mautic field.
    pub fn local_key(&self, remote: &str) -> Option<&str> {
        self.0.get(remote).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(r, l)| (r.as_str(), l.as_str()))
    }

    /// Every mapped Mautic field with the user's raw value (null if absent).
    pub fn desired_fields(&self, user: &SourceUser) -> FieldMap {
        self.0
            .iter()
            .map(|(remote, local)| {
                (
                    remote.clone(),
                    user.get(local).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

/// Distinct city names across all users, sorted.
///
/// Accepts either a JSON array or a `-`-joined string under `key`.
pub fn unique_cities(users: &[SourceUser], key: &str) -> Vec<String> {
    let mut cities = BTreeSet::new();
    for user in users {
        match user.get(key) {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(city) = item.as_str().map(str::trim).filter(|c| !c.is_empty()) {
                        cities.insert(city.to_owned());
                    }
                }
            }
            Some(Value::String(joined)) => cities.extend(split_cities(joined)),
            _ => {}
        }
    }
    cities.into_iter().collect()
}
