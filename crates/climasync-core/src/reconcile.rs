// ── Idempotent upsert ──
//
// One generic create-or-update path shared by every resource. A desired
// entity is resolved by its natural key; when found, only the fields whose
// normalized values differ are patched, and an empty diff touches nothing.

use std::future::Future;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::normalize::Normalizer;
use crate::record::{RecordId, RemoteRecord};

/// Ordered field name → value mapping, as sent on the wire.
pub type FieldMap = IndexMap<String, Value>;

// ── Desired state ───────────────────────────────────────────────────

/// What a record should look like after reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Desired {
    /// Natural key; `None` when the source had nothing usable.
    pub key: Option<String>,
    /// Fields compared against the existing record.
    pub fields: FieldMap,
    /// Fields sent only when the record is created.
    pub create_only: FieldMap,
}

impl Desired {
    /// Blank keys are stored as `None`.
    pub fn new(key: &str) -> Self {
        let key = key.trim();
        Self {
            key: (!key.is_empty()).then(|| key.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    pub fn create_only(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.create_only.insert(name.to_owned(), value.into());
        self
    }
}

/// Fields whose normalized desired value differs from the remote one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diff(FieldMap);

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> FieldMap {
        self.0
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
    Error,
}

/// Result of one upsert: what happened, and the record id when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub outcome: Outcome,
    pub id: Option<RecordId>,
}

impl Upserted {
    fn new(outcome: Outcome, id: Option<RecordId>) -> Self {
        Self { outcome, id }
    }

    fn error(id: Option<RecordId>) -> Self {
        Self::new(Outcome::Error, id)
    }
}

// ── Resource capability ─────────────────────────────────────────────

/// The three remote operations an upsert needs.
pub trait Resource {
    /// Singular noun for log lines ("contact", "segment").
    fn label(&self) -> &str;

    /// Find the record whose natural key matches `key`.
    fn resolve(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<RemoteRecord>, CoreError>> + Send;

    /// Create a record, returning its id when the response carries one.
    fn create(
        &self,
        body: &FieldMap,
    ) -> impl Future<Output = Result<Option<RecordId>, CoreError>> + Send;

    /// Patch `id` with exactly the fields in `diff`.
    fn update(&self, id: &RecordId, diff: &Diff)
    -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── Reconciler ──────────────────────────────────────────────────────

/// Runs upserts against any [`Resource`] using one field schema.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    normalizer: &'a Normalizer,
}

impl<'a> Reconciler<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        Self { normalizer }
    }

    /// Compare each desired field against the record's stored value.
    pub fn diff(&self, desired: &FieldMap, existing: &RemoteRecord) -> Diff {
        let mut diff = FieldMap::new();
        for (field, raw) in desired {
            let want = self.normalizer.normalize(field, Some(raw));
            let have = self.normalizer.normalize(field, existing.field(field));
            if want != have {
                diff.insert(field.clone(), want.to_value());
            }
        }
        Diff(diff)
    }

    /// Normalized reconciled fields followed by the create-only ones.
    pub fn create_body(&self, desired: &Desired) -> FieldMap {
        let mut body: FieldMap = desired
            .fields
            .iter()
            .map(|(field, raw)| {
                (
                    field.clone(),
                    self.normalizer.normalize(field, Some(raw)).to_value(),
                )
            })
            .collect();
        for (field, value) in &desired.create_only {
            body.entry(field.clone()).or_insert_with(|| value.clone());
        }
        body
    }

    /// Create `desired` if it does not exist, otherwise patch what differs.
    ///
    /// Never fails: every problem is logged and reported as
    /// [`Outcome::Error`]. A failed lookup counts as "not found", so an
    /// unreachable list endpoint can lead to a duplicate create.
    pub async fn upsert<R>(&self, resource: &R, desired: &Desired) -> Upserted
    where
        R: Resource + Sync,
    {
        let label = resource.label();
        let Some(key) = desired.key.as_deref() else {
            warn!(resource = label, "skipping record without a natural key");
            return Upserted::error(None);
        };

        let existing = match resource.resolve(key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(resource = label, key, error = %e, "lookup failed, treating as not found");
                None
            }
        };

        match existing {
            Some(record) => self.reconcile(resource, &record, &desired.fields).await,
            None => {
                let body = self.create_body(desired);
                match resource.create(&body).await {
                    Ok(id) => {
                        info!(resource = label, key, id = ?id.as_ref().map(RecordId::as_str), "created");
                        Upserted::new(Outcome::Created, id)
                    }
                    Err(e) => {
                        warn!(resource = label, key, error = %e, "create failed");
                        Upserted::error(None)
                    }
                }
            }
        }
    }

    /// Patch an already-resolved record with whatever differs from `desired`.
    pub async fn reconcile<R>(
        &self,
        resource: &R,
        existing: &RemoteRecord,
        desired: &FieldMap,
    ) -> Upserted
    where
        R: Resource + Sync,
    {
        let label = resource.label();
        let Some(id) = existing.id().cloned() else {
            warn!(resource = label, "existing record has no id");
            return Upserted::error(None);
        };

        let diff = self.diff(desired, existing);
        if diff.is_empty() {
            info!(resource = label, id = %id, "unchanged");
            return Upserted::new(Outcome::Unchanged, Some(id));
        }

        match resource.update(&id, &diff).await {
            Ok(()) => {
                let changed: Vec<&str> = diff.fields().collect();
                info!(resource = label, id = %id, fields = ?changed, "updated");
                Upserted::new(Outcome::Updated, Some(id))
            }
            Err(e) => {
                warn!(resource = label, id = %id, error = %e, "update failed");
                Upserted::error(Some(id))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::record::fields;
    use crate::resolve::same_key;

    /// In-memory resource keyed on top-level `email`.
    #[derive(Default)]
    struct Memory {
        records: Mutex<Vec<serde_json::Map<String, Value>>>,
        creates: Mutex<u32>,
        updates: Mutex<Vec<FieldMap>>,
        fail_lookup: bool,
    }

    impl Memory {
        fn with(records: Vec<Value>) -> Self {
            let records = records
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect();
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        fn creates(&self) -> u32 {
            *self.creates.lock().unwrap()
        }

        fn updates(&self) -> Vec<FieldMap> {
            self.updates.lock().unwrap().clone()
        }
    }

    impl Resource for Memory {
        fn label(&self) -> &str {
            "contact"
        }

        async fn resolve(&self, key: &str) -> Result<Option<RemoteRecord>, CoreError> {
            if self.fail_lookup {
                return Err(CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                });
            }
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .map(|m| RemoteRecord::from_map(m.clone()))
                .find(|r| r.text(fields::EMAIL).is_some_and(|e| same_key(&e, key))))
        }

        async fn create(&self, body: &FieldMap) -> Result<Option<RecordId>, CoreError> {
            let mut records = self.records.lock().unwrap();
            let id = records.len() + 1;
            let mut map: serde_json::Map<String, Value> =
                body.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            map.insert("id".into(), json!(id));
            records.push(map);
            *self.creates.lock().unwrap() += 1;
            Ok(Some(RecordId::new(id.to_string())))
        }

        async fn update(&self, id: &RecordId, diff: &Diff) -> Result<(), CoreError> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|m| m.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
                .unwrap();
            for (k, v) in diff.clone().into_inner() {
                record.insert(k, v);
            }
            self.updates.lock().unwrap().push(diff.clone().into_inner());
            Ok(())
        }
    }

    fn ana() -> Desired {
        Desired::new("ana@example.com")
            .field(fields::EMAIL, "ana@example.com")
            .field(fields::CLIMA_BULLETIN, "1")
            .field(fields::CITIES, json!(["Lima", "Cusco"]))
    }

    #[tokio::test]
    async fn create_then_unchanged() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let store = Memory::default();

        let first = reconciler.upsert(&store, &ana()).await;
        assert_eq!(first.outcome, Outcome::Created);
        assert_eq!(first.id, Some(RecordId::new("1")));

        let second = reconciler.upsert(&store, &ana()).await;
        assert_eq!(second.outcome, Outcome::Unchanged);
        assert_eq!(store.creates(), 1);
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn created_body_is_normalized_with_create_only_fields() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let body = reconciler.create_body(&ana().create_only("description", "x"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "email": "ana@example.com",
                "climabulletin": true,
                "cities": "Lima-Cusco",
                "description": "x"
            })
        );
    }

    #[tokio::test]
    async fn equivalent_remote_values_are_unchanged() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let store = Memory::with(vec![json!({
            "id": 9,
            "email": "ana@example.com",
            "fields": {"custom": {
                "climabulletin": {"value": true},
                "cities": {"value": "Lima-Cusco"}
            }}
        })]);

        let result = reconciler.upsert(&store, &ana()).await;
        assert_eq!(result.outcome, Outcome::Unchanged);
        assert_eq!(result.id, Some(RecordId::new("9")));
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn only_changed_fields_are_patched() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let store = Memory::with(vec![json!({
            "id": 3,
            "email": "ana@example.com",
            "climabulletin": "no",
            "cities": "Lima-Cusco"
        })]);

        let result = reconciler.upsert(&store, &ana()).await;
        assert_eq!(result.outcome, Outcome::Updated);

        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            serde_json::to_value(&updates[0]).unwrap(),
            json!({"climabulletin": true})
        );

        let again = reconciler.upsert(&store, &ana()).await;
        assert_eq!(again.outcome, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn missing_key_is_an_error_without_calls() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let store = Memory::default();

        let result = reconciler
            .upsert(&store, &Desired::new("   ").field("email", ""))
            .await;
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn failed_lookup_falls_through_to_create() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let store = Memory {
            fail_lookup: true,
            ..Memory::default()
        };

        let result = reconciler.upsert(&store, &ana()).await;
        assert_eq!(result.outcome, Outcome::Created);
    }

    #[test]
    fn diff_never_contains_equal_fields() {
        let normalizer = Normalizer::default();
        let reconciler = Reconciler::new(&normalizer);
        let existing = RemoteRecord::from_value(json!({
            "id": 1,
            "firstname": " Ana ",
            "climabulletin": 1,
            "forecastbulletin": "maybe",
            "cities": ["Lima"]
        }))
        .unwrap();
        let desired: FieldMap = [
            ("firstname", json!("Ana")),
            ("climabulletin", json!("yes")),
            ("forecastbulletin", json!(false)),
            ("cities", json!("Lima ")),
            ("lastname", json!("Diaz")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        let diff = reconciler.diff(&desired, &existing);
        let changed: Vec<&str> = diff.fields().collect();
        assert_eq!(changed, vec!["forecastbulletin", "lastname"]);
        for field in diff.fields() {
            assert_ne!(
                normalizer.normalize(field, diff.get(field)),
                normalizer.normalize(field, existing.field(field))
            );
        }
    }
}
