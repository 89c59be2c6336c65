//! Client-side natural-key matching.
//!
//! Mautic's `where`/`search` filters are loose (partial, accent- and
//! case-folding depending on the backend), so every candidate is re-checked
//! here before it counts as the same entity.

use serde_json::Value;

use crate::record::RemoteRecord;

/// Keys compare case-insensitively after trimming.
pub fn same_key(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// First record whose `field` exactly matches `key`.
pub fn select_exact(records: Vec<Value>, field: &str, key: &str) -> Option<RemoteRecord> {
    records
        .into_iter()
        .filter_map(RemoteRecord::from_value)
        .find(|record| record.text(field).is_some_and(|v| same_key(&v, key)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn padded_and_cased_keys_match() {
        assert!(same_key(" Lima ", "lima"));
        assert!(same_key("ANA@Example.com", "ana@example.com"));
        assert!(!same_key("Lima", "Lima Norte"));
    }

    #[test]
    fn picks_exact_match_over_partial() {
        let records = vec![
            json!({"id": 1, "name": "Boletin clima - Lima Norte"}),
            json!({"id": 2, "name": "boletin clima - lima"}),
            json!({"id": 3, "name": "Boletin clima - Lima"}),
        ];
        let found = select_exact(records, "name", "Boletin clima - Lima").unwrap();
        assert_eq!(found.id().unwrap().as_str(), "2");
    }

    #[test]
    fn reads_nested_contact_fields() {
        let records = vec![json!({
            "id": 5,
            "fields": {"core": {"email": {"value": "Ana@Example.com"}}}
        })];
        assert!(select_exact(records, "email", " ana@example.com").is_some());
    }

    #[test]
    fn no_match_is_none() {
        let records = vec![json!({"id": 1, "name": "Lima"}), json!("garbage")];
        assert!(select_exact(records, "name", "Cusco").is_none());
    }
}
