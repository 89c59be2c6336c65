#![allow(clippy::unwrap_used)]
// Integration tests for `MauticClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use climasync_api::mautic::{search, where_eq};
use climasync_api::{Endpoint, Error, MauticClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MauticClient) {
    let server = MockServer::start().await;
    let client = MauticClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        "mautic",
        SecretString::from("s3cret".to_string()),
    )
    .unwrap();
    (server, client)
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_contacts_with_where_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .and(basic_auth("mautic", "s3cret"))
        .and(query_param("where[0][col]", "email"))
        .and(query_param("where[0][expr]", "eq"))
        .and(query_param("where[0][val]", "a+b@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "contacts": {
                "12": {"id": 12, "fields": {"core": {"email": {"value": "a+b@x.com"}}}}
            }
        })))
        .mount(&server)
        .await;

    let records = client
        .list(Endpoint::CONTACTS, &where_eq("email", "a+b@x.com"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], json!(12));
}

#[tokio::test]
async fn test_list_segments_reads_lists_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/segments"))
        .and(query_param("search", "Boletin clima - Lima"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "lists": [
                {"id": 3, "name": "Boletin clima - Lima"},
                {"id": 4, "name": "Boletin clima - Limache"}
            ]
        })))
        .mount(&server)
        .await;

    let records = client
        .list(Endpoint::SEGMENTS, &search("Boletin clima - Lima"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["name"], json!("Boletin clima - Limache"));
}

#[tokio::test]
async fn test_list_missing_collection_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/smses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
        .mount(&server)
        .await;

    let records = client.list(Endpoint::SMSES, &[]).await.unwrap();
    assert!(records.is_empty());
}


#[tokio::test]
async fn test_list_all_walks_pages_until_short_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(query_param("start", "0"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "companies": {"1": {"id": 1}, "2": {"id": 2}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(query_param("start", "2"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "companies": {"3": {"id": 3}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = client
        .list_all(Endpoint::COMPANIES, &[], 2)
        .await
        .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
}

// ── Create / edit ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_unwraps_item_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/companies/new"))
        .and(body_json(json!({"companyname": "Lima", "weather": "19.5"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "company": {"id": 9, "fields": {"core": {"companyname": {"value": "Lima"}}}}
        })))
        .mount(&server)
        .await;

    let created = client
        .create(
            Endpoint::COMPANIES,
            &json!({"companyname": "Lima", "weather": "19.5"}),
        )
        .await
        .unwrap();

    assert_eq!(created["id"], json!(9));
}

#[tokio::test]
async fn test_edit_patches_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/emails/4/edit"))
        .and(body_json(json!({"customHtml": "<p>hi</p>"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"email": {"id": 4, "name": "x"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let edited = client
        .edit(Endpoint::EMAILS, "4", &json!({"customHtml": "<p>hi</p>"}))
        .await
        .unwrap();

    assert_eq!(edited["id"], json!(4));
}

// ── Actions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_contact_to_segment() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/segments/3/contact/12/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 1})))
        .expect(1)
        .mount(&server)
        .await;

    client.add_contact_to_segment("3", "12").await.unwrap();
}

#[tokio::test]
async fn test_send_sms_uses_get() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/smses/2/contact/12/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client.send_sms("2", "12").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list(Endpoint::CONTACTS, &[]).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_envelope_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/contacts/new"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "email: This value is not valid.", "code": 400}]
        })))
        .mount(&server)
        .await;

    let result = client
        .create(Endpoint::CONTACTS, &json!({"email": "nope"}))
        .await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("not valid"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
