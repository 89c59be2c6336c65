#![allow(clippy::unwrap_used)]
// Integration tests for the geocoder and forecast clients using wiremock.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use climasync_api::{Coordinates, Forecast, Geocoder, TransportConfig};

fn transport() -> TransportConfig {
    TransportConfig::default().with_user_agent("climasync-test")
}

#[tokio::test]
async fn test_locate_parses_string_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Lima, Peru"))
        .and(query_param("format", "json"))
        .and(header("user-agent", "climasync-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "-12.0464", "lon": "-77.0428", "display_name": "Lima"},
            {"lat": "0", "lon": "0"}
        ])))
        .mount(&server)
        .await;

    let geocoder = Geocoder::new(&server.uri(), &transport()).unwrap();
    let at = geocoder.locate("Lima, Peru").await.unwrap().unwrap();

    assert!((at.lat - -12.0464).abs() < 1e-9);
    assert!((at.lon - -77.0428).abs() < 1e-9);
}

#[tokio::test]
async fn test_locate_without_match_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let geocoder = Geocoder::new(&server.uri(), &transport()).unwrap();
    assert!(geocoder.locate("Atlantis").await.unwrap().is_none());
}

#[tokio::test]
async fn test_current_weather() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current_weather", "true"))
        .and(query_param("latitude", "-12.5"))
        .and(query_param("longitude", "-77.25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": -12.5,
            "current_weather": {"temperature": 19.5, "time": "2025-03-01T14:00", "windspeed": 9.7}
        })))
        .mount(&server)
        .await;

    let forecast = Forecast::new(&server.uri(), &transport()).unwrap();
    let now = forecast
        .current(Coordinates {
            lat: -12.5,
            lon: -77.25,
        })
        .await
        .unwrap()
        .unwrap();

    assert!((now.temperature - 19.5).abs() < f64::EPSILON);
    assert_eq!(now.time.as_deref(), Some("2025-03-01T14:00"));
}

#[tokio::test]
async fn test_forecast_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let forecast = Forecast::new(&server.uri(), &transport()).unwrap();
    let err = forecast
        .current(Coordinates { lat: 0.0, lon: 0.0 })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_transient());
}
