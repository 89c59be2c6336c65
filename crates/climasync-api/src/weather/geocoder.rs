use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::directory_url;
use crate::error::Error;
use crate::transport::TransportConfig;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One Nominatim search hit. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// City-name geocoder backed by Nominatim's `/search` endpoint.
pub struct Geocoder {
    http: reqwest::Client,
    base_url: Url,
}

impl Geocoder {
    pub const DEFAULT_URL: &'static str = "https://nominatim.openstreetmap.org";

    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url: directory_url(base_url)?,
        })
    }

    /// Resolve a free-form place name to coordinates.
    ///
    /// Returns `Ok(None)` when the service has no match for the name.
    pub async fn locate(&self, query: &str) -> Result<Option<Coordinates>, Error> {
        let url = self.base_url.join("search")?;
        debug!("GET {url} q={query:?}");

        let resp = self
            .http
            .get(url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let places: Vec<Place> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("geocoder response: {e}"),
                body: body.clone(),
            })?;

        let Some(first) = places.into_iter().next() else {
            return Ok(None);
        };

        let parse = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| Error::Deserialization {
                    message: format!("coordinate {raw:?}: {e}"),
                    body: body.clone(),
                })
        };

        Ok(Some(Coordinates {
            lat: parse(&first.lat)?,
            lon: parse(&first.lon)?,
        }))
    }
}
