use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Coordinates, directory_url};
use crate::error::Error;
use crate::transport::TransportConfig;

/// The current reading Open-Meteo reports for a point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Local observation time, `YYYY-MM-DDTHH:MM`.
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
}

/// Current-conditions client for Open-Meteo's `/v1/forecast`.
pub struct Forecast {
    http: reqwest::Client,
    base_url: Url,
}

impl Forecast {
    pub const DEFAULT_URL: &'static str = "https://api.open-meteo.com";

    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url: directory_url(base_url)?,
        })
    }

    /// Fetch the current weather at a point.
    ///
    /// Returns `Ok(None)` when the response carries no `current_weather` block.
    pub async fn current(&self, at: Coordinates) -> Result<Option<CurrentWeather>, Error> {
        let url = self.base_url.join("v1/forecast")?;
        debug!("GET {url} lat={} lon={}", at.lat, at.lon);

        let resp = self
            .http
            .get(url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("current_weather", "true".to_owned()),
            ])
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

        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("forecast response: {e}"),
                body,
            })?;
        Ok(parsed.current_weather)
    }
}
