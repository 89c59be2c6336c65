// ── Weather lookups ──
//
// City name → coordinates → current reading. Lookups never fail a
// command: every miss or transport error is logged and comes back as
// `None`, and the caller counts it.

use tracing::{debug, warn};

use climasync_api::{Coordinates, Forecast, Geocoder, TransportConfig};

use crate::error::CoreError;
use crate::settings::WeatherConfig;

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub city: String,
    pub coordinates: Coordinates,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Local observation time as reported (`YYYY-MM-DDTHH:MM`).
    pub time: Option<String>,
}

pub struct WeatherService {
    geocoder: Geocoder,
    forecast: Forecast,
}

impl WeatherService {
    pub fn new(config: &WeatherConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_user_agent(config.user_agent.clone());
        Ok(Self {
            geocoder: Geocoder::new(&config.geocoder_url, &transport)?,
            forecast: Forecast::new(&config.forecast_url, &transport)?,
        })
    }

    pub fn from_parts(geocoder: Geocoder, forecast: Forecast) -> Self {
        Self { geocoder, forecast }
    }

    /// Geocode `city` and fetch its current temperature.
    pub async fn reading(&self, city: &str) -> Option<Reading> {
        let coordinates = match self.geocoder.locate(city).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!(city, "no coordinates found");
                return None;
            }
            Err(e) => {
                warn!(city, error = %e, "geocoding failed");
                return None;
            }
        };

        match self.forecast.current(coordinates).await {
            Ok(Some(current)) => {
                debug!(city, temperature = current.temperature, "current weather");
                Some(Reading {
                    city: city.to_owned(),
                    coordinates,
                    temperature: current.temperature,
                    time: current.time,
                })
            }
            Ok(None) => {
                warn!(city, "forecast has no current weather");
                None
            }
            Err(e) => {
                warn!(city, error = %e, "forecast lookup failed");
                None
            }
        }
    }
}
