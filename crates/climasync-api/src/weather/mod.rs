// Public weather services: Nominatim for geocoding, Open-Meteo for readings.

mod forecast;
mod geocoder;

pub use forecast::{CurrentWeather, Forecast};
pub use geocoder::{Coordinates, Geocoder};

use url::Url;

/// Parse a service root so relative joins append instead of replacing.
fn directory_url(raw: &str) -> Result<Url, crate::Error> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
