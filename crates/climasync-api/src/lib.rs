// climasync-api: async clients for Mautic, Nominatim, Open-Meteo and the Mautic console.

pub mod console;
pub mod error;
pub mod mautic;
pub mod transport;
pub mod weather;

pub use console::{Console, ConsoleOutput};
pub use error::Error;
pub use mautic::{Endpoint, MauticClient, RecordSet};
pub use transport::{TlsMode, TransportConfig};
pub use weather::{Coordinates, CurrentWeather, Forecast, Geocoder};
