// ── Runtime settings ──
//
// Plain structs the core needs to run a command. The config crate
// translates the on-disk profile file into these; tests build them
// directly.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::source::FieldMapping;

/// TLS verification mode for the Mautic connection.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// Use the operating system's default certificate store.
    #[default]
    SystemDefaults,
    /// Use a custom CA certificate file.
    CustomCa(PathBuf),
    /// Disable certificate verification (self-signed dev installs).
    DangerAcceptInvalid,
}

/// Connection to one Mautic instance.
#[derive(Debug, Clone)]
pub struct MauticConfig {
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Rows per request when walking a whole table.
    pub page_size: usize,
}

impl MauticConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: 100,
        }
    }
}

/// Public geocoding and forecast services.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub geocoder_url: String,
    pub forecast_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoder_url: climasync_api::Geocoder::DEFAULT_URL.into(),
            forecast_url: climasync_api::Forecast::DEFAULT_URL.into(),
            user_agent: format!("climasync/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Naming and content of the per-city bulletin artifacts.
#[derive(Debug, Clone)]
pub struct BulletinConfig {
    /// Segment names are `"<segment_prefix> - <City>"`.
    pub segment_prefix: String,
    /// Template names are `"<template_prefix> - <City>"`.
    pub template_prefix: String,
    /// Subject given to email templates when they are first created.
    pub email_subject: String,
    /// HTML base for email templates; `None` uses the built-in layout.
    pub email_template: Option<PathBuf>,
    /// Receiver of the campaign's webhook step.
    pub webhook_url: String,
}

impl Default for BulletinConfig {
    fn default() -> Self {
        Self {
            segment_prefix: "Boletin clima".into(),
            template_prefix: "Boletin climatico".into(),
            email_subject: "Boletín Climático - {contactfield=firstname}".into(),
            email_template: None,
            webhook_url: "http://waha:3000/api/sendText".into(),
        }
    }
}

/// How to reach the Mautic console and how hard to retry triggering.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Output text meaning the campaign queue is drained.
    pub sentinel: String,
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            program: "docker".into(),
            args: ["exec", "mautic", "php", "/var/www/html/bin/console"]
                .into_iter()
                .map(String::from)
                .collect(),
            sentinel: "No campaigns to trigger".into(),
            max_attempts: 3,
            delay: Duration::from_secs(10),
        }
    }
}

/// The local users file and how its keys map onto Mautic fields.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub users_file: PathBuf,
    pub mapping: FieldMapping,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("users.json"),
            mapping: FieldMapping::default(),
        }
    }
}

/// Everything a [`Synchronizer`](crate::Synchronizer) needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mautic: MauticConfig,
    pub weather: WeatherConfig,
    pub bulletin: BulletinConfig,
    pub console: ConsoleConfig,
    pub source: SourceConfig,
}

impl Settings {
    /// Defaults for everything but the connection itself.
    pub fn new(mautic: MauticConfig) -> Self {
        Self {
            mautic,
            weather: WeatherConfig::default(),
            bulletin: BulletinConfig::default(),
            console: ConsoleConfig::default(),
            source: SourceConfig::default(),
        }
    }
}
