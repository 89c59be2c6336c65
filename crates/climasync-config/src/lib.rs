//! Configuration for climasync.
//!
//! TOML profiles plus the `[source]`, `[mapping]`, `[weather]`, `[bulletin]`
//! and `[console]` sections, credential resolution (env + keyring +
//! plaintext), and translation to `climasync_core::Settings`. The CLI adds
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use climasync_core::{
    BulletinConfig, ConsoleConfig, FieldMapping, MauticConfig, Settings, SourceConfig,
    TlsVerification, WeatherConfig,
};

/// Keyring service name; entries are `<profile>/password`.
pub const KEYRING_SERVICE: &str = "climasync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Mautic profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    #[serde(default)]
    pub source: SourceSection,

    /// Mautic field alias = local key in the users file.
    #[serde(default = "default_mapping")]
    pub mapping: IndexMap<String, String>,

    #[serde(default)]
    pub weather: WeatherSection,

    #[serde(default)]
    pub bulletin: BulletinSection,

    #[serde(default)]
    pub console: ConsoleSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
            source: SourceSection::default(),
            mapping: default_mapping(),
            weather: WeatherSection::default(),
            bulletin: BulletinSection::default(),
            console: ConsoleSection::default(),
        }
    }
}

fn default_mapping() -> IndexMap<String, String> {
    FieldMapping::default()
        .iter()
        .map(|(remote, local)| (remote.to_owned(), local.to_owned()))
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Mautic profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Mautic base URL (e.g., "http://localhost:8080").
    pub url: String,

    /// API user for basic auth.
    pub username: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Rows per request when listing whole tables.
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSection {
    pub users_file: PathBuf,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            users_file: SourceConfig::default().users_file,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherSection {
    pub geocoder_url: String,
    pub forecast_url: String,
    pub user_agent: String,
}

impl Default for WeatherSection {
    fn default() -> Self {
        let core = WeatherConfig::default();
        Self {
            geocoder_url: core.geocoder_url,
            forecast_url: core.forecast_url,
            user_agent: core.user_agent,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulletinSection {
    pub segment_prefix: String,
    pub template_prefix: String,
    pub email_subject: String,
    /// Base HTML for email templates; built-in layout when unset.
    pub email_template: Option<PathBuf>,
    pub webhook_url: String,
}

impl Default for BulletinSection {
    fn default() -> Self {
        let core = BulletinConfig::default();
        Self {
            segment_prefix: core.segment_prefix,
            template_prefix: core.template_prefix,
            email_subject: core.email_subject,
            email_template: core.email_template,
            webhook_url: core.webhook_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleSection {
    pub program: String,
    pub args: Vec<String>,
    pub sentinel: String,
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        let core = ConsoleConfig::default();
        Self {
            program: core.program,
            args: core.args,
            sentinel: core.sentinel,
            max_attempts: core.max_attempts,
            delay_secs: core.delay.as_secs(),
        }
    }
}

// ── Section → core translations ─────────────────────────────────────

impl From<&WeatherSection> for WeatherConfig {
    fn from(s: &WeatherSection) -> Self {
        Self {
            geocoder_url: s.geocoder_url.clone(),
            forecast_url: s.forecast_url.clone(),
            user_agent: s.user_agent.clone(),
            ..WeatherConfig::default()
        }
    }
}

impl From<&BulletinSection> for BulletinConfig {
    fn from(s: &BulletinSection) -> Self {
        Self {
            segment_prefix: s.segment_prefix.clone(),
            template_prefix: s.template_prefix.clone(),
            email_subject: s.email_subject.clone(),
            email_template: s.email_template.clone(),
            webhook_url: s.webhook_url.clone(),
        }
    }
}

impl From<&ConsoleSection> for ConsoleConfig {
    fn from(s: &ConsoleSection) -> Self {
        Self {
            program: s.program.clone(),
            args: s.args.clone(),
            sentinel: s.sentinel.clone(),
            max_attempts: s.max_attempts.max(1),
            delay: Duration::from_secs(s.delay_secs),
        }
    }
}

impl Config {
    pub fn field_mapping(&self) -> FieldMapping {
        self.mapping
            .iter()
            .map(|(remote, local)| (remote.clone(), local.clone()))
            .collect()
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            users_file: self.source.users_file.clone(),
            mapping: self.field_mapping(),
        }
    }

    /// Profile name to use: explicit override, then `default_profile`.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "climasync", "climasync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("climasync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CLIMASYNC_").split("__"))
}

/// Load the full Config from a file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password)?;
    Ok(())
}

/// Resolve the basic-auth username: profile, then `CLIMASYNC_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("CLIMASYNC_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var("CLIMASYNC_PASSWORD") {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `MauticConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_mautic_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MauticConfig, ConfigError> {
    let url = parse_url(&profile.url)?;
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut mautic = MauticConfig::new(url, username, password);
    mautic.tls = tls;
    mautic.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    if let Some(page_size) = profile.page_size {
        mautic.page_size = page_size.max(1);
    }
    Ok(mautic)
}

/// Full runtime settings for a connection plus this config's sections.
pub fn settings_for(config: &Config, mautic: MauticConfig) -> Settings {
    let mut weather = WeatherConfig::from(&config.weather);
    weather.timeout = mautic.timeout;
    Settings {
        mautic,
        weather,
        bulletin: BulletinConfig::from(&config.bulletin),
        console: ConsoleConfig::from(&config.console),
        source: config.source_config(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config_from(Path::new("/nonexistent/climasync.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.bulletin.segment_prefix, "Boletin clima");
        assert_eq!(cfg.console.max_attempts, 3);
        assert_eq!(cfg.mapping.get("email").map(String::as_str), Some("mail"));
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_overrides_sections() {
        let file = write_config(
            r#"
default_profile = "prod"

[profiles.prod]
url = "https://mautic.example.com"
username = "api"
password = "pw"
timeout = 5

[bulletin]
segment_prefix = "Weather"

[console]
program = "php"
args = ["bin/console"]
delay_secs = 1

[mapping]
email = "correo"
"#,
        );
        let cfg = load_config_from(file.path()).unwrap();

        assert_eq!(cfg.profile_name(None), "prod");
        assert_eq!(cfg.profile_name(Some("dev")), "dev");
        assert_eq!(cfg.profile("prod").unwrap().timeout, Some(5));
        assert_eq!(cfg.bulletin.segment_prefix, "Weather");
        assert_eq!(cfg.bulletin.template_prefix, "Boletin climatico");

        let console = ConsoleConfig::from(&cfg.console);
        assert_eq!(console.program, "php");
        assert_eq!(console.delay, Duration::from_secs(1));
        assert_eq!(console.sentinel, "No campaigns to trigger");

        let mapping = cfg.field_mapping();
        assert_eq!(mapping.local_key("email"), Some("correo"));
        assert_eq!(mapping.local_key("firstname"), Some("name"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_translates_to_mautic_config() {
        let profile = Profile {
            url: "http://localhost:8080".into(),
            username: Some("mautic".into()),
            password: Some("plain".into()),
            insecure: Some(true),
            page_size: Some(0),
            ..Profile::default()
        };
        let mautic =
            profile_to_mautic_config(&profile, "climasync-test-none", &Defaults::default())
                .unwrap();
        assert_eq!(mautic.url.as_str(), "http://localhost:8080/");
        assert_eq!(mautic.username, "mautic");
        assert!(matches!(mautic.tls, TlsVerification::DangerAcceptInvalid));
        assert_eq!(mautic.timeout, Duration::from_secs(30));
        assert_eq!(mautic.page_size, 1);
        // Only holds when no higher-priority credential source is set.
        if std::env::var("CLIMASYNC_PASSWORD").is_err() {
            assert_eq!(mautic.password.expose_secret(), "plain");
        }
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile {
            url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_mautic_config(&profile, "x", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn save_then_load_round_trips_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                url: "http://localhost:8080".into(),
                username: Some("mautic".into()),
                password_env: Some("MAUTIC_PASSWORD".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.url, "http://localhost:8080");
        assert_eq!(profile.password_env.as_deref(), Some("MAUTIC_PASSWORD"));
    }

    #[test]
    fn settings_carry_sections() {
        let cfg = Config::default();
        let mautic = MauticConfig::new(
            parse_url("http://localhost:8080").unwrap(),
            "u",
            SecretString::from("p".to_string()),
        );
        let settings = settings_for(&cfg, mautic);
        assert_eq!(settings.console.max_attempts, 3);
        assert_eq!(settings.source.users_file, PathBuf::from("users.json"));
        assert_eq!(settings.bulletin.webhook_url, "http://waha:3000/api/sendText");
    }
}
