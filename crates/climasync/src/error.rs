//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use climasync_config::ConfigError;
use climasync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(climasync::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(climasync::timeout),
        help("Increase the timeout with --timeout or check Mautic responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(climasync::auth_failed),
        help(
            "Verify the API user and password, and that the Mautic API and\n\
             basic auth are enabled.\n\
             Run: climasync config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(climasync::no_credentials),
        help(
            "Configure credentials with: climasync config init\n\
             Or set CLIMASYNC_USERNAME and CLIMASYNC_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Mautic API error ({status}): {message}")]
    #[diagnostic(code(climasync::api_error))]
    Api { status: String, message: String },

    // ── Inputs ───────────────────────────────────────────────────────
    #[error("Cannot read users file {path}: {reason}")]
    #[diagnostic(
        code(climasync::source),
        help("Pass --users-file or set [source] users_file in the config.")
    )]
    Source { path: String, reason: String },

    #[error("Email template error: {message}")]
    #[diagnostic(
        code(climasync::template),
        help("The base HTML must contain a <div class=\"container\"> element.")
    )]
    Template { message: String },

    #[error("Console command '{command}' failed: {message}")]
    #[diagnostic(
        code(climasync::console),
        help("Check the [console] program and args in the config.")
    )]
    Console { command: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(climasync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(climasync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: climasync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Mautic connection configured")]
    #[diagnostic(
        code(climasync::no_config),
        help(
            "Create a profile with: climasync config init\n\
             Or pass --url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(climasync::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(climasync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render JSON: {0}")]
    #[diagnostic(code(climasync::json))]
    Json(#[from] serde_json::Error),

    #[error("Cannot render YAML: {0}")]
    #[diagnostic(code(climasync::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Cannot render TOML: {0}")]
    #[diagnostic(code(climasync::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("{0}")]
    #[diagnostic(code(climasync::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Source { .. }
            | Self::Template { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout => Self::Timeout,
            CoreError::Api { message, status } => Self::Api {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },
            CoreError::Source { path, reason } => Self::Source { path, reason },
            CoreError::Template { message } => Self::Template { message },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Console { command, message } => Self::Console { command, message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
