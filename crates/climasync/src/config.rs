//! CLI flag overrides on top of the shared config crate.
//!
//! This is the single boundary where CLI flags and TOML profiles become a
//! core `Settings`.

use std::path::PathBuf;

use climasync_config::{Config, Profile, profile_to_mautic_config, settings_for};
use climasync_core::Settings;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config`, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(climasync_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(climasync_config::load_config_from(&config_file(global))?)
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    Ok(climasync_config::save_config_to(cfg, &config_file(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.profile_name(global.profile.as_deref())
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Profile with flag overrides applied.
///
/// Without a stored profile, `--url` alone is enough to build one;
/// credentials then come from the environment.
fn effective_profile(global: &GlobalOpts, cfg: &Config, name: &str) -> Result<Profile, CliError> {
    let mut profile = match cfg.profiles.get(name) {
        Some(p) => p.clone(),
        None => match global.url {
            Some(ref url) => Profile {
                url: url.clone(),
                ..Profile::default()
            },
            None if global.profile.is_some() || !cfg.profiles.is_empty() => {
                return Err(CliError::ProfileNotFound {
                    name: name.into(),
                    available: available_profiles(cfg),
                });
            }
            None => {
                return Err(CliError::NoConfig {
                    path: config_file(global).display().to_string(),
                });
            }
        },
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok(profile)
}

/// Build runtime settings from the config file, profile, and CLI overrides.
pub fn resolve_settings(global: &GlobalOpts, cfg: &Config) -> Result<Settings, CliError> {
    let name = active_profile_name(global, cfg);
    let profile = effective_profile(global, cfg, &name)?;
    let mautic = profile_to_mautic_config(&profile, &name, &cfg.defaults)?;
    Ok(settings_for(cfg, mautic))
}
