//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;
use tabled::Tabled;

use climasync_config::{Config, Profile, store_password};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

#[derive(Clone, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "User")]
    username: String,
    #[tabled(rename = "Default")]
    default: String,
}

/// Where the password of a new profile ends up.
enum PasswordStore {
    Keyring,
    Env(String),
    Plaintext,
}

fn prompt_password_store() -> Result<PasswordStore, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Read from an environment variable",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the password live?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match selection {
        0 => Ok(PasswordStore::Keyring),
        1 => {
            let var: String = Input::new()
                .with_prompt("Environment variable")
                .default("MAUTIC_PASSWORD".into())
                .interact_text()
                .map_err(prompt_err)?;
            Ok(PasswordStore::Env(var))
        }
        _ => Ok(PasswordStore::Plaintext),
    }
}

fn read_password() -> Result<String, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let text = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| text.trim_end().to_owned(),
                |c| {
                    c.profiles
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let active = config::active_profile_name(global, &cfg);
            let rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    name: name.clone(),
                    url: p.url.clone(),
                    username: p.username.clone().unwrap_or_default(),
                    default: if *name == active { "*" } else { "" }.into(),
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                ProfileRow::clone,
                |r| r.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);
            cfg.profile(&name)?;
            let pass = read_password()?;
            store_password(&name, &pass)?;
            if !global.quiet {
                eprintln!("Password for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, then save.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    eprintln!("climasync configuration");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = config::load(global)?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Mautic URL")
        .default("http://localhost:8080".into())
        .interact_text()
        .map_err(prompt_err)?;
    climasync_config::parse_url(&url)?;

    let username: String = Input::new()
        .with_prompt("API username")
        .default("mautic".into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        url,
        username: Some(username),
        ..Profile::default()
    };

    match prompt_password_store()? {
        PasswordStore::Keyring => {
            let pass = read_password()?;
            store_password(&profile_name, &pass)?;
            eprintln!("   Password stored in system keyring");
        }
        PasswordStore::Env(var) => profile.password_env = Some(var),
        PasswordStore::Plaintext => profile.password = Some(read_password()?),
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    let default_missing = cfg
        .default_profile
        .as_ref()
        .is_none_or(|name| !cfg.profiles.contains_key(name));
    if default_missing {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save(global, &cfg)?;

    eprintln!("\n   Profile '{profile_name}' saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_masks_plaintext_passwords_only() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "a".into(),
            Profile {
                url: "http://a".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "b".into(),
            Profile {
                url: "http://b".into(),
                password_env: Some("PW".into()),
                ..Profile::default()
            },
        );
        let out = redacted(&cfg);
        assert_eq!(out.profiles["a"].password.as_deref(), Some(REDACTED));
        assert!(out.profiles["b"].password.is_none());
        assert_eq!(out.profiles["b"].password_env.as_deref(), Some("PW"));
    }
}
