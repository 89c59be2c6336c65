//! Clap derive structures for the `climasync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use climasync_core::{Channel, ContactKey};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// climasync -- weather bulletins for Mautic contacts
#[derive(Debug, Parser)]
#[command(
    name = "climasync",
    version,
    about = "Sync contacts, segments and weather bulletins into Mautic",
    long_about = "Imports contacts from a local users export into Mautic, derives\n\
        per-city segments, email and SMS templates and campaigns, and keeps\n\
        contact weather fields current. Every write is an idempotent upsert.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Mautic profile to use
    #[arg(long, short = 'p', env = "CLIMASYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "CLIMASYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Mautic base URL (overrides profile)
    #[arg(long, short = 'u', env = "CLIMASYNC_URL", global = true)]
    pub url: Option<String>,

    /// Mautic API user (overrides profile)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLIMASYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "CLIMASYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CLIMASYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Natural key used to match users against Mautic contacts.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum MatchBy {
    #[default]
    Email,
    Mobile,
}

impl From<MatchBy> for ContactKey {
    fn from(m: MatchBy) -> Self {
        match m {
            MatchBy::Email => ContactKey::Email,
            MatchBy::Mobile => ContactKey::Mobile,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Email,
    Sms,
}

impl From<ChannelArg> for Channel {
    fn from(c: ChannelArg) -> Self {
        match c {
            ChannelArg::Email => Channel::Email,
            ChannelArg::Sms => Channel::Sms,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import and list Mautic contacts
    #[command(alias = "c")]
    Contacts(ContactsArgs),

    /// Import users' cities as companies with current weather
    Cities(CitiesArgs),

    /// List companies
    Companies(CompaniesArgs),

    /// Derive per-city segments and assign subscribed contacts
    #[command(alias = "seg")]
    Segments(SegmentsArgs),

    /// Per-city email templates
    Emails(TemplatesArgs),

    /// Per-city SMS templates
    Sms(TemplatesArgs),

    /// Create and trigger per-city campaigns
    Campaigns(CampaignsArgs),

    /// Contact weather enrichment
    Weather(WeatherArgs),

    /// Send a bulletin template to every subscribed contact
    Send(SendArgs),

    /// Full run: contacts, segments, email and SMS templates
    Bulletin(ImportArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Users export (JSON array); defaults to `[source] users_file`
    #[arg(long, short = 'f')]
    pub users_file: Option<PathBuf>,

    /// Natural key for contact matching
    #[arg(long, value_enum, default_value = "email")]
    pub match_by: MatchBy,
}

// ── Contacts ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ContactsArgs {
    #[command(subcommand)]
    pub command: ContactsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// Upsert every user from the export as a contact
    Import(ImportArgs),

    /// List contacts
    #[command(alias = "ls")]
    List,
}

// ── Cities / Companies ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CitiesArgs {
    #[command(subcommand)]
    pub command: CitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CitiesCommand {
    /// Geocode each unique city and upsert it as a company
    Import {
        /// Users export (JSON array); defaults to `[source] users_file`
        #[arg(long, short = 'f')]
        users_file: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CompaniesArgs {
    #[command(subcommand)]
    pub command: ListOnly,
}

#[derive(Debug, Subcommand)]
pub enum ListOnly {
    /// List records
    #[command(alias = "ls")]
    List,
}

// ── Segments ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SegmentsArgs {
    #[command(subcommand)]
    pub command: SyncCommand,
}

// ── Templates ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: SyncCommand,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Upsert one record per city found on subscribed contacts
    Sync,

    /// List records
    #[command(alias = "ls")]
    List,
}

// ── Campaigns ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CampaignsArgs {
    #[command(subcommand)]
    pub command: CampaignsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CampaignsCommand {
    /// Create a campaign per city segment (or only for --city)
    Create {
        /// Only this city
        #[arg(long)]
        city: Option<String>,
    },

    /// Refresh segments and campaigns, then trigger with bounded retries
    Trigger {
        /// Trigger attempts (overrides `[console] max_attempts`)
        #[arg(long)]
        attempts: Option<u32>,

        /// Seconds between attempts (overrides `[console] delay_secs`)
        #[arg(long)]
        delay: Option<u64>,
    },
}

// ── Weather ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WeatherArgs {
    #[command(subcommand)]
    pub command: WeatherCommand,
}

#[derive(Debug, Subcommand)]
pub enum WeatherCommand {
    /// Write current temperatures onto subscribed contacts
    Enrich,
}

// ── Send ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Delivery channel
    #[arg(value_enum)]
    pub channel: ChannelArg,

    /// Mautic id of the email or SMS template
    #[arg(long)]
    pub template_id: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
