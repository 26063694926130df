//! Clap derive structures for the `mdmconsole` CLI.
//!
//! Defines the command tree, global flags, and shared list arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mdmconsole_api::{Filter, QueryParameters};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mdmconsole -- manage an MDM console server from the command line
#[derive(Debug, Parser)]
#[command(
    name = "mdmconsole",
    version,
    about = "Manage MDM console devices, tags, certificates and DEP from the command line",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "MDM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, env = "MDM_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token (overrides profile, env and keyring)
    #[arg(long, env = "MDM_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MDM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MDM_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MDM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MDM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Format ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect devices and manage their tags
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage tags
    Tags(TagsArgs),

    /// List certificates
    #[command(alias = "certs")]
    Certificates(CertificatesArgs),

    /// Device Enrollment Program accounts and profiles
    Dep(DepArgs),

    /// Inspect device groups
    #[command(alias = "groups")]
    DeviceGroups(DeviceGroupsArgs),

    /// Show the SCEP configuration
    Scep(ScepArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Pagination, filtering and sorting shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Results per page (defaults to profile, then per-resource default)
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Filter as name:op[:value], e.g. "device_name:ilike:%lab%" or
    /// "id:in_:[1,2]"; JSON values are sent as JSON (repeatable)
    #[arg(long, short = 'f', value_parser = parse_filter)]
    pub filter: Vec<Filter>,

    /// Sort fields, comma separated; prefix with '-' for descending
    #[arg(long, short = 's', value_delimiter = ',')]
    pub sort: Vec<String>,
}

impl ListArgs {
    /// Query parameters, with `fallback_size` when no --page-size was given.
    pub fn query(&self, fallback_size: u32) -> QueryParameters {
        let query = QueryParameters::new()
            .page(self.page)
            .page_size(self.page_size.unwrap_or(fallback_size));
        let query = self.filter.iter().cloned().fold(query, QueryParameters::filter);
        self.sort
            .iter()
            .filter(|field| !field.is_empty())
            .fold(query, |q, field| q.sort(field.as_str()))
    }
}

fn parse_filter(spec: &str) -> Result<Filter, String> {
    Filter::parse_spec(spec).map_err(|e| e.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one device
    Get {
        /// Device ID
        id: String,
    },

    /// Manage a device's tags
    Tags(DeviceTagsArgs),
}

#[derive(Debug, Args)]
pub struct DeviceTagsArgs {
    #[command(subcommand)]
    pub command: DeviceTagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceTagsCommand {
    /// Replace the device's tags with exactly these
    Set {
        /// Device ID
        id: String,
        /// Tag IDs (none clears every tag)
        tag_ids: Vec<String>,
    },

    /// Attach tags, keeping the existing ones
    Add {
        /// Device ID
        id: String,
        /// Tag IDs
        #[arg(required = true)]
        tag_ids: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TAGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// List tags
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create a tag
    Create {
        /// Tag name
        #[arg(long)]
        name: String,

        /// Hex color, e.g. "ff0000" or "#ff0000"
        #[arg(long)]
        color: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CERTIFICATES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CertificatesArgs {
    #[command(subcommand)]
    pub command: CertificatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CertificatesCommand {
    /// List certificates
    #[command(alias = "ls")]
    List(ListArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DepArgs {
    #[command(subcommand)]
    pub command: DepCommand,
}

#[derive(Debug, Subcommand)]
pub enum DepCommand {
    /// DEP server tokens
    Accounts(DepAccountsArgs),

    /// DEP enrollment profiles
    Profiles(DepProfilesArgs),
}

#[derive(Debug, Args)]
pub struct DepAccountsArgs {
    #[command(subcommand)]
    pub command: DepAccountsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DepAccountsCommand {
    /// List DEP accounts
    #[command(alias = "ls")]
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct DepProfilesArgs {
    #[command(subcommand)]
    pub command: DepProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DepProfilesCommand {
    /// List DEP profiles
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one DEP profile
    Get {
        /// Profile ID
        id: String,
    },

    /// List the devices assigned to a DEP profile
    Devices {
        /// Profile ID
        id: String,

        #[command(flatten)]
        list: ListArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICE GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceGroupsArgs {
    #[command(subcommand)]
    pub command: DeviceGroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceGroupsCommand {
    /// List device groups
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one device group
    Get {
        /// Group ID
        id: String,
    },

    /// List the devices in a group
    Devices {
        /// Group ID
        id: String,

        #[command(flatten)]
        list: ListArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCEP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScepArgs {
    #[command(subcommand)]
    pub command: ScepCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScepCommand {
    /// Show the SCEP configuration
    Get {
        /// Configuration ID (servers keep a single one)
        #[arg(long, default_value = "1")]
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a profile to the config file
    Init {
        /// Server base URL
        #[arg(long)]
        server_url: String,

        /// Environment variable holding the bearer token
        #[arg(long)]
        token_env: Option<String>,

        /// Path to a custom CA certificate
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Accept self-signed certificates for this profile
        #[arg(long)]
        allow_insecure: bool,

        /// Overwrite an existing profile of the same name
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration (tokens redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store a bearer token (read from stdin) in the system keyring
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
