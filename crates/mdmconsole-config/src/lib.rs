//! Shared configuration for mdmconsole tools.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `mdmconsole_core::ConsoleConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mdmconsole_core::{ConsoleConfig, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "mdmconsole";

/// Environment prefix for config overrides, e.g. `MDM_DEFAULTS__TIMEOUT=60`.
pub const ENV_PREFIX: &str = "MDM_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, listing the known names on a miss.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profiles.keys().cloned().collect(),
            })
    }

    /// `explicit`, else `default_profile`, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Page size for list commands when neither flag nor profile sets
    /// one. Unset means the per-resource default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            page_size: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://mdm.example.com").
    pub server: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override list page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn url(&self) -> Result<url::Url, ConfigError> {
        self.server.parse().map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", self.server),
        })
    }

    /// TLS mode from the profile: `insecure` wins over `ca_cert`.
    pub fn tls(&self, defaults: &Defaults) -> TlsVerification {
        if self.insecure.unwrap_or(defaults.insecure) {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "mdmconsole", "mdmconsole").map_or_else(
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
    p.push("mdmconsole");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

/// Resolve the bearer token for a profile.
///
/// Chain: env var named by `token_env` → system keyring → plaintext.
/// `None` when nothing is configured; the server may not require one.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(val) = profile.token_env.as_deref().and_then(&env) {
        debug!(profile = profile_name, "token from environment");
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = keyring(&keyring_user(profile_name)) {
        debug!(profile = profile_name, "token from keyring");
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(token)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile, with no flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let mut config = ConsoleConfig::new(profile.url()?);
    config.token = resolve_token(profile, profile_name);
    config.tls = profile.tls(defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn no_source(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn env_token_wins_over_keyring_and_plaintext() {
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some("LAB_TOKEN".into()),
            ..Profile::new("https://mdm.test")
        };
        let token = resolve_token_with(
            &profile,
            "lab",
            |name| (name == "LAB_TOKEN").then(|| "from-env".to_owned()),
            |_| Some("from-keyring".to_owned()),
        );
        assert_eq!(token.as_ref().map(|t| t.expose_secret()), Some("from-env"));
    }

    #[test]
    fn keyring_is_keyed_by_profile() {
        let profile = Profile {
            token: Some("plain".into()),
            ..Profile::new("https://mdm.test")
        };
        let token = resolve_token_with(&profile, "lab", no_source, |user| {
            (user == "lab/token").then(|| "from-keyring".to_owned())
        });
        assert_eq!(
            token.as_ref().map(|t| t.expose_secret()),
            Some("from-keyring")
        );
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some("UNSET_VAR".into()),
            ..Profile::new("https://mdm.test")
        };
        let token = resolve_token_with(&profile, "lab", no_source, no_source);
        assert_eq!(token.as_ref().map(|t| t.expose_secret()), Some("plain"));

        let bare = Profile::new("https://mdm.test");
        assert!(resolve_token_with(&bare, "lab", no_source, no_source).is_none());
    }

    #[test]
    fn insecure_overrides_ca_cert() {
        let defaults = Defaults::default();
        let mut profile = Profile {
            ca_cert: Some(PathBuf::from("/etc/mdm/ca.pem")),
            ..Profile::new("https://mdm.test")
        };
        assert_eq!(
            profile.tls(&defaults),
            TlsVerification::CustomCa(PathBuf::from("/etc/mdm/ca.pem"))
        );

        profile.insecure = Some(true);
        assert_eq!(profile.tls(&defaults), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn unknown_profile_lists_available_names() {
        let mut config = Config::default();
        config
            .profiles
            .insert("lab".into(), Profile::new("https://lab.test"));

        let Err(ConfigError::ProfileNotFound { name, available }) = config.profile("prod") else {
            panic!("expected a missing profile");
        };
        assert_eq!(name, "prod");
        assert_eq!(available, vec!["lab".to_owned()]);
    }

    #[test]
    fn active_profile_prefers_explicit_name() {
        let config = Config {
            default_profile: Some("lab".into()),
            ..Config::default()
        };
        assert_eq!(config.active_profile_name(Some("prod")), "prod");
        assert_eq!(config.active_profile_name(None), "lab");
    }
}
