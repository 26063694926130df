//! CLI configuration -- thin wrapper around `mdmconsole_config`.
//!
//! Adds the `GlobalOpts`-aware resolution that lets --server, --token,
//! --insecure and --timeout override a profile.

use std::path::PathBuf;
use std::time::Duration;

use mdmconsole_api::ResourceKind;
use mdmconsole_config::{Config, Profile};
use mdmconsole_core::{ConsoleConfig, TlsVerification};
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use mdmconsole_config::{load_config_from, save_config_to};

/// Connection settings plus the list defaults a command needs.
#[derive(Debug)]
pub struct Resolved {
    pub console: ConsoleConfig,
    /// Page size from the profile or `[defaults]`, if either sets one.
    pub page_size: Option<u32>,
}

impl Resolved {
    /// Page size for a list of `kind` when --page-size is absent.
    pub fn page_size_for(&self, kind: ResourceKind) -> u32 {
        self.page_size.unwrap_or_else(|| kind.default_page_size())
    }
}

/// The config file in effect: --config / MDM_CONFIG, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(mdmconsole_config::config_path)
}

/// Load the config file in effect. An explicit file must parse; the
/// platform default falls back to an empty config.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    match global.config {
        Some(ref path) => Ok(load_config_from(path)?),
        None => Ok(mdmconsole_config::load_config_or_default()),
    }
}

pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Resolve connection settings from the config file, profile, and flags.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);

    if let Some(profile) = config.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, config);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        config.profile(&profile_name)?;
    }

    // No profile -- build from flags / env alone.
    let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_file(global).display().to_string(),
    })?;

    let mut console = ConsoleConfig::new(parse_server(server)?);
    console.token = global.token.clone().map(SecretString::from);
    if global.insecure || config.defaults.insecure {
        console.tls = TlsVerification::DangerAcceptInvalid;
    }
    console.timeout = Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout));

    Ok(Resolved {
        console,
        page_size: config.defaults.page_size,
    })
}

/// Translate a `Profile` + global flags into a `ConsoleConfig`.
///
/// CLI flag overrides take priority over profile values.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    config: &Config,
) -> Result<Resolved, CliError> {
    // 1. Server URL (flag > env > profile)
    let url = match global.server.as_deref() {
        Some(server) => parse_server(server)?,
        None => profile.url()?,
    };

    // 2. Token (flag > token_env > keyring > plaintext)
    let token = match global.token {
        Some(ref token) => Some(SecretString::from(token.clone())),
        None => mdmconsole_config::resolve_token(profile, profile_name),
    };

    // 3. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        profile.tls(&config.defaults)
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(config.defaults.timeout);

    let mut console = ConsoleConfig::new(url);
    console.token = token;
    console.tls = tls;
    console.timeout = Duration::from_secs(timeout);

    Ok(Resolved {
        console,
        page_size: profile.page_size.or(config.defaults.page_size),
    })
}

fn parse_server(server: &str) -> Result<url::Url, CliError> {
    server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["mdmconsole"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["tags", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn lab_config() -> Config {
        let mut config = Config {
            default_profile: Some("lab".into()),
            ..Config::default()
        };
        config.profiles.insert(
            "lab".into(),
            Profile {
                token: Some("plain".into()),
                timeout: Some(12),
                page_size: Some(75),
                ..Profile::new("https://mdm.lab.test")
            },
        );
        config
    }

    #[test]
    fn flags_override_profile() {
        let resolved = resolve(
            &global(&["--server", "https://other.test", "--timeout", "5", "-k"]),
            &lab_config(),
        )
        .unwrap();

        assert_eq!(resolved.console.url.as_str(), "https://other.test/");
        assert_eq!(resolved.console.timeout, Duration::from_secs(5));
        assert_eq!(resolved.console.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn profile_page_size_beats_resource_default() {
        let resolved = resolve(&global(&[]), &lab_config()).unwrap();
        assert_eq!(resolved.page_size_for(ResourceKind::Devices), 75);
        assert_eq!(resolved.console.timeout, Duration::from_secs(12));

        let bare = Resolved {
            page_size: None,
            ..resolved
        };
        assert_eq!(bare.page_size_for(ResourceKind::Devices), 50);
        assert_eq!(bare.page_size_for(ResourceKind::Tags), 20);
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let err = resolve(&global(&["--profile", "prod"]), &lab_config()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }));
    }

    #[test]
    fn no_profile_and_no_server_asks_for_config() {
        let err = resolve(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
