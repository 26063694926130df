//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use mdmconsole_api::ResourceKind;
use mdmconsole_config::ConfigError;
use mdmconsole_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to console at {url}")]
    #[diagnostic(
        code(mdmconsole::connection_failed),
        help(
            "Check that the server is running and reachable: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in the profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mdmconsole::auth_failed),
        help(
            "Check the bearer token for this profile.\n\
             Store one with: mdmconsole config set-token\n\
             Or pass --token / set MDM_TOKEN."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mdmconsole::not_found),
        help("Run: mdmconsole {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Server rejected the request: {message}")]
    #[diagnostic(code(mdmconsole::rejected))]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(mdmconsole::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mdmconsole::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(mdmconsole::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: mdmconsole config init --server-url <URL>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(mdmconsole::no_config),
        help(
            "Create a profile with: mdmconsole config init --server-url <URL>\n\
             Or pass --server / set MDM_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(mdmconsole::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(mdmconsole::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML output failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A not-found error pointing at the list command for `kind`.
    pub fn not_found(kind: ResourceKind, identifier: impl Into<String>) -> Self {
        let (resource_type, list_command) = match kind {
            ResourceKind::Devices => ("device", "devices list"),
            ResourceKind::Tags => ("tag", "tags list"),
            ResourceKind::Certificates => ("certificate", "certificates list"),
            ResourceKind::DepAccounts => ("DEP account", "dep accounts list"),
            ResourceKind::DepProfiles => ("DEP profile", "dep profiles list"),
            ResourceKind::DeviceGroups => ("device group", "device-groups list"),
            ResourceKind::ScepConfigurations => ("SCEP configuration", "scep get"),
        };
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        }
    }

    /// Reinterpret a core error from a lookup of `kind`/`identifier`:
    /// a 404 becomes a targeted [`CliError::NotFound`].
    pub fn from_lookup(err: CoreError, kind: ResourceKind, identifier: &str) -> Self {
        match err {
            CoreError::NotFound { .. } => Self::not_found(kind, identifier),
            other if other.status() == Some(404) => Self::not_found(kind, identifier),
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Cancelled => CliError::ApiError {
                code: "cancelled".into(),
                message: "request cancelled".into(),
            },

            CoreError::NotFound {
                resource,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{resource} list"),
                resource_type: resource,
                identifier,
            },

            CoreError::Decode { message } => CliError::ApiError {
                code: "decode".into(),
                message,
            },

            CoreError::InvalidQuery { message } => CliError::Validation {
                field: "query".into(),
                reason: message,
            },

            CoreError::Rejected { status, errors } => CliError::Rejected {
                status,
                message: errors.summary(),
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "transport".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

impl From<mdmconsole_api::Error> for CliError {
    fn from(err: mdmconsole_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdmconsole_api::{ErrorObject, ErrorResponse};

    #[test]
    fn exit_codes_follow_error_class() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "bad token".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(CliError::Timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::not_found(ResourceKind::Tags, "9").exit_code(),
            exit_code::NOT_FOUND
        );
    }

    #[test]
    fn lookup_404_names_the_resource() {
        let err = CoreError::Rejected {
            status: Some(404),
            errors: ErrorResponse::new(vec![ErrorObject::titled("Not Found")]),
        };
        let CliError::NotFound {
            resource_type,
            identifier,
            list_command,
        } = CliError::from_lookup(err, ResourceKind::DeviceGroups, "4")
        else {
            panic!("expected not found");
        };
        assert_eq!(resource_type, "device group");
        assert_eq!(identifier, "4");
        assert_eq!(list_command, "device-groups list");
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err: CliError = ConfigError::ProfileNotFound {
            name: "prod".into(),
            available: vec!["lab".into(), "staging".into()],
        }
        .into();
        let CliError::ProfileNotFound { available, .. } = err else {
            panic!("expected profile not found");
        };
        assert_eq!(available, "lab, staging");
    }
}
