//! Config subcommand handlers.

use std::io::BufRead;

use mdmconsole_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

/// A copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    out
}

fn render_config(cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    let cfg = redacted(cfg);
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(toml::to_string_pretty(&cfg)?),
        other => output::render_single(other, &cfg, |_| String::new(), |_| String::new()),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);

    match args.command {
        ConfigCommand::Init {
            server_url,
            token_env,
            ca_cert,
            allow_insecure,
            force,
        } => {
            let mut cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);

            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: format!("profile '{name}' already exists (use --force to replace it)"),
                });
            }

            let profile = Profile {
                token_env,
                ca_cert,
                insecure: allow_insecure.then_some(true),
                ..Profile::new(server_url)
            };
            // Fail before writing anything unusable.
            profile.url()?;

            cfg.profiles.insert(name.clone(), profile);
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config_to(&cfg, &path)?;

            output::print_status(
                &format!("wrote profile '{name}' to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            output::print_output(&render_config(&cfg, global.output)?, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);

            let mut token = String::new();
            std::io::stdin().lock().read_line(&mut token)?;
            let token = token.trim();
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "expected a token on stdin".into(),
                });
            }

            mdmconsole_config::store_token(&name, token)?;
            output::print_status(&format!("stored token for profile '{name}'"), global.quiet);
            Ok(())
        }
    }
}
