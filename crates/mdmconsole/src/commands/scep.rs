//! SCEP configuration command handler.

use mdmconsole_core::{Entity, ScepConfiguration};

use crate::cli::{GlobalOpts, ScepArgs, ScepCommand};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

fn detail(s: &Entity<ScepConfiguration>) -> String {
    let a = &s.attributes;
    let number = |n: Option<u32>| n.map_or_else(|| "-".into(), |n| n.to_string());
    [
        format!("URL:            {}", output::or_dash(a.url.as_deref())),
        format!("Subject:        {}", output::or_dash(a.subject.as_deref())),
        format!("CA Fingerprint: {}", output::or_dash(a.ca_fingerprint.as_deref())),
        format!(
            "Challenge:      {}",
            output::flag(a.challenge_enabled, false)
        ),
        format!("Key Type:       {}", output::or_dash(a.key_type.as_deref())),
        format!("Key Size:       {}", number(a.key_size)),
        format!(
            "Key Usage:      {}",
            a.key_usage.map_or_else(|| "-".into(), |u| u.to_string())
        ),
        format!("Retries:        {}", number(a.retries)),
        format!("Retry Delay:    {}", number(a.retry_delay)),
    ]
    .join("\n")
}

pub async fn handle(session: &Session, args: ScepArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ScepCommand::Get { id } => {
            let (config, _) = util::get_one::<ScepConfiguration>(session, &id).await?;
            let out = output::render_single(global.output, &config, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
