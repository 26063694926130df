//! Command dispatch: bridges CLI args -> console operations -> output.

pub mod certificates;
pub mod config_cmd;
pub mod dep;
pub mod device_groups;
pub mod devices;
pub mod scep;
pub mod tags;
pub mod util;

use mdmconsole_api::ApiClient;
use mdmconsole_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Everything a server-bound handler needs.
pub struct Session {
    pub console: Console<ApiClient>,
    pub settings: Resolved,
}

impl Session {
    pub fn connect(settings: Resolved) -> Result<Self, CliError> {
        let console = Console::connect(&settings.console)?;
        Ok(Self { console, settings })
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(session, args, global).await,
        Command::Tags(args) => tags::handle(session, args, global).await,
        Command::Certificates(args) => certificates::handle(session, args, global).await,
        Command::Dep(args) => dep::handle(session, args, global).await,
        Command::DeviceGroups(args) => device_groups::handle(session, args, global).await,
        Command::Scep(args) => scep::handle(session, args, global).await,
        // Config and Completions never reach a server
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a server command".into(),
        }),
    }
}
