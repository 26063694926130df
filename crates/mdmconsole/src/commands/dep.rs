//! DEP account and profile command handlers.

use tabled::Tabled;

use mdmconsole_api::ResourceKind;
use mdmconsole_core::{DepAccount, DepProfile, Device, Entity, ResourceAttributes};

use crate::cli::{DepAccountsCommand, DepArgs, DepCommand, DepProfilesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── Accounts ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Server")]
    server_name: String,
    #[tabled(rename = "Organization")]
    org_name: String,
    #[tabled(rename = "Token Expires")]
    expiry: String,
}

impl From<&Entity<DepAccount>> for AccountRow {
    fn from(a: &Entity<DepAccount>) -> Self {
        Self {
            id: a.id.to_string(),
            server_name: output::or_dash(a.attributes.server_name.as_deref()),
            org_name: output::or_dash(a.attributes.org_name.as_deref()),
            expiry: a
                .attributes
                .access_token_expiry
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string()),
        }
    }
}

// ── Profiles ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Supervised")]
    supervised: String,
    #[tabled(rename = "Mandatory")]
    mandatory: String,
}

fn profile_row(p: &Entity<DepProfile>, color: bool) -> ProfileRow {
    ProfileRow {
        id: p.id.to_string(),
        name: output::or_dash(p.attributes.profile_name.as_deref()),
        uuid: output::or_dash(p.attributes.uuid.as_deref()),
        supervised: output::flag(p.attributes.is_supervised, color),
        mandatory: output::flag(p.attributes.is_mandatory, color),
    }
}

fn profile_detail(p: &Entity<DepProfile>, color: bool) -> String {
    let a = &p.attributes;
    let mut lines = vec![
        format!("ID:            {}", p.id),
        format!("Name:          {}", output::or_dash(a.profile_name.as_deref())),
        format!("UUID:          {}", output::or_dash(a.uuid.as_deref())),
        format!("Supervised:    {}", output::flag(a.is_supervised, color)),
        format!("Mandatory:     {}", output::flag(a.is_mandatory, color)),
        format!("Removable:     {}", output::flag(a.is_mdm_removable, color)),
        format!("Allow Pairing: {}", output::flag(a.allow_pairing, color)),
    ];
    if let Some(ref dept) = a.department {
        lines.push(format!("Department:    {dept}"));
    }
    if let Some(ref phone) = a.support_phone_number {
        lines.push(format!("Support Phone: {phone}"));
    }
    if let Some(ref skip) = a.skip_setup_items {
        lines.push(format!("Skip Setup:    {}", skip.join(", ")));
    }
    lines.join("\n")
}

#[derive(Tabled)]
struct AssignedDeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Entity<Device>> for AssignedDeviceRow {
    fn from(d: &Entity<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.attributes.display_name().to_owned(),
            serial: output::or_dash(d.attributes.serial_number.as_deref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: DepArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color();

    match args.command {
        DepCommand::Accounts(accounts) => match accounts.command {
            DepAccountsCommand::List(list) => {
                let accounts = util::list_page::<DepAccount>(session, &list).await?;
                let out = output::render_list(
                    global.output,
                    &accounts,
                    |a| AccountRow::from(a),
                    |a| a.id.to_string(),
                )?;
                output::print_output(&out, global.quiet);
                util::print_page_footer(session, DepAccount::KIND, global);
                Ok(())
            }
        },

        DepCommand::Profiles(profiles) => match profiles.command {
            DepProfilesCommand::List(list) => {
                let profiles = util::list_page::<DepProfile>(session, &list).await?;
                let out = output::render_list(
                    global.output,
                    &profiles,
                    |p| profile_row(p, color),
                    |p| p.id.to_string(),
                )?;
                output::print_output(&out, global.quiet);
                util::print_page_footer(session, DepProfile::KIND, global);
                Ok(())
            }
            DepProfilesCommand::Get { id } => {
                let (profile, _) = util::get_one::<DepProfile>(session, &id).await?;
                let out = output::render_single(
                    global.output,
                    &profile,
                    |p| profile_detail(p, color),
                    |p| p.id.to_string(),
                )?;
                output::print_output(&out, global.quiet);
                Ok(())
            }
            DepProfilesCommand::Devices { id, list } => {
                let devices =
                    util::list_related_page::<Device>(session, ResourceKind::DepProfiles, &id, &list)
                        .await?;
                let out = output::render_list(
                    global.output,
                    &devices,
                    |d| AssignedDeviceRow::from(d),
                    |d| d.id.to_string(),
                )?;
                output::print_output(&out, global.quiet);
                util::print_page_footer(session, Device::KIND, global);
                Ok(())
            }
        },
    }
}
