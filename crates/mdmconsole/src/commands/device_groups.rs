//! Device group command handlers.

use tabled::Tabled;

use mdmconsole_api::ResourceKind;
use mdmconsole_core::{Device, DeviceGroup, Entity, ResourceAttributes};

use crate::cli::{DeviceGroupsArgs, DeviceGroupsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Entity<DeviceGroup>> for GroupRow {
    fn from(g: &Entity<DeviceGroup>) -> Self {
        Self {
            id: g.id.to_string(),
            name: output::or_dash(g.attributes.name.as_deref()),
            description: output::or_dash(g.attributes.description.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&Entity<Device>> for MemberRow {
    fn from(d: &Entity<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.attributes.display_name().to_owned(),
            model: output::or_dash(d.attributes.model_name.as_deref()),
        }
    }
}

fn detail(g: &Entity<DeviceGroup>, members: &[String]) -> String {
    let mut lines = vec![
        format!("ID:          {}", g.id),
        format!("Name:        {}", output::or_dash(g.attributes.name.as_deref())),
        format!(
            "Description: {}",
            output::or_dash(g.attributes.description.as_deref())
        ),
    ];
    if !members.is_empty() {
        lines.push(format!("Devices:     {}", members.join(", ")));
    }
    lines.join("\n")
}

pub async fn handle(
    session: &Session,
    args: DeviceGroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DeviceGroupsCommand::List(list) => {
            let groups = util::list_page::<DeviceGroup>(session, &list).await?;
            let out =
                output::render_list(global.output, &groups, |g| GroupRow::from(g), |g| {
                    g.id.to_string()
                })?;
            output::print_output(&out, global.quiet);
            util::print_page_footer(session, DeviceGroup::KIND, global);
            Ok(())
        }

        DeviceGroupsCommand::Get { id } => {
            let (group, envelope) = util::get_one::<DeviceGroup>(session, &id).await?;
            let members = util::linked_ids(&envelope, "devices");
            let out = output::render_single(
                global.output,
                &group,
                |g| detail(g, &members),
                |g| g.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeviceGroupsCommand::Devices { id, list } => {
            let devices =
                util::list_related_page::<Device>(session, ResourceKind::DeviceGroups, &id, &list)
                    .await?;
            let out =
                output::render_list(global.output, &devices, |d| MemberRow::from(d), |d| {
                    d.id.to_string()
                })?;
            output::print_output(&out, global.quiet);
            util::print_page_footer(session, Device::KIND, global);
            Ok(())
        }
    }
}
