//! Device command handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use mdmconsole_api::{ResourceId, ResourceKind};
use mdmconsole_core::{Device, Entity, ResourceAttributes};

use crate::cli::{DeviceTagsCommand, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Enrolled")]
    enrolled: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn row(d: &Entity<Device>, color: bool) -> DeviceRow {
    let a = &d.attributes;
    DeviceRow {
        id: d.id.to_string(),
        name: a.display_name().to_owned(),
        model: output::or_dash(a.model_name.as_deref().or(a.product_name.as_deref())),
        os: output::or_dash(a.os_version.as_deref()),
        serial: output::or_dash(a.serial_number.as_deref()),
        enrolled: output::flag(a.is_enrolled, color),
        last_seen: a.last_seen.map_or_else(|| "-".into(), when),
    }
}

fn when(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn detail(d: &Entity<Device>, tag_ids: &[String], color: bool) -> String {
    let a = &d.attributes;
    let mut lines = vec![
        format!("ID:         {}", d.id),
        format!("Name:       {}", a.display_name()),
        format!("UDID:       {}", output::or_dash(a.udid.as_deref())),
        format!("Serial:     {}", output::or_dash(a.serial_number.as_deref())),
        format!("Model:      {}", output::or_dash(a.model_name.as_deref())),
        format!(
            "OS:         {} {}",
            output::or_dash(a.os.as_deref()),
            a.os_version.as_deref().unwrap_or_default()
        ),
        format!("Enrolled:   {}", output::flag(a.is_enrolled, color)),
        format!("Supervised: {}", output::flag(a.is_supervised, color)),
        format!("DEP:        {}", output::flag(a.is_dep, color)),
    ];
    if let Some(pct) = a.battery_percent() {
        lines.push(format!("Battery:    {pct}%"));
    }
    if let Some(seen) = a.last_seen {
        lines.push(format!("Last Seen:  {}", when(seen)));
    }
    if let Some(ref mac) = a.wifi_mac {
        lines.push(format!("Wi-Fi MAC:  {mac}"));
    }
    let tags = if tag_ids.is_empty() {
        "-".to_owned()
    } else {
        tag_ids.join(", ")
    };
    lines.push(format!("Tags:       {tags}"));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color();

    match args.command {
        DevicesCommand::List(list) => {
            let devices = util::list_page::<Device>(session, &list).await?;
            let out = output::render_list(
                global.output,
                &devices,
                |d| row(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            util::print_page_footer(session, Device::KIND, global);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let (device, envelope) = util::get_one::<Device>(session, &id).await?;
            let tag_ids = util::linked_ids(&envelope, "tags");
            let out = output::render_single(
                global.output,
                &device,
                |d| detail(d, &tag_ids, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Tags(tags) => match tags.command {
            DeviceTagsCommand::Set { id, tag_ids } => {
                let ids = to_ids(&tag_ids);
                session
                    .console
                    .set_device_tags(id.as_str(), &ids)
                    .await
                    .map_err(|e| CliError::from_lookup(e, ResourceKind::Devices, &id))?;
                report_tags(session, &id, tag_ids, global);
                Ok(())
            }
            DeviceTagsCommand::Add { id, tag_ids } => {
                let ids = to_ids(&tag_ids);
                session
                    .console
                    .add_device_tags(id.as_str(), &ids)
                    .await
                    .map_err(|e| CliError::from_lookup(e, ResourceKind::Devices, &id))?;
                report_tags(session, &id, tag_ids, global);
                Ok(())
            }
        },
    }
}

fn to_ids(raw: &[String]) -> Vec<ResourceId> {
    raw.iter().map(|id| ResourceId::from(id.as_str())).collect()
}

/// Print the device's tag ids after an edit. The store's view wins when
/// the device was loaded; otherwise echo what was sent.
fn report_tags(session: &Session, device_id: &str, sent: Vec<String>, global: &GlobalOpts) {
    let snapshot = session.console.snapshot();
    let stored = snapshot
        .resource(ResourceKind::Devices)
        .and_then(|state| state.current.as_ref())
        .filter(|current| current.id.as_str() == device_id)
        .map(|current| util::linked_ids(current, "tags"));
    let tag_ids = stored.unwrap_or(sent);

    output::print_output(&tag_ids.join("\n"), global.quiet);
}
