//! Tag command handlers.

use tabled::Tabled;

use mdmconsole_core::model::tag::DEFAULT_TAG_COLOR;
use mdmconsole_core::{Entity, ResourceAttributes, Tag};

use crate::cli::{GlobalOpts, TagsArgs, TagsCommand};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
}

fn row(t: &Entity<Tag>, color: bool) -> TagRow {
    let hex = t.attributes.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR);
    TagRow {
        id: t.id.to_string(),
        name: output::or_dash(t.attributes.name.as_deref()),
        color: output::swatch(hex, color),
    }
}

pub async fn handle(session: &Session, args: TagsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TagsCommand::List(list) => {
            let color = output::should_color();
            let tags = util::list_page::<Tag>(session, &list).await?;
            let out = output::render_list(
                global.output,
                &tags,
                |t| row(t, color),
                |t| t.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            util::print_page_footer(session, Tag::KIND, global);
            Ok(())
        }

        TagsCommand::Create { name, color } => {
            let document = session.console.create_tag(&name, color.as_deref()).await?;
            match util::document_id(&document) {
                Some(id) => output::print_output(&id.to_string(), global.quiet),
                None => output::print_status(&format!("created tag '{name}'"), global.quiet),
            }
            Ok(())
        }
    }
}
