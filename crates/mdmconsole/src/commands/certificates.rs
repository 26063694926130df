//! Certificate command handlers.

use chrono::Utc;
use owo_colors::OwoColorize;
use tabled::Tabled;

use mdmconsole_core::{Certificate, Entity, ResourceAttributes};

use crate::cli::{CertificatesArgs, CertificatesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct CertificateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    purpose: String,
    #[tabled(rename = "Common Name")]
    common_name: String,
    #[tabled(rename = "Expires")]
    not_after: String,
}

fn row(c: &Entity<Certificate>, color: bool) -> CertificateRow {
    let a = &c.attributes;
    let expires = a
        .not_after
        .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string());
    let not_after = if color && a.is_expired_at(Utc::now()) {
        expires.red().to_string()
    } else {
        expires
    };
    CertificateRow {
        id: c.id.to_string(),
        purpose: output::or_dash(a.purpose.as_deref()),
        common_name: output::or_dash(a.x509_cn.as_deref()),
        not_after,
    }
}

pub async fn handle(
    session: &Session,
    args: CertificatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CertificatesCommand::List(list) => {
            let color = output::should_color();
            let certificates = util::list_page::<Certificate>(session, &list).await?;
            let out = output::render_list(
                global.output,
                &certificates,
                |c| row(c, color),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            util::print_page_footer(session, Certificate::KIND, global);
            Ok(())
        }
    }
}
