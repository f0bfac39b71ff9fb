//! `astro members` - List the suffixes a value type accepts.

use astro_host::{inheritance_of, members_of, TYPE_NAMES};
use termcolor::ColorChoice;

use crate::output::StyledOutput;

pub fn execute(type_name: &str, json: bool, color: ColorChoice) -> anyhow::Result<()> {
    let (Some(members), Some(chain)) = (members_of(type_name), inheritance_of(type_name)) else {
        anyhow::bail!(
            "Unknown type '{}'. Known types: {}",
            type_name,
            TYPE_NAMES.join(", ")
        );
    };

    if json {
        let listing = serde_json::json!({
            "type": chain[0],
            "inheritance": chain,
            "members": members,
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let mut out = StyledOutput::new(color);
    out.bold(chain[0]);
    out.dim(&format!("  ({})", chain.join(" derived from ")));
    out.newline();

    let width = members.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for member in &members {
        out.info(&format!("  {:<width$}", member.name, width = width));
        out.plain(&format!("  {:<12}", member.access.to_string()));
        if let Some(doc) = &member.doc {
            out.plain(doc);
        }
        if !member.aliases.is_empty() {
            out.dim(&format!(" (alias {})", member.aliases.join(", ")));
        }
        if member.origin != chain[0] {
            out.dim(&format!(" [from {}]", member.origin));
        }
        out.newline();
    }
    out.flush();
    Ok(())
}
