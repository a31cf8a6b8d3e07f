//! `bzauth cookies` -- inspect the cookie jar.

use anyhow::Result;

use bzauth_cookies::Cookie;

use crate::cli::{CookiesArgs, CookiesCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `bzauth cookies` command.
pub fn run(ctx: &RuntimeContext, args: &CookiesArgs) -> Result<()> {
    match &args.command {
        CookiesCommands::List => run_list(ctx),
    }
}

fn run_list(ctx: &RuntimeContext) -> Result<()> {
    let store = ctx.cookie_store()?;
    let cookies: Vec<&Cookie> = store
        .cookie_jar()
        .map(|jar| jar.iter().collect())
        .unwrap_or_default();

    if ctx.json {
        output_json(&cookies);
        return Ok(());
    }

    if cookies.is_empty() {
        if !ctx.quiet {
            println!("No cookies");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = cookies
        .iter()
        .map(|c| {
            vec![
                c.domain.clone(),
                c.path.clone(),
                c.name.clone(),
                c.expires
                    .map(|e| e.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "session".to_string()),
                if c.secure { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output_table(&["DOMAIN", "PATH", "NAME", "EXPIRES", "SECURE"], &rows);
    Ok(())
}
