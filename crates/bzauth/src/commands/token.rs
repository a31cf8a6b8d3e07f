//! `bzauth token` -- read and update the session token cache.

use anyhow::{Context, Result};

use bzauth_core::host_of;

use crate::cli::{TokenArgs, TokenCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bzauth token` command.
pub fn run(ctx: &RuntimeContext, args: &TokenArgs) -> Result<()> {
    match &args.command {
        TokenCommands::Get(get_args) => run_get(ctx, &get_args.url),
        TokenCommands::Set(set_args) => run_set(ctx, &set_args.url, Some(set_args.token.as_str())),
        TokenCommands::Clear(clear_args) => run_set(ctx, &clear_args.url, None),
    }
}

fn run_get(ctx: &RuntimeContext, url: &str) -> Result<()> {
    let mut cache = ctx.token_cache()?;
    let token = cache.get_value(url);

    if ctx.json {
        output_json(&serde_json::json!({
            "host": host_of(url),
            "token": token,
        }));
        return Ok(());
    }

    match token {
        Some(token) => println!("{}", token),
        None => {
            eprintln!("No token cached for '{}'", host_of(url));
            std::process::exit(1);
        }
    }
    Ok(())
}

fn run_set(ctx: &RuntimeContext, url: &str, token: Option<&str>) -> Result<()> {
    let mut cache = ctx.token_cache()?;
    cache
        .set_value(url, token)
        .with_context(|| format!("failed to update token for '{}'", url))?;

    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let host = host_of(url);
    let path = cache
        .filename()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    if ctx.json {
        output_json(&serde_json::json!({
            "host": host,
            "token": token,
            "tokenfile": path,
        }));
    } else if !ctx.quiet {
        match token {
            Some(_) => println!("Cached token for {} in {}", host, path),
            None => println!("Cleared token for {}", host),
        }
    }
    Ok(())
}
