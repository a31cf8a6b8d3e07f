//! `bzauth api-key` -- persist API keys into bugzillarc.
//!
//! The confirmation line is printed by the console observer when the key is
//! written, so this handler only reports in JSON mode.

use anyhow::{bail, Context, Result};

use bzauth_core::host_of;

use crate::cli::{ApiKeyArgs, ApiKeyCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bzauth api-key` command.
pub fn run(ctx: &RuntimeContext, args: &ApiKeyArgs) -> Result<()> {
    match &args.command {
        ApiKeyCommands::Save(save_args) => run_save(ctx, &save_args.url, &save_args.key),
    }
}

fn run_save(ctx: &RuntimeContext, url: &str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    let path = ctx
        .credential_writer()
        .save_api_key(url, key, &ctx.config_paths)
        .context("failed to save API key")?;

    if ctx.json {
        output_json(&serde_json::json!({
            "host": host_of(url),
            "path": path,
        }));
    }
    Ok(())
}
