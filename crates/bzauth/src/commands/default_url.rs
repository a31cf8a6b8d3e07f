//! `bzauth default-url` -- print `[DEFAULT] url` from the rc files.

use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bzauth default-url` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let rc = ctx.rc_file()?;
    let url = rc.default_url();

    if ctx.json {
        output_json(&serde_json::json!({
            "url": url,
            "files": rc.loaded_files(),
        }));
        return Ok(());
    }

    match url {
        Some(url) => println!("{}", url),
        None => {
            eprintln!("No default url in bugzillarc");
            std::process::exit(1);
        }
    }
    Ok(())
}
