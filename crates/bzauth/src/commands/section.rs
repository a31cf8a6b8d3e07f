//! `bzauth section` -- show the rc settings that apply to a URL.

use anyhow::Result;

use crate::cli::SectionArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bzauth section` command.
pub fn run(ctx: &RuntimeContext, args: &SectionArgs) -> Result<()> {
    let rc = ctx.rc_file()?;
    let section = rc.matching_section(&args.url).map(str::to_string);
    let settings = rc.section_for(&args.url);

    if ctx.json {
        output_json(&serde_json::json!({
            "url": args.url,
            "section": section,
            "settings": settings,
        }));
        return Ok(());
    }

    let Some(name) = section else {
        eprintln!("No bugzillarc section matches '{}'", args.url);
        std::process::exit(1);
    };
    if !ctx.quiet {
        println!("[{}]", name);
    }
    for (key, value) in &settings {
        println!("{} = {}", key, value);
    }
    Ok(())
}
