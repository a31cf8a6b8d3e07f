//! `bzauth paths` -- show where each credential file lives.

use anyhow::Result;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

#[derive(Serialize)]
struct PathsView {
    tokenfile: String,
    cookiefile: String,
    rcfile: String,
    config_search: Vec<SearchEntry>,
}

#[derive(Serialize)]
struct SearchEntry {
    path: String,
    exists: bool,
}

/// Execute the `bzauth paths` command.
///
/// `rcfile` is where `api-key save` writes; `config_search` is the read list.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let rcfile = match ctx.config_paths.first() {
        Some(path) => ctx.resolver.expand_user(path),
        None => ctx.resolver.default_rc_path()?,
    };
    let view = PathsView {
        tokenfile: ctx.token_path()?.display().to_string(),
        cookiefile: ctx.cookie_path()?.display().to_string(),
        rcfile: rcfile.display().to_string(),
        config_search: ctx
            .rc_paths()
            .into_iter()
            .map(|p| SearchEntry {
                exists: ctx.resolver.expand_user(&p).is_file(),
                path: p.display().to_string(),
            })
            .collect(),
    };

    if ctx.json {
        output_json(&view);
        return Ok(());
    }

    let mut rows = vec![
        vec!["token".to_string(), view.tokenfile.clone(), String::new()],
        vec!["cookies".to_string(), view.cookiefile.clone(), String::new()],
        vec!["rc (write)".to_string(), view.rcfile.clone(), String::new()],
    ];
    for entry in &view.config_search {
        let status = if entry.exists { "found" } else { "missing" };
        rows.push(vec!["rc (read)".to_string(), entry.path.clone(), status.to_string()]);
    }
    output_table(&["FILE", "PATH", "STATUS"], &rows);
    Ok(())
}
