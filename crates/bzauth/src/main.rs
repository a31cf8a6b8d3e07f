//! `bzauth` -- inspect and update Bugzilla client credential files.
//!
//! Parses CLI arguments with clap, builds the runtime context and dispatches
//! to one handler per subcommand.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("bzauth=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = RuntimeContext::from_global_args(&cli.global).and_then(|ctx| match &cli.command {
        Some(Commands::Paths) => commands::paths::run(&ctx),
        Some(Commands::DefaultUrl) => commands::default_url::run(&ctx),
        Some(Commands::Section(args)) => commands::section::run(&ctx, args),
        Some(Commands::Token(args)) => commands::token::run(&ctx, args),
        Some(Commands::ApiKey(args)) => commands::api_key::run(&ctx, args),
        Some(Commands::Cookies(args)) => commands::cookies::run(&ctx, args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    });

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
