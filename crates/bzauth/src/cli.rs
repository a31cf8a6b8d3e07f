//! Clap CLI definitions for the `bzauth` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// bzauth -- inspect and update Bugzilla client credential files.
#[derive(Parser, Debug)]
#[command(
    name = "bzauth",
    about = "Inspect and update Bugzilla client credential files",
    long_about = "Resolves bugzillarc connection defaults, the bugzillatoken cache and the \
                  bugzillacookies jar the same way the Bugzilla client does.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// bugzillarc file to read (repeatable; later files win). Defaults to the
    /// standard search list.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Token cache file (default: ~/.bugzillatoken or ~/.cache/python-bugzilla/bugzillatoken).
    #[arg(long, global = true, value_name = "PATH")]
    pub tokenfile: Option<PathBuf>,

    /// Cookie file (default: ~/.bugzillacookies or ~/.cache/python-bugzilla/bugzillacookies).
    #[arg(long, global = true, value_name = "PATH")]
    pub cookiefile: Option<PathBuf>,

    /// Home directory used to resolve default locations.
    #[arg(long, global = true, env = "BZAUTH_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved credential file locations.
    Paths,

    /// Show the default service URL from bugzillarc.
    DefaultUrl,

    /// Show the bugzillarc settings that apply to a URL.
    Section(SectionArgs),

    /// Read or update the session token cache.
    Token(TokenArgs),

    /// Manage API keys stored in bugzillarc.
    ApiKey(ApiKeyArgs),

    /// Inspect the cookie jar.
    Cookies(CookiesArgs),
}

/// Arguments for `bzauth section`.
#[derive(Args, Debug)]
pub struct SectionArgs {
    /// Service URL or bare host name.
    pub url: String,
}

/// Arguments for `bzauth token`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommands,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Print the cached token for a URL.
    Get(TokenUrlArgs),
    /// Cache a token for a URL.
    Set(TokenSetArgs),
    /// Remove the cached token for a URL.
    Clear(TokenUrlArgs),
}

/// A URL argument for token subcommands.
#[derive(Args, Debug)]
pub struct TokenUrlArgs {
    /// Service URL or bare host name.
    pub url: String,
}

/// Arguments for `bzauth token set`.
#[derive(Args, Debug)]
pub struct TokenSetArgs {
    /// Service URL or bare host name.
    pub url: String,
    /// Token value.
    pub token: String,
}

/// Arguments for `bzauth api-key`.
#[derive(Args, Debug)]
pub struct ApiKeyArgs {
    #[command(subcommand)]
    pub command: ApiKeyCommands,
}

/// API key subcommands.
#[derive(Subcommand, Debug)]
pub enum ApiKeyCommands {
    /// Save an API key for a URL into the first --config file (or the default bugzillarc).
    Save(ApiKeySaveArgs),
}

/// Arguments for `bzauth api-key save`.
#[derive(Args, Debug)]
pub struct ApiKeySaveArgs {
    /// Service URL or bare host name.
    pub url: String,
    /// API key value (surrounding whitespace is trimmed).
    pub key: String,
}

/// Arguments for `bzauth cookies`.
#[derive(Args, Debug)]
pub struct CookiesArgs {
    #[command(subcommand)]
    pub command: CookiesCommands,
}

/// Cookie subcommands.
#[derive(Subcommand, Debug)]
pub enum CookiesCommands {
    /// List the cookies in the cookie file.
    List,
}
