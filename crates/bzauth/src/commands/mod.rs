//! Command handlers, one module per subcommand.

pub mod api_key;
pub mod cookies;
pub mod default_url;
pub mod paths;
pub mod section;
pub mod token;
