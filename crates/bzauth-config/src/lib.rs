//! Connection defaults and per-host credentials for the Bugzilla client.
//!
//! - [`rcfile`]: the layered `bugzillarc` search and per-URL section matching.
//! - [`token`]: the `bugzillatoken` session-token cache.
//! - [`apikey`]: writing an API key into a `bugzillarc` file.

pub mod apikey;
pub mod rcfile;
pub mod token;

pub use apikey::CredentialFileWriter;
pub use rcfile::RcFile;
pub use token::TokenCache;
