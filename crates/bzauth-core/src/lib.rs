//! Shared building blocks for locating and reading bzauth credential files.
//!
//! This crate knows *where* credential files live ([`paths`]), how URLs map
//! to lookup keys ([`host`]), and how the sectioned key-value format used by
//! `bugzillarc` and `bugzillatoken` is read and written ([`sectioned`]).
//! The cookie jar lives in `bzauth-cookies`; the rc file, token cache and
//! API key writer live in `bzauth-config`.

pub mod error;
pub mod fsutil;
pub mod host;
pub mod observer;
pub mod paths;
pub mod sectioned;

pub use error::{AuthError, Result};
pub use host::host_of;
pub use observer::{AuthEvent, Observer, TracingObserver};
pub use paths::{FileKind, PathResolver};
pub use sectioned::SectionedFile;
