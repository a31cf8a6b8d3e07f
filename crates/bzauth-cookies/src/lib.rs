//! Session cookie persistence in the Netscape `cookies.txt` format.
//!
//! [`CookieJarStore`] owns one [`CookieJar`] and the file it is saved to.
//! New files are created owner-only before any cookie is written, and a
//! file that is not in the expected format is reported, never overwritten.

pub mod cookie;
pub mod netscape;
pub mod store;

pub use cookie::{Cookie, CookieJar};
pub use store::CookieJarStore;
