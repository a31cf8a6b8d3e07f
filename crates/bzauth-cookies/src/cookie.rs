//! Cookie records and the in-memory jar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bzauth_core::{AuthError, Result};

/// One stored cookie.
///
/// Identity is the `(domain, path, name)` triple; setting a cookie with the
/// same triple replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub domain: String,
    /// Whether the cookie applies to subdomains. Always `true` for domains
    /// with a leading dot.
    pub domain_specified: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// `None` for a session cookie.
    pub expires: Option<DateTime<Utc>>,
    pub name: String,
    pub value: String,
}

impl Cookie {
    /// A session cookie for `domain` with path `/` and no flags.
    pub fn new(domain: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            domain_specified: domain.starts_with('.'),
            domain,
            path: "/".to_string(),
            secure: false,
            http_only: false,
            expires: None,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// True if `self` and `other` share the `(domain, path, name)` identity.
    pub fn same_identity(&self, other: &Cookie) -> bool {
        self.domain == other.domain && self.path == other.path && self.name == other.name
    }

    /// Reject cookies that cannot be stored one-per-line.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCookie`] for an empty domain, a domain
    /// that would read back as a comment (`#` or `$`), a domain-specified
    /// flag that disagrees with the leading dot, or tabs or line breaks in
    /// any text field.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(AuthError::InvalidCookie(format!(
                "cookie '{}' has no domain",
                self.name
            )));
        }
        if self.domain.starts_with(['#', '$']) {
            return Err(AuthError::InvalidCookie(format!(
                "domain of cookie '{}' starts with a comment marker",
                self.name
            )));
        }
        if self.domain_specified != self.domain.starts_with('.') {
            return Err(AuthError::InvalidCookie(format!(
                "cookie '{}': include-subdomains must match a leading dot on '{}'",
                self.name, self.domain
            )));
        }
        for (field, text) in [
            ("domain", &self.domain),
            ("path", &self.path),
            ("name", &self.name),
            ("value", &self.value),
        ] {
            if text.contains(['\t', '\n', '\r']) {
                return Err(AuthError::InvalidCookie(format!(
                    "{field} of cookie '{}' contains a tab or line break",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// An ordered collection of cookies with replace-on-match semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `cookie`, replacing any cookie with the same identity in place.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.same_identity(&cookie)) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn get(&self, domain: &str, path: &str, name: &str) -> Option<&Cookie> {
        self.cookies
            .iter()
            .find(|c| c.domain == domain && c.path == path && c.name == name)
    }

    pub fn remove(&mut self, domain: &str, path: &str, name: &str) -> Option<Cookie> {
        let idx = self
            .cookies
            .iter()
            .position(|c| c.domain == domain && c.path == path && c.name == name)?;
        Some(self.cookies.remove(idx))
    }

    /// Drop every cookie that has expired by `now`. Returns how many went.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|c| !c.is_expired(now));
        before - self.cookies.len()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for cookie in iter {
            jar.set_cookie(cookie);
        }
        jar
    }
}
