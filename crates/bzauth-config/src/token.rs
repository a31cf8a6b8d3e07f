//! The `bugzillatoken` session-token cache.
//!
//! One section per host, each optionally holding a `token` key:
//!
//! ```text
//! [bugzilla.example.com]
//! token = 12345-abcdef
//! ```
//!
//! The cache only touches disk from [`TokenCache::set_value`], and only when
//! a file name is bound. An unbound cache is a valid no-cache mode.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bzauth_core::host::host_of;
use bzauth_core::observer::{AuthEvent, Observer, TracingObserver};
use bzauth_core::sectioned::{self, SectionedFile};
use bzauth_core::Result;

const TOKEN_KEY: &str = "token";

/// Per-host token storage backed by an optional file.
pub struct TokenCache {
    filename: Option<PathBuf>,
    cfg: SectionedFile,
    observer: Arc<dyn Observer>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    /// An empty cache with no backing file.
    pub fn new() -> Self {
        Self {
            filename: None,
            cfg: SectionedFile::new(),
            observer: TracingObserver::shared(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Bind the cache to `filename`, replacing the in-memory content.
    ///
    /// An existing file is loaded; a missing one starts empty and is created
    /// on the first [`set_value`](Self::set_value). `None` drops back to an
    /// in-memory cache.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn set_filename(&mut self, filename: Option<&Path>) -> Result<()> {
        self.observer.on_event(&AuthEvent::FileBound {
            store: "tokenfile",
            path: filename.map(Path::to_path_buf),
        });
        let cfg = match filename {
            Some(path) => SectionedFile::load(path)?,
            None => SectionedFile::new(),
        };
        self.cfg = cfg;
        self.filename = filename.map(Path::to_path_buf);
        Ok(())
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Make sure a section exists for the host of `url` and return its name.
    ///
    /// Only the in-memory store is touched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unstorable`](bzauth_core::AuthError::Unstorable)
    /// when the host identifier cannot be a section name (empty, or with a
    /// line break); nothing is created in that case.
    pub fn ensure_host(&mut self, url: &str) -> Result<String> {
        let host = host_of(url);
        sectioned::check_section_name(&host)?;
        self.cfg.ensure_section(&host);
        Ok(host)
    }

    /// The cached token for `url`'s host, if any.
    ///
    /// Hosts that cannot be stored never have a token.
    pub fn get_value(&mut self, url: &str) -> Option<String> {
        let host = self.ensure_host(url).ok()?;
        self.cfg
            .section(&host)
            .and_then(|s| s.get(TOKEN_KEY))
            .map(str::to_string)
    }

    /// Store `value` (trimmed) as the token for `url`'s host, or clear it
    /// when `value` is `None` or blank.
    ///
    /// Nothing happens when the value is unchanged. Otherwise the whole cache
    /// is rewritten to the bound file, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unstorable`](bzauth_core::AuthError::Unstorable)
    /// before anything changes if the host or token would not read back, or
    /// the filesystem error if the rewrite fails.
    pub fn set_value(&mut self, url: &str, value: Option<&str>) -> Result<()> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        if let Some(token) = value {
            sectioned::check_value(TOKEN_KEY, token)?;
        }
        if self.get_value(url).as_deref() == value {
            return Ok(());
        }

        let host = self.ensure_host(url)?;
        match value {
            Some(token) => self.cfg.set(&host, TOKEN_KEY, token),
            None => {
                self.cfg.remove(&host, TOKEN_KEY);
            }
        }

        if let Some(path) = &self.filename {
            self.cfg.save(path)?;
            self.observer
                .on_event(&AuthEvent::FileSaved { path: path.clone() });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
