//! File-backed cookie jar.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use bzauth_core::fsutil;
use bzauth_core::observer::{AuthEvent, Observer, TracingObserver};
use bzauth_core::{AuthError, Result};

use crate::cookie::{Cookie, CookieJar};
use crate::netscape;

enum Binding {
    Unbound,
    Bound {
        filename: Option<PathBuf>,
        jar: CookieJar,
    },
}

/// A cookie jar and the file it persists to.
///
/// Until [`set_filename`](Self::set_filename) is called the store is
/// unbound and ignores cookies. Binding to `None` gives an in-memory jar.
pub struct CookieJarStore {
    binding: Binding,
    observer: Arc<dyn Observer>,
}

impl Default for CookieJarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJarStore {
    pub fn new() -> Self {
        Self {
            binding: Binding::Unbound,
            observer: TracingObserver::shared(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Bind the store to `filename`, replacing any current jar.
    ///
    /// A missing file is created empty with mode 0600 and saved straight
    /// away. An existing file is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigFormat`] if the existing file is not a
    /// Netscape cookie file (the file is not modified), or the filesystem
    /// error if it cannot be created, read or saved. The store keeps its
    /// previous binding on error.
    pub fn set_filename(&mut self, filename: Option<&Path>) -> Result<()> {
        self.observer.on_event(&AuthEvent::FileBound {
            store: "cookiefile",
            path: filename.map(Path::to_path_buf),
        });

        let jar = match filename {
            None => CookieJar::new(),
            Some(path) if !path.exists() => {
                fsutil::create_private_file(path)?;
                let jar = CookieJar::new();
                write_jar(self.observer.as_ref(), path, &jar)?;
                jar
            }
            Some(path) => load_jar(path)?,
        };

        self.binding = Binding::Bound {
            filename: filename.map(Path::to_path_buf),
            jar,
        };
        Ok(())
    }

    /// The bound file, or `None` when unbound or in-memory.
    pub fn filename(&self) -> Option<&Path> {
        match &self.binding {
            Binding::Bound {
                filename: Some(path),
                ..
            } => Some(path),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.binding, Binding::Bound { .. })
    }

    /// The current jar, or `None` while unbound.
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        match &self.binding {
            Binding::Bound { jar, .. } => Some(jar),
            Binding::Unbound => None,
        }
    }

    /// Insert or replace each cookie, then save if a file is bound.
    ///
    /// Every cookie is validated before the jar changes, so a rejected
    /// cookie leaves both the jar and the file as they were. Unbound stores
    /// ignore the call.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCookie`] for an unstorable cookie or the
    /// filesystem error if saving fails.
    pub fn set_cookies<I>(&mut self, cookies: I) -> Result<()>
    where
        I: IntoIterator<Item = Cookie>,
    {
        let cookies: Vec<Cookie> = cookies.into_iter().collect();
        for cookie in &cookies {
            cookie.validate()?;
        }

        let Binding::Bound { filename, jar } = &mut self.binding else {
            return Ok(());
        };
        for cookie in cookies {
            jar.set_cookie(cookie);
        }
        jar.remove_expired(Utc::now());

        if let Some(path) = filename {
            write_jar(self.observer.as_ref(), path, jar)?;
        }
        Ok(())
    }
}

fn write_jar(observer: &dyn Observer, path: &Path, jar: &CookieJar) -> Result<()> {
    let text = netscape::render(jar, Utc::now());
    fsutil::write_atomic(path, text.as_bytes())?;
    observer.on_event(&AuthEvent::FileSaved {
        path: path.to_path_buf(),
    });
    Ok(())
}

fn load_jar(path: &Path) -> Result<CookieJar> {
    let bytes = std::fs::read(path).map_err(|e| AuthError::io(path, e))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| AuthError::format(path, 0, "cookie file is not valid UTF-8"))?;
    netscape::parse(path, &text, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
