//! Default locations for credential and configuration files.
//!
//! Every file has two candidate locations: the legacy flat dotfile in the
//! home directory (`~/.bugzillatoken`) and the namespaced XDG-style one
//! (`~/.cache/python-bugzilla/bugzillatoken`). The modern path wins when it
//! exists; the legacy path is honoured so older installs keep working
//! without a forced migration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AuthError, Result};
use crate::observer::{AuthEvent, Observer, TracingObserver};

/// Namespace directory shared with existing Bugzilla client installs.
pub const DEFAULT_NAMESPACE: &str = "python-bugzilla";

/// Logical name of the token cache file.
pub const TOKEN_FILE: &str = "bugzillatoken";

/// Logical name of the cookie jar file.
pub const COOKIE_FILE: &str = "bugzillacookies";

/// Logical name of the connection-defaults file.
pub const RC_FILE: &str = "bugzillarc";

/// System-wide connection-defaults file, searched first.
pub const SYSTEM_RC_PATH: &str = "/etc/bugzillarc";

/// Mode for directories created to hold credential files.
#[cfg(unix)]
const PRIVATE_DIR_MODE: u32 = 0o700;

/// Which namespaced directory a file belongs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `~/.cache/<namespace>/`: tokens and cookies.
    Cache,
    /// `~/.config/<namespace>/`: connection defaults.
    Config,
}

impl FileKind {
    /// The dot-directory name under the home directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Cache => ".cache",
            Self::Config => ".config",
        }
    }
}

/// Computes default file locations relative to a home directory.
#[derive(Clone)]
pub struct PathResolver {
    home: PathBuf,
    namespace: String,
    observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("home", &self.home)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl PathResolver {
    /// Create a resolver rooted at `home`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            observer: TracingObserver::shared(),
        }
    }

    /// Create a resolver for the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoHomeDir`] if the home directory is unknown.
    pub fn from_env() -> Result<Self> {
        home_dir().map(Self::new).ok_or(AuthError::NoHomeDir)
    }

    /// Use `namespace` instead of [`DEFAULT_NAMESPACE`].
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Report directory creation to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Expand a leading `~` against the home directory.
    ///
    /// Only the bare `~` and `~/...` forms are expanded; `~user` is left as is.
    pub fn expand_user(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match path.strip_prefix("~") {
            Ok(rest) => self.home.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }

    /// `~/.{name}`
    pub fn legacy_path(&self, name: &str) -> PathBuf {
        self.home.join(format!(".{name}"))
    }

    /// `~/.{kind}/{namespace}/{name}`
    pub fn modern_path(&self, name: &str, kind: FileKind) -> PathBuf {
        self.home
            .join(kind.dir_name())
            .join(&self.namespace)
            .join(name)
    }

    /// Resolve the default location for the logical file `name`.
    ///
    /// An existing modern file wins, then an existing legacy file. When
    /// neither exists the modern path's parent directory is created with
    /// mode 0700 and the modern path is returned; the file itself is left
    /// for the caller to create.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the parent directory cannot be created.
    pub fn resolve_default_path(&self, name: &str, kind: FileKind) -> Result<PathBuf> {
        let modern = self.modern_path(name, kind);
        if modern.exists() {
            return Ok(modern);
        }

        let legacy = self.legacy_path(name);
        if legacy.exists() {
            return Ok(legacy);
        }

        if let Some(parent) = modern.parent() {
            if !parent.is_dir() {
                create_private_dir(parent)?;
                self.observer.on_event(&AuthEvent::DirectoryCreated {
                    path: parent.to_path_buf(),
                });
            }
        }
        Ok(modern)
    }

    pub fn default_token_path(&self) -> Result<PathBuf> {
        self.resolve_default_path(TOKEN_FILE, FileKind::Cache)
    }

    pub fn default_cookie_path(&self) -> Result<PathBuf> {
        self.resolve_default_path(COOKIE_FILE, FileKind::Cache)
    }

    pub fn default_rc_path(&self) -> Result<PathBuf> {
        self.resolve_default_path(RC_FILE, FileKind::Config)
    }

    /// The built-in connection-defaults search list, lowest priority first.
    ///
    /// Later files override earlier ones when read together.
    pub fn rc_search_paths(&self) -> Vec<PathBuf> {
        vec![
            PathBuf::from(SYSTEM_RC_PATH),
            self.legacy_path(RC_FILE),
            self.modern_path(RC_FILE, FileKind::Config),
        ]
    }
}

fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PRIVATE_DIR_MODE);
    }
    match builder.create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(AuthError::io(path, e)),
    }
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use pretty_assertions::assert_eq;

    fn resolver(home: &Path) -> PathResolver {
        PathResolver::new(home)
    }

    #[test]
    fn legacy_and_modern_layout() {
        let r = PathResolver::new("/home/u");
        assert_eq!(r.legacy_path("bugzillatoken"), PathBuf::from("/home/u/.bugzillatoken"));
        assert_eq!(
            r.modern_path("bugzillatoken", FileKind::Cache),
            PathBuf::from("/home/u/.cache/python-bugzilla/bugzillatoken")
        );
        assert_eq!(
            r.modern_path("bugzillarc", FileKind::Config),
            PathBuf::from("/home/u/.config/python-bugzilla/bugzillarc")
        );
    }

    #[test]
    fn only_legacy_exists_returns_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        std::fs::write(dir.path().join(".bugzillatoken"), "").unwrap();

        let got = r.resolve_default_path("bugzillatoken", FileKind::Cache).unwrap();
        assert_eq!(got, dir.path().join(".bugzillatoken"));
        assert!(!dir.path().join(".cache").exists());
    }

    #[test]
    fn only_modern_exists_returns_modern() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let modern = r.modern_path("bugzillacookies", FileKind::Cache);
        std::fs::create_dir_all(modern.parent().unwrap()).unwrap();
        std::fs::write(&modern, "").unwrap();

        assert_eq!(r.default_cookie_path().unwrap(), modern);
    }

    #[test]
    fn both_exist_modern_wins_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let obs = RecordingObserver::new();
        let r = resolver(dir.path()).with_observer(obs.clone());
        let modern = r.modern_path("bugzillatoken", FileKind::Cache);
        std::fs::create_dir_all(modern.parent().unwrap()).unwrap();
        std::fs::write(&modern, "").unwrap();
        std::fs::write(dir.path().join(".bugzillatoken"), "").unwrap();

        assert_eq!(r.default_token_path().unwrap(), modern);
        assert!(obs.events().is_empty());
    }

    #[test]
    fn neither_exists_creates_private_parent_only() {
        let dir = tempfile::tempdir().unwrap();
        let obs = RecordingObserver::new();
        let r = resolver(dir.path()).with_observer(obs.clone());

        let got = r.default_rc_path().unwrap();
        assert_eq!(got, dir.path().join(".config/python-bugzilla/bugzillarc"));
        assert!(got.parent().unwrap().is_dir());
        assert!(!got.exists());
        assert_eq!(
            obs.events(),
            vec![AuthEvent::DirectoryCreated {
                path: got.parent().unwrap().to_path_buf()
            }]
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(got.parent().unwrap())
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let first = r.default_token_path().unwrap();
        let second = r.default_token_path().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parent_blocked_by_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".cache"), "not a dir").unwrap();
        let err = resolver(dir.path()).default_token_path().unwrap_err();
        assert!(matches!(err, AuthError::Io { .. }));
    }

    #[test]
    fn custom_namespace() {
        let r = PathResolver::new("/h").with_namespace("bzauth");
        assert_eq!(
            r.modern_path("bugzillarc", FileKind::Config),
            PathBuf::from("/h/.config/bzauth/bugzillarc")
        );
    }

    #[test]
    fn expand_user_handles_tilde_forms() {
        let r = PathResolver::new("/home/u");
        assert_eq!(r.expand_user("~/.bugzillarc"), PathBuf::from("/home/u/.bugzillarc"));
        assert_eq!(r.expand_user("~"), PathBuf::from("/home/u"));
        assert_eq!(r.expand_user("/etc/bugzillarc"), PathBuf::from("/etc/bugzillarc"));
        assert_eq!(r.expand_user("~other/x"), PathBuf::from("~other/x"));
    }

    #[test]
    fn rc_search_paths_order() {
        let r = PathResolver::new("/home/u");
        assert_eq!(
            r.rc_search_paths(),
            vec![
                PathBuf::from("/etc/bugzillarc"),
                PathBuf::from("/home/u/.bugzillarc"),
                PathBuf::from("/home/u/.config/python-bugzilla/bugzillarc"),
            ]
        );
    }
}
