//! Persisting API keys into a `bugzillarc` file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bzauth_core::host::host_of;
use bzauth_core::observer::{AuthEvent, Observer, TracingObserver};
use bzauth_core::paths::PathResolver;
use bzauth_core::sectioned::{self, SectionedFile};
use bzauth_core::Result;

const API_KEY: &str = "api_key";

/// Writes `api_key` entries into the highest-priority rc file.
pub struct CredentialFileWriter {
    resolver: PathResolver,
    observer: Arc<dyn Observer>,
}

impl CredentialFileWriter {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            observer: TracingObserver::shared(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// The file [`save_api_key`](Self::save_api_key) would write to.
    ///
    /// The first of `config_paths` when given, otherwise the default
    /// `bugzillarc` location (whose parent directory may get created).
    pub fn destination<P: AsRef<Path>>(&self, config_paths: &[P]) -> Result<PathBuf> {
        match config_paths.first() {
            Some(path) => Ok(self.resolver.expand_user(path)),
            None => self.resolver.default_rc_path(),
        }
    }

    /// Store `api_key` (trimmed) under the section for `url`'s host.
    ///
    /// The existing file content is loaded first so that other sections and
    /// keys are kept, then the whole file is atomically rewritten. Returns
    /// the path written.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unstorable`](bzauth_core::AuthError::Unstorable)
    /// if the host identifier or key would not read back. Fails without
    /// touching the file if it exists but cannot be read or parsed; fails
    /// with the filesystem error if the rewrite fails.
    pub fn save_api_key<P: AsRef<Path>>(
        &self,
        url: &str,
        api_key: &str,
        config_paths: &[P],
    ) -> Result<PathBuf> {
        let host = host_of(url);
        let api_key = api_key.trim();
        sectioned::check_section_name(&host)?;
        sectioned::check_value(API_KEY, api_key)?;

        let path = self.destination(config_paths)?;
        let mut cfg = SectionedFile::load(&path)?;
        cfg.ensure_section(&host).set(API_KEY, api_key);
        cfg.save(&path)?;

        self.observer
            .on_event(&AuthEvent::ApiKeyWritten { path: path.clone() });
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcfile::RcFile;
    use bzauth_core::observer::RecordingObserver;
    use pretty_assertions::assert_eq;

    const NO_PATHS: &[PathBuf] = &[];

    #[test]
    fn writes_to_first_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));

        let written = writer
            .save_api_key("https://bz.example.com/", "  key123\n", &[&first, &second])
            .unwrap();
        assert_eq!(written, first);
        assert!(!second.exists());
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            "[bz.example.com]\napi_key = key123\n\n"
        );
    }

    #[test]
    fn defaults_to_xdg_rc_path() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        let written = writer.save_api_key("bz.example.com", "k", NO_PATHS).unwrap();
        assert_eq!(written, dir.path().join(".config/python-bugzilla/bugzillarc"));
        assert!(written.exists());
    }

    #[test]
    fn defaults_to_existing_legacy_rc() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join(".bugzillarc");
        std::fs::write(&legacy, "[DEFAULT]\nurl = https://bz.example.com\n").unwrap();
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));

        assert_eq!(writer.save_api_key("bz.example.com", "k", NO_PATHS).unwrap(), legacy);
        assert!(!dir.path().join(".config").exists());
    }

    #[test]
    fn existing_sections_and_keys_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("bugzillarc");
        std::fs::write(
            &rc,
            "[DEFAULT]\nurl = https://bz.example.com\n\n[bz.example.com]\nuser = me\napi_key = old\n\n[other.org/bz]\napi_key = theirs\n",
        )
        .unwrap();

        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        writer.save_api_key("https://bz.example.com", "new", &[&rc]).unwrap();

        let mut view = RcFile::new(PathResolver::new(dir.path()));
        view.set_config_paths(&[&rc]).unwrap();
        let items = view.section_for("https://bz.example.com");
        assert_eq!(items.get("api_key").map(String::as_str), Some("new"));
        assert_eq!(items.get("user").map(String::as_str), Some("me"));
        assert_eq!(view.default_url().as_deref(), Some("https://bz.example.com"));
        assert_eq!(
            view.section_for("https://other.org/bz/xmlrpc.cgi")
                .get("api_key")
                .map(String::as_str),
            Some("theirs")
        );
    }

    #[test]
    fn confirmation_event_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("rc");
        let obs = RecordingObserver::new();
        let writer =
            CredentialFileWriter::new(PathResolver::new(dir.path())).with_observer(obs.clone());
        writer.save_api_key("h", "k", &[&rc]).unwrap();
        assert_eq!(obs.events(), vec![AuthEvent::ApiKeyWritten { path: rc }]);
    }

    #[test]
    fn unparsable_destination_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("rc");
        std::fs::write(&rc, "garbage without header\n").unwrap();
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));

        let err = writer.save_api_key("h", "k", &[&rc]).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(std::fs::read_to_string(&rc).unwrap(), "garbage without header\n");
    }

    #[test]
    fn unstorable_host_is_rejected_and_file_stays_readable() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("rc");
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        writer.save_api_key("keep.com", "k1", &[&rc]).unwrap();
        let before = std::fs::read_to_string(&rc).unwrap();

        for url in ["", "http://", "bad\nhost"] {
            let err = writer.save_api_key(url, "k", &[&rc]).unwrap_err();
            assert!(err.is_unstorable(), "{url:?}");
        }
        assert_eq!(std::fs::read_to_string(&rc).unwrap(), before);

        writer.save_api_key("other.com", "k2", &[&rc]).unwrap();
        let mut view = RcFile::new(PathResolver::new(dir.path()));
        view.set_config_paths(&[&rc]).unwrap();
        assert_eq!(view.section_for("keep.com").get("api_key").map(String::as_str), Some("k1"));
        assert_eq!(view.section_for("other.com").get("api_key").map(String::as_str), Some("k2"));
    }

    #[test]
    fn authority_less_url_key_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("rc");
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        writer.save_api_key("http:/bz", "k", &[&rc]).unwrap();

        let mut view = RcFile::new(PathResolver::new(dir.path()));
        view.set_config_paths(&[&rc]).unwrap();
        assert_eq!(view.matching_section("http:/bz"), Some("/bz"));
        assert_eq!(view.section_for("http:/bz").get("api_key").map(String::as_str), Some("k"));
    }

    #[test]
    fn key_with_comment_line_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("rc");
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        let err = writer.save_api_key("h", "a\n#b", &[&rc]).unwrap_err();
        assert!(err.is_unstorable());
        assert!(!rc.exists());
    }

    #[test]
    fn directory_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CredentialFileWriter::new(PathResolver::new(dir.path()));
        let err = writer.save_api_key("h", "k", &[dir.path()]).unwrap_err();
        assert!(matches!(err, bzauth_core::AuthError::Io { .. }));
    }
}
