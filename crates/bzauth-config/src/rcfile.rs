//! The layered `bugzillarc` connection-defaults file.
//!
//! Several rc files may be read together (system, legacy home, XDG config);
//! they merge in order with later files winning. Lookups never fail: a URL
//! with no matching section gets an empty mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bzauth_core::host::host_of;
use bzauth_core::observer::{AuthEvent, Observer, TracingObserver};
use bzauth_core::paths::PathResolver;
use bzauth_core::sectioned::SectionedFile;
use bzauth_core::Result;

/// Read-only view over the merged rc files.
pub struct RcFile {
    resolver: PathResolver,
    observer: Arc<dyn Observer>,
    config_paths: Vec<PathBuf>,
    loaded: Vec<PathBuf>,
    cfg: SectionedFile,
}

impl RcFile {
    /// An rc view with no files configured.
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            observer: TracingObserver::shared(),
            config_paths: Vec::new(),
            loaded: Vec::new(),
            cfg: SectionedFile::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// The built-in search list: `/etc/bugzillarc`, `~/.bugzillarc`,
    /// `~/.config/python-bugzilla/bugzillarc`.
    pub fn default_config_paths(resolver: &PathResolver) -> Vec<PathBuf> {
        resolver.rc_search_paths()
    }

    /// Replace the configured files and re-read them.
    ///
    /// Paths are `~`-expanded and de-duplicated keeping the first occurrence.
    /// Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Fails if a file exists but cannot be read or parsed; the previous
    /// state is kept in that case.
    pub fn set_config_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<()> {
        let mut expanded: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            let path = self.resolver.expand_user(path);
            if !expanded.contains(&path) {
                expanded.push(path);
            }
        }

        let mut cfg = SectionedFile::new();
        let loaded = cfg.read_paths(&expanded)?;
        if !loaded.is_empty() {
            self.observer.on_event(&AuthEvent::ConfigFilesFound {
                paths: loaded.clone(),
            });
        }

        self.cfg = cfg;
        self.loaded = loaded;
        self.config_paths = expanded;
        Ok(())
    }

    /// The configured files, in the order given.
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// The configured files that existed and were read.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// `url` from the `[DEFAULT]` section, if any.
    pub fn default_url(&self) -> Option<String> {
        let url = self.cfg.defaults().get("url")?.to_string();
        self.observer
            .on_event(&AuthEvent::DefaultUrlFound { url: url.clone() });
        Some(url)
    }

    /// Name of the section that applies to `url`, if any.
    ///
    /// Section names are tried in sorted order. A name without `/` matches
    /// only when it equals the URL's host identifier. A name with `/` matches
    /// when it occurs anywhere in the full URL. The first match wins.
    pub fn matching_section(&self, url: &str) -> Option<&str> {
        let host = host_of(url);
        let mut names: Vec<&str> = self.cfg.section_names().collect();
        names.sort_unstable();
        names.into_iter().find(|name| {
            if name.contains('/') {
                url.contains(name)
            } else {
                *name == host
            }
        })
    }

    /// All settings for `url`: the matched section overlaid on `[DEFAULT]`.
    ///
    /// Returns an empty mapping when no section matches.
    pub fn section_for(&self, url: &str) -> BTreeMap<String, String> {
        let section = self.matching_section(url);
        self.observer.on_event(&AuthEvent::SectionMatched {
            url: url.to_string(),
            section: section.map(str::to_string),
        });
        section
            .and_then(|name| self.cfg.items(name))
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bzauth_core::observer::RecordingObserver;
    use pretty_assertions::assert_eq;

    fn rc_with(text: &str) -> (tempfile::TempDir, RcFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bugzillarc");
        std::fs::write(&path, text).unwrap();
        let mut rc = RcFile::new(PathResolver::new(dir.path()));
        rc.set_config_paths(&[&path]).unwrap();
        (dir, rc)
    }

    #[test]
    fn default_url_from_default_section() {
        let (_dir, rc) = rc_with("[DEFAULT]\nurl = https://bz.example.com\n");
        assert_eq!(rc.default_url().as_deref(), Some("https://bz.example.com"));
    }

    #[test]
    fn default_url_absent() {
        let (_dir, rc) = rc_with("[bz.example.com]\napi_key = k\n");
        assert_eq!(rc.default_url(), None);
    }

    #[test]
    fn exact_host_section_matches_both_url_forms() {
        let (_dir, rc) = rc_with("[bz.example.com]\napi_key = k\nuser = me\n");
        for url in ["https://bz.example.com/xmlrpc.cgi", "bz.example.com"] {
            let items = rc.section_for(url);
            assert_eq!(items.get("api_key").map(String::as_str), Some("k"), "{url}");
            assert_eq!(items.get("user").map(String::as_str), Some("me"));
        }
    }

    #[test]
    fn substring_section_wins_when_sorted_first() {
        let (_dir, rc) = rc_with("[a.com]\nwhich = exact\n\n[a.com/sub]\nwhich = substring\n");
        // Sorted: "a.com" < "a.com/sub"; the exact section matches first.
        assert_eq!(rc.matching_section("http://a.com/sub/x"), Some("a.com"));

        let (_dir, rc) = rc_with("[a.com/sub]\nwhich = substring\n\n[b.a.com]\nwhich = other\n");
        assert_eq!(rc.matching_section("http://a.com/sub/x"), Some("a.com/sub"));
        assert_eq!(
            rc.section_for("http://a.com/sub/x").get("which").map(String::as_str),
            Some("substring")
        );
    }

    #[test]
    fn exact_host_sections_never_match_by_substring() {
        let (_dir, rc) = rc_with("[example.com]\nk = v\n");
        assert!(rc.section_for("http://bugzilla.example.com/").is_empty());
        assert!(rc.section_for("http://example.com.evil/").is_empty());
    }

    #[test]
    fn substring_rule_matches_anywhere_in_url() {
        let (_dir, rc) = rc_with("[example.com/bz]\nk = v\n");
        assert_eq!(
            rc.matching_section("https://mirror.example.com/bz/xmlrpc.cgi"),
            Some("example.com/bz")
        );
    }

    #[test]
    fn no_match_is_empty_mapping_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc");
        std::fs::write(&path, "[a.com]\nk = v\n").unwrap();
        let obs = RecordingObserver::new();
        let mut rc = RcFile::new(PathResolver::new(dir.path())).with_observer(obs.clone());
        rc.set_config_paths(&[&path]).unwrap();

        assert!(rc.section_for("http://b.com").is_empty());
        assert!(obs.events().contains(&AuthEvent::SectionMatched {
            url: "http://b.com".into(),
            section: None,
        }));
    }

    #[test]
    fn section_items_include_defaults() {
        let (_dir, rc) = rc_with("[DEFAULT]\nurl = u\n\n[h]\napi_key = k\n");
        let items = rc.section_for("http://h");
        assert_eq!(items.get("url").map(String::as_str), Some("u"));
        assert_eq!(items.get("api_key").map(String::as_str), Some("k"));
    }

    #[test]
    fn later_paths_override_and_missing_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::write(&first, "[h]\napi_key = old\nuser = a\n").unwrap();
        std::fs::write(&second, "[h]\napi_key = new\n").unwrap();

        let mut rc = RcFile::new(PathResolver::new(dir.path()));
        rc.set_config_paths(&[first.clone(), dir.path().join("missing"), second.clone()])
            .unwrap();
        let items = rc.section_for("h");
        assert_eq!(items.get("api_key").map(String::as_str), Some("new"));
        assert_eq!(items.get("user").map(String::as_str), Some("a"));
        assert_eq!(rc.loaded_files(), &[first, second]);
        assert_eq!(rc.config_paths().len(), 3);
    }

    #[test]
    fn paths_are_expanded_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".bugzillarc"), "[h]\nk = v\n").unwrap();
        let mut rc = RcFile::new(PathResolver::new(dir.path()));
        rc.set_config_paths(&["~/.bugzillarc", "~/.bugzillarc"]).unwrap();
        assert_eq!(rc.config_paths(), &[dir.path().join(".bugzillarc")]);
        assert_eq!(rc.section_for("h").get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn malformed_file_keeps_previous_state() {
        let (dir, mut rc) = rc_with("[h]\nk = v\n");
        let bad = dir.path().join("bad");
        std::fs::write(&bad, "no header here\n").unwrap();
        let err = rc.set_config_paths(&[&bad]).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(rc.section_for("h").get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn default_config_paths_follow_resolver() {
        let resolver = PathResolver::new("/home/u");
        let paths = RcFile::default_config_paths(&resolver);
        assert_eq!(paths[0], PathBuf::from("/etc/bugzillarc"));
        assert_eq!(paths[1], PathBuf::from("/home/u/.bugzillarc"));
        assert_eq!(
            paths[2],
            PathBuf::from("/home/u/.config/python-bugzilla/bugzillarc")
        );
    }
}
