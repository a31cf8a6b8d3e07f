//! Reader and writer for the sectioned key-value format.
//!
//! This is the INI dialect used by `bugzillarc` and `bugzillatoken`:
//!
//! ```text
//! [DEFAULT]
//! url = https://bugzilla.example.com
//!
//! [bugzilla.example.com]
//! api_key = abc123
//! ```
//!
//! Keys are case-insensitive (stored lowercased), section names are not.
//! `[DEFAULT]` values are visible from every section. Unknown sections and
//! keys survive a load/save round trip; comments do not.
//!
//! Values are trimmed line by line when read, so [`SectionedFile::save`]
//! refuses names and values that would not read back unchanged:
//! see [`check_section_name`] and [`check_value`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{AuthError, Result};
use crate::fsutil;

/// Name of the distinguished section whose values act as fallbacks.
pub const DEFAULT_SECTION: &str = "DEFAULT";

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// An ordered group of key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = normalize_key(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace `key`, keeping the original position on replace.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let key = normalize_key(key);
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != before
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Reject section names that cannot be written as a `[name]` header.
///
/// # Errors
///
/// Returns [`AuthError::Unstorable`] for an empty name or one containing a
/// line break. A `]` inside the name reads back fine.
pub fn check_section_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AuthError::Unstorable("an empty section name".to_string()));
    }
    if name.contains(['\n', '\r']) {
        return Err(AuthError::Unstorable(format!("section name {name:?}")));
    }
    Ok(())
}

/// Reject values that would change on a save/load round trip.
///
/// The first line must carry no surrounding whitespace. Every further line
/// becomes a continuation line, so it must also be non-empty and must not
/// start with a comment marker.
///
/// # Errors
///
/// Returns [`AuthError::Unstorable`] naming `key` (never the value).
pub fn check_value(key: &str, value: &str) -> Result<()> {
    let mut lines = value.split('\n');
    let first_ok = lines.next().is_some_and(|first| first == first.trim());
    let rest_ok = lines.all(|line| {
        let trimmed = line.trim();
        line == trimmed && !trimmed.is_empty() && !trimmed.starts_with(['#', ';'])
    });
    if first_ok && rest_ok && !value.contains('\r') {
        Ok(())
    } else {
        Err(AuthError::Unstorable(format!(
            "value of '{key}': surrounding whitespace, blank or comment lines do not survive a reload"
        )))
    }
}

// ---------------------------------------------------------------------------
// SectionedFile
// ---------------------------------------------------------------------------

/// In-memory form of one or more merged sectioned files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionedFile {
    defaults: Section,
    sections: Vec<(String, Section)>,
}

impl SectionedFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single file. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the file exists but cannot be read and
    /// [`AuthError::ConfigFormat`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = Self::new();
        file.read_path(path)?;
        Ok(file)
    }

    /// Parse `text` on its own, with `origin` used in error messages.
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        let mut file = Self::new();
        file.merge_str(origin, text)?;
        Ok(file)
    }

    /// Merge `path` into this store. Returns `false` if the file does not exist.
    pub fn read_path(&mut self, path: &Path) -> Result<bool> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(AuthError::io(path, e)),
        };
        self.merge_str(path, &text)?;
        Ok(true)
    }

    /// Merge each of `paths` in order, skipping missing files.
    ///
    /// Later files override earlier ones key by key. Returns the files that
    /// were actually read.
    pub fn read_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if self.read_path(path)? {
                found.push(path.to_path_buf());
            }
        }
        Ok(found)
    }

    /// Merge sectioned `text` into this store.
    pub fn merge_str(&mut self, origin: &Path, text: &str) -> Result<()> {
        // (section name, key) of the entry that continuation lines extend.
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = line.starts_with(char::is_whitespace);
            if indented {
                if let (Some(section), Some(key)) = (&current, &last_key) {
                    let target = self.ensure_section(section);
                    let joined = format!("{}\n{}", target.get(key).unwrap_or_default(), trimmed);
                    target.set(key, joined);
                    continue;
                }
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AuthError::format(origin, lineno, "malformed section header"))?;
                self.ensure_section(name);
                current = Some(name.to_string());
                last_key = None;
                continue;
            }

            let section = current.as_deref().ok_or_else(|| {
                AuthError::format(origin, lineno, "entry appears before any section header")
            })?;

            let split_at = trimmed
                .find(['=', ':'])
                .ok_or_else(|| AuthError::format(origin, lineno, "expected 'key = value'"))?;
            let key = normalize_key(&trimmed[..split_at]);
            if key.is_empty() {
                return Err(AuthError::format(origin, lineno, "empty key"));
            }
            let value = trimmed[split_at + 1..].trim();

            self.ensure_section(section).set(&key, value);
            last_key = Some(key);
        }
        Ok(())
    }

    // -- Queries -------------------------------------------------------------

    /// The `[DEFAULT]` section.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Named sections in first-seen order, excluding `[DEFAULT]`.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// A named section's own entries, without defaults.
    pub fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, section)| section)
    }

    /// Look `key` up in `section`, falling back to `[DEFAULT]`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)
            .and_then(|s| s.get(key))
            .or_else(|| self.defaults.get(key))
    }

    /// All entries visible from `section`: defaults overlaid by its own keys.
    ///
    /// Returns `None` if the section does not exist.
    pub fn items(&self, section: &str) -> Option<BTreeMap<String, String>> {
        let own = self.section(section)?;
        let mut merged: BTreeMap<String, String> = self
            .defaults
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (k, v) in own.iter() {
            merged.insert(k.to_string(), v.to_string());
        }
        Some(merged)
    }

    // -- Mutation ------------------------------------------------------------

    /// Get `name`, creating it empty if needed.
    pub fn ensure_section(&mut self, name: &str) -> &mut Section {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        let idx = match self.sections.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.sections.push((name.to_string(), Section::default()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx].1
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ensure_section(section).set(key, value);
    }

    /// Remove `key` from `section`. Returns whether anything was removed.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        if section == DEFAULT_SECTION {
            return self.defaults.remove(key);
        }
        self.sections
            .iter_mut()
            .find(|(n, _)| n == section)
            .is_some_and(|(_, s)| s.remove(key))
    }

    // -- Output --------------------------------------------------------------

    /// Serialize the whole store.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.defaults.is_empty() {
            render_section(&mut out, DEFAULT_SECTION, &self.defaults);
        }
        for (name, section) in &self.sections {
            render_section(&mut out, name, section);
        }
        out
    }

    /// Atomically rewrite `path` with the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unstorable`] without touching `path` if a named
    /// section or value would not read back as stored, or the filesystem
    /// error if the rewrite fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.check_storable()?;
        fsutil::write_atomic(path, self.render().as_bytes())
    }

    fn check_storable(&self) -> Result<()> {
        let named = self.sections.iter().map(|(n, s)| (Some(n.as_str()), s));
        for (name, section) in std::iter::once((None, &self.defaults)).chain(named) {
            if let Some(name) = name {
                check_section_name(name)?;
            }
            for (key, value) in section.iter() {
                check_value(key, value)?;
            }
        }
        Ok(())
    }
}

fn render_section(out: &mut String, name: &str, section: &Section) {
    out.push('[');
    out.push_str(name);
    out.push_str("]\n");
    for (key, value) in section.iter() {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&value.replace('\n', "\n\t"));
        out.push('\n');
    }
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
