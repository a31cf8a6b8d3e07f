//! Injected event sink for credential-file activity.
//!
//! Every store takes an `Arc<dyn Observer>` at construction instead of
//! logging through process-global state. [`TracingObserver`] is the default
//! and forwards to `tracing`; [`RecordingObserver`] captures events so tests
//! can assert on them.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

/// Something a credential store did that a caller may want to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// rc files that existed and were read, in read order.
    ConfigFilesFound { paths: Vec<PathBuf> },
    /// `[DEFAULT] url` was present.
    DefaultUrlFound { url: String },
    /// Result of a section lookup; `section` is `None` on a miss.
    SectionMatched { url: String, section: Option<String> },
    /// A store was bound to a backing file (or to none).
    FileBound { store: &'static str, path: Option<PathBuf> },
    /// A directory was created for a default file location.
    DirectoryCreated { path: PathBuf },
    /// A store rewrote its backing file.
    FileSaved { path: PathBuf },
    /// An API key was persisted. Callers usually show this to the user.
    ApiKeyWritten { path: PathBuf },
}

/// Receives [`AuthEvent`]s from the stores.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &AuthEvent);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// A shared handle, the usual default for store constructors.
    pub fn shared() -> Arc<dyn Observer> {
        Arc::new(Self)
    }
}

impl Observer for TracingObserver {
    fn on_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::ConfigFilesFound { paths } => {
                info!(target: "bzauth", ?paths, "found bugzillarc files");
            }
            AuthEvent::DefaultUrlFound { url } => {
                debug!(target: "bzauth", url = %url, "bugzillarc: found default url");
            }
            AuthEvent::SectionMatched { url, section: Some(section) } => {
                debug!(target: "bzauth", url = %url, section = %section, "bugzillarc: found matching section");
            }
            AuthEvent::SectionMatched { url, section: None } => {
                debug!(target: "bzauth", url = %url, "bugzillarc: no section found");
            }
            AuthEvent::FileBound { store, path } => {
                debug!(target: "bzauth", store = *store, ?path, "using credential file");
            }
            AuthEvent::DirectoryCreated { path } => {
                debug!(target: "bzauth", ?path, "created directory");
            }
            AuthEvent::FileSaved { path } => {
                debug!(target: "bzauth", ?path, "saved credential file");
            }
            AuthEvent::ApiKeyWritten { path } => {
                info!(target: "bzauth", ?path, "API key written");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A snapshot of the events received so far.
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// How many [`AuthEvent::FileSaved`] events were received.
    pub fn save_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AuthEvent::FileSaved { .. }))
            .count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &AuthEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
