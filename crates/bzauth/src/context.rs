//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds the global flags and the [`PathResolver`],
//! and builds each credential store wired to the console observer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use bzauth_config::{CredentialFileWriter, RcFile, TokenCache};
use bzauth_cookies::CookieJarStore;
use bzauth_core::{Observer, PathResolver};

use crate::cli::GlobalArgs;
use crate::output::ConsoleObserver;

/// Runtime context passed to every command handler.
pub struct RuntimeContext {
    pub resolver: PathResolver,

    /// `--config` files, in the order given. Empty means the default
    /// search list.
    pub config_paths: Vec<PathBuf>,

    pub tokenfile: Option<PathBuf>,
    pub cookiefile: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,

    observer: Arc<dyn Observer>,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// The home directory comes from `--home` / `BZAUTH_HOME`, falling back
    /// to `HOME` (or `USERPROFILE`).
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let observer: Arc<dyn Observer> = Arc::new(ConsoleObserver::new(global.json || global.quiet));
        let resolver = match &global.home {
            Some(home) => PathResolver::new(home),
            None => PathResolver::from_env()
                .context("cannot locate credential files; pass --home or set BZAUTH_HOME")?,
        }
        .with_observer(observer.clone());
        debug!(home = %resolver.home().display(), "resolved home directory");

        Ok(Self {
            resolver,
            config_paths: global.config.clone(),
            tokenfile: global.tokenfile.clone(),
            cookiefile: global.cookiefile.clone(),
            json: global.json,
            quiet: global.quiet,
            observer,
        })
    }

    /// The rc files to read: `--config` values or the default search list.
    pub fn rc_paths(&self) -> Vec<PathBuf> {
        if self.config_paths.is_empty() {
            RcFile::default_config_paths(&self.resolver)
        } else {
            self.config_paths.clone()
        }
    }

    /// The merged rc view over [`rc_paths`](Self::rc_paths).
    pub fn rc_file(&self) -> Result<RcFile> {
        let mut rc = RcFile::new(self.resolver.clone()).with_observer(self.observer.clone());
        rc.set_config_paths(&self.rc_paths())
            .context("failed to read bugzillarc")?;
        Ok(rc)
    }

    /// The token file in use: `--tokenfile` or the default location.
    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.tokenfile {
            Some(path) => Ok(self.resolver.expand_user(path)),
            None => self
                .resolver
                .default_token_path()
                .context("failed to resolve the default token file"),
        }
    }

    /// The cookie file in use: `--cookiefile` or the default location.
    pub fn cookie_path(&self) -> Result<PathBuf> {
        match &self.cookiefile {
            Some(path) => Ok(self.resolver.expand_user(path)),
            None => self
                .resolver
                .default_cookie_path()
                .context("failed to resolve the default cookie file"),
        }
    }

    pub fn token_cache(&self) -> Result<TokenCache> {
        let path = self.token_path()?;
        let mut cache = TokenCache::new().with_observer(self.observer.clone());
        cache
            .set_filename(Some(&path))
            .with_context(|| format!("failed to load token file {}", path.display()))?;
        Ok(cache)
    }

    pub fn cookie_store(&self) -> Result<CookieJarStore> {
        let path = self.cookie_path()?;
        let mut store = CookieJarStore::new().with_observer(self.observer.clone());
        store
            .set_filename(Some(&path))
            .with_context(|| format!("failed to open cookie file {}", path.display()))?;
        Ok(store)
    }

    pub fn credential_writer(&self) -> CredentialFileWriter {
        CredentialFileWriter::new(self.resolver.clone()).with_observer(self.observer.clone())
    }
}
