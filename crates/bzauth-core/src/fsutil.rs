//! File helpers for secrets: atomic rewrites and owner-only creation.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{AuthError, Result};

/// Mode for newly created credential files.
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Replace the contents of `path` with `contents` atomically.
///
/// The data goes to a temp file in the same directory, which is then renamed
/// over `path`. Until the rename the previous content stays intact. The temp
/// file starts owner-only; when `path` already exists its permissions are
/// copied over so a rewrite never widens or narrows access.
///
/// # Errors
///
/// Returns [`AuthError::Io`] if the temp file cannot be created, written or
/// renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| AuthError::io(path, e))?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(temp.path(), meta.permissions()).map_err(|e| AuthError::io(path, e))?;
    }

    temp.write_all(contents).map_err(|e| AuthError::io(path, e))?;
    temp.as_file().sync_all().map_err(|e| AuthError::io(path, e))?;
    temp.persist(path).map_err(|e| AuthError::io(path, e.error))?;
    Ok(())
}

/// Create `path` as an empty owner-only file if it does not exist yet.
///
/// An existing file is left untouched, content and mode alike.
pub fn create_private_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SECRET_FILE_MODE);
    }
    options.open(path).map_err(|e| AuthError::io(path, e))?;

    // The open mode is filtered by the umask; pin it explicitly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(SECRET_FILE_MODE))
            .map_err(|e| AuthError::io(path, e))?;
    }
    Ok(())
}
