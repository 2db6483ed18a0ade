//! Keeps the server session cookie across process restarts.

use reqwest::cookie::{CookieStore, Jar};
use std::{fs, io, path::Path, sync::Arc};
use tracing::{debug, warn};
use url::Url;

use crate::storage::StorageError;

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load cookies saved by [`persist_cookie_jar`]. A missing file yields an
/// empty jar.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_cookie_jar(origin: &Url, path: &Path) -> Result<Arc<Jar>, StorageError> {
    let jar = Arc::new(Jar::default());
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(jar),
        Err(err) => return Err(io_error(path, err)),
    };

    let mut restored = 0usize;
    for entry in contents.split(';') {
        let cookie = entry.trim();
        if !cookie.is_empty() {
            jar.add_cookie_str(cookie, origin);
            restored += 1;
        }
    }
    debug!(path = %path.display(), restored, "restored session cookies");
    Ok(jar)
}

/// Write the cookies the jar would send to `origin`. An empty jar removes
/// the file.
///
/// # Errors
/// Returns an error if the file cannot be written or removed.
pub fn persist_cookie_jar(jar: &Jar, origin: &Url, path: &Path) -> Result<(), StorageError> {
    let Some(header) = jar.cookies(origin) else {
        return clear_cookie_jar(path);
    };
    let Ok(value) = header.to_str() else {
        warn!("session cookie is not valid UTF-8; not persisting it");
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }
    fs::write(path, value.as_bytes()).map_err(|err| io_error(path, err))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|err| io_error(path, err))?;
    }
    debug!(path = %path.display(), "session cookies saved");
    Ok(())
}

/// Forget persisted cookies.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_cookie_jar(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_error(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn origin() -> Url {
        Url::parse("http://localhost:5000/").unwrap()
    }

    #[test]
    fn missing_file_gives_empty_jar() {
        let dir = TempDir::new().unwrap();
        let jar = load_cookie_jar(&origin(), &dir.path().join("session.cookies")).unwrap();
        assert!(jar.cookies(&origin()).is_none());
    }

    #[test]
    fn cookies_survive_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hp").join("session.cookies");

        let jar = Jar::default();
        jar.add_cookie_str("token=abc123; Path=/; HttpOnly", &origin());
        persist_cookie_jar(&jar, &origin(), &path).unwrap();

        let restored = load_cookie_jar(&origin(), &path).unwrap();
        let header = restored.cookies(&origin()).unwrap();
        assert_eq!(header.to_str().unwrap(), "token=abc123");
    }

    #[test]
    fn empty_jar_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.cookies");
        fs::write(&path, "token=stale").unwrap();

        persist_cookie_jar(&Jar::default(), &origin(), &path).unwrap();
        assert!(!path.exists());
        clear_cookie_jar(&path).unwrap();
    }
}
