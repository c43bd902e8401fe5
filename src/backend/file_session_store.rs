use crate::domain::session::Session;
use crate::domain::session::driven_ports::SessionStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
}

/// Keeps the session token in a small JSON file so it survives between runs
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> FileSessionStore {
        FileSessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, anyhow::Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading session file {}", self.path.display()));
            }
        };

        let stored: StoredSession = serde_json::from_str(&contents)
            .with_context(|| format!("parsing session file {}", self.path.display()))?;
        if stored.access_token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(Session::new(stored.access_token)))
    }

    fn save(&self, session: &Session) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating session directory {}", parent.display()))?;
        }

        let stored = StoredSession {
            access_token: session.bearer_token().to_owned(),
        };
        let contents = serde_json::to_string(&stored).context("serializing the session")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        restrict_to_owner(&self.path)?;
        debug!("Saved session to {}", self.path.display());

        Ok(())
    }

    fn clear(&self) -> Result<(), anyhow::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed session file {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("removing session file {}", self.path.display())),
        }
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<(), anyhow::Error> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting permissions of {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<(), anyhow::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn store_in(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = store_in(&dir);

        assert_that!(store.load()).is_ok().is_none();
    }

    #[test]
    fn saved_session_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = store_in(&dir);

        store
            .save(&Session::new("abc123"))
            .expect("saving should work");
        assert_that!(store.load())
            .is_ok()
            .is_some()
            .is_equal_to(Session::new("abc123"));
    }

    #[test]
    fn clear_removes_session_and_tolerates_repeats() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = store_in(&dir);
        store
            .save(&Session::new("abc123"))
            .expect("saving should work");

        assert_that!(store.clear()).is_ok();
        assert_that!(store.clear()).is_ok();
        assert_that!(store.load()).is_ok().is_none();
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").expect("writing fixture should work");

        assert_that!(FileSessionStore::new(path).load()).is_err();
    }

    #[test]
    fn blank_token_means_no_session() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"access_token": "  "}"#).expect("writing fixture should work");

        assert_that!(FileSessionStore::new(path).load())
            .is_ok()
            .is_none();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = store_in(&dir);
        store
            .save(&Session::new("abc123"))
            .expect("saving should work");

        let mode = fs::metadata(store.path())
            .expect("session file should exist")
            .permissions()
            .mode();
        assert_eq!(0o600, mode & 0o777);
    }
}
