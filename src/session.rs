//! Who is logged in.
//!
//! A [`Session`] is loaded once from a [`SessionStorage`] at start-up
//! and passed to whatever needs the current user. Logging in and out
//! write through to the storage so the next start-up sees the change.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::TrackerError;
use crate::user::User;

/// The key the logged-in user is stored under.
pub const USER_KEY: &str = "user";

/// A string key/value store that survives restarts.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError>;

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError>;

    fn remove(&self, key: &str) -> Result<(), TrackerError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Keeps every entry in one JSON object on disk. A missing file is an
/// empty store.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, TrackerError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| TrackerError::MalformedSession { source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(TrackerError::Storage { source }),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), TrackerError> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|source| TrackerError::MalformedSession { source })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| TrackerError::Storage { source })?;
            }
        }

        fs::write(&self.path, bytes).map_err(|source| TrackerError::Storage { source })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        let mut entries = self.read()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        let mut entries = self.read()?;

        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }

        Ok(())
    }
}

pub struct Session<S: SessionStorage> {
    storage: S,
    user: Option<User>,
}

impl<S: SessionStorage> Session<S> {
    /// Reads the stored user, if any. An entry that no longer parses
    /// counts as logged out.
    pub fn load(storage: S) -> Result<Self, TrackerError> {
        let user = storage
            .get(USER_KEY)?
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());

        Ok(Session { storage, user })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login(&mut self, user: User) -> Result<(), TrackerError> {
        let raw =
            serde_json::to_string(&user).map_err(|source| TrackerError::MalformedSession { source })?;

        self.storage.set(USER_KEY, &raw)?;
        self.user = Some(user);

        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), TrackerError> {
        self.storage.remove(USER_KEY)?;
        self.user = None;

        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ana() -> User {
        User::new(Uuid::nil(), "ana@example.com".to_owned(), Some("Ana".to_owned()))
    }

    #[test]
    fn fresh_storage_means_logged_out() {
        let session = Session::load(MemoryStorage::new()).expect("load session");

        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn login_and_logout_write_through() {
        let mut session = Session::load(MemoryStorage::new()).expect("load session");

        session.login(ana()).expect("log in");
        assert_eq!(session.current_user(), Some(&ana()));
        assert!(session.storage().get(USER_KEY).expect("read").is_some());

        session.logout().expect("log out");
        assert_eq!(session.current_user(), None);
        assert_eq!(session.storage().get(USER_KEY).expect("read"), None);
    }

    #[test]
    fn file_storage_survives_restarts() {
        let dir = tempfile::tempdir().expect("create temporary directory");
        let path = dir.path().join("nested").join("session.json");

        {
            let mut session = Session::load(FileStorage::new(&path)).expect("load session");
            session.login(ana()).expect("log in");
        }

        let session = Session::load(FileStorage::new(&path)).expect("reload session");
        assert_eq!(session.current_user(), Some(&ana()));
    }

    #[test]
    fn file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("create temporary directory");
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.set("theme", "dark").expect("write theme");
        let mut session = Session::load(storage).expect("load session");
        session.login(ana()).expect("log in");
        session.logout().expect("log out");

        assert_eq!(
            session.storage().get("theme").expect("read theme"),
            Some("dark".to_owned())
        );
    }

    #[test]
    fn unreadable_files_are_errors() {
        let dir = tempfile::tempdir().expect("create temporary directory");
        let path = dir.path().join("session.json");
        fs::write(&path, b"not json").expect("write garbage");

        let result = Session::load(FileStorage::new(&path));

        assert!(matches!(result, Err(TrackerError::MalformedSession { .. })));
    }

    #[test]
    fn stale_user_entries_count_as_logged_out() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "{\"email\": 3}").expect("write entry");

        let session = Session::load(storage).expect("load session");

        assert_eq!(session.current_user(), None);
    }
}
