//! Credential storage and management
//!
//! A username to password-hash mapping kept in memory and mirrored to a
//! single JSON file keyed by username. One reader/writer lock guards the map:
//! authentication and listing share it, add and delete take it exclusively.
//!
//! Persistence is explicit. `add` and `delete` never touch the file; callers
//! invoke [`CredentialStore::save`]. `save` overwrites the file in place, so two
//! processes saving at the same time can interleave their writes.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::hashing::{hash_password, verify_password};
use crate::error::StoreError;
use crate::utils::validation::is_valid_username;

/// File name of the credential store inside the config directory
pub const USERS_FILE_NAME: &str = "users.json";

/// A user record as persisted. The password is only ever kept as a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

pub struct CredentialStore {
    path: PathBuf,
    users: RwLock<HashMap<String, User>>,
}

impl CredentialStore {
    /// Creates an empty store backed by `path` without reading it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store backed by `path` and loads it. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory mapping with the contents of the backing file.
    pub fn load(&self) -> Result<(), StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credential file at {}, starting empty", self.path.display());
                self.write().clear();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let users: HashMap<String, User> = if data.iter().all(u8::is_ascii_whitespace) {
            HashMap::new()
        } else {
            serde_json::from_slice(&data)?
        };

        info!("Loaded {} user(s) from {}", users.len(), self.path.display());
        *self.write() = users;
        Ok(())
    }

    /// Writes the complete mapping, pretty-printed, over the backing file.
    pub fn save(&self) -> Result<(), StoreError> {
        let data = {
            let users = self.read();
            let sorted: BTreeMap<&String, &User> = users.iter().collect();
            serde_json::to_vec_pretty(&sorted)?
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Adds a user. Fails with [`StoreError::UserExists`] if the name is taken,
    /// in which case the existing record is left untouched.
    pub fn add(&self, username: &str, password: &str) -> Result<(), StoreError> {
        if !is_valid_username(username) {
            return Err(StoreError::InvalidUsername(username.to_string()));
        }

        // Fail fast before paying for the hash; the insert below re-checks.
        if self.read().contains_key(username) {
            return Err(StoreError::UserExists(username.to_string()));
        }

        let password_hash = hash_password(password)?;

        let mut users = self.write();
        if users.contains_key(username) {
            return Err(StoreError::UserExists(username.to_string()));
        }
        users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_hash,
            },
        );
        Ok(())
    }

    /// Removes a user if present.
    pub fn delete(&self, username: &str) {
        self.write().remove(username);
    }

    /// Returns true only when the user exists and the password matches.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let stored = match self.read().get(username) {
            Some(user) => user.password_hash.clone(),
            None => return false,
        };

        verify_password(password, &stored)
    }

    /// All usernames, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.read().get(username).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every writer leaves the map consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, User>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, User>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join(USERS_FILE_NAME));
        (dir, store)
    }

    #[test]
    fn test_add_then_authenticate() {
        let (_dir, store) = temp_store();
        store.add("alice", "wonderland").unwrap();

        assert!(store.authenticate("alice", "wonderland"));
        assert!(!store.authenticate("alice", "wonderlandx"));
        assert!(!store.authenticate("bob", "wonderland"));
    }

    #[test]
    fn test_duplicate_add_keeps_original_hash() {
        let (_dir, store) = temp_store();
        store.add("alice", "first").unwrap();
        let before = store.get("alice").unwrap();

        let err = store.add("alice", "second").unwrap_err();
        assert!(matches!(err, StoreError::UserExists(ref u) if u == "alice"));
        assert_eq!(store.get("alice").unwrap(), before);
        assert!(store.authenticate("alice", "first"));
        assert!(!store.authenticate("alice", "second"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = temp_store();
        store.add("alice", "pw").unwrap();

        store.delete("nobody");
        assert_eq!(store.list(), vec!["alice".to_string()]);

        store.delete("alice");
        store.delete("alice");
        assert!(store.is_empty());
        assert!(!store.authenticate("alice", "pw"));
    }

    #[test]
    fn test_invalid_username_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.add("a:b", "pw"),
            Err(StoreError::InvalidUsername(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("conf").join(USERS_FILE_NAME);

        let store = CredentialStore::new(&path);
        store.add("alice", "a-pass").unwrap();
        store.add("bob", "b-pass").unwrap();
        store.save().unwrap();

        let reloaded = CredentialStore::open(&path).unwrap();
        let mut names = reloaded.list();
        names.sort();
        assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(reloaded.get("alice"), store.get("alice"));
        assert_eq!(reloaded.get("bob"), store.get("bob"));
        assert!(reloaded.authenticate("bob", "b-pass"));
    }

    #[test]
    fn test_file_is_object_keyed_by_username() {
        let (_dir, store) = temp_store();
        store.add("carol", "pw").unwrap();
        store.save().unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["carol"]["username"], "carol");
        assert!(value["carol"]["password_hash"].as_str().unwrap().starts_with("$argon2"));
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_load_replaces_unsaved_state() {
        let (_dir, store) = temp_store();
        store.add("alice", "pw").unwrap();
        store.save().unwrap();
        store.add("bob", "pw").unwrap();

        store.load().unwrap();
        assert_eq!(store.list(), vec!["alice".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(USERS_FILE_NAME);
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            CredentialStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_concurrent_readers() {
        let (_dir, store) = temp_store();
        store.add("alice", "pw").unwrap();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.authenticate("alice", "pw"))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_writers_do_not_disturb_readers() {
        let (_dir, store) = temp_store();
        store.add("alice", "pw").unwrap();
        let store = Arc::new(store);

        let writers: Vec<_> = (0..3)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let name = format!("temp{}", i);
                    for _ in 0..3 {
                        store.add(&name, "scratch").unwrap();
                        store.delete(&name);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || (0..3).all(|_| store.authenticate("alice", "pw")))
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        for reader in readers {
            assert!(reader.join().unwrap());
        }
        assert_eq!(store.list(), vec!["alice".to_string()]);
    }
}
