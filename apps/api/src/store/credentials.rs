use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tracing::{info, warn};

use super::fs::{read_json, write_json_atomic};
use super::password::{hash_password, verify_password};
use super::{DocumentStore, StoreError, StoreResult};
use crate::models::portfolio::Document;
use crate::models::user::{UserInfo, UserRecord};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Keeps `{username}_data.json` well inside common file-name limits.
pub const MAX_USERNAME_BYTES: usize = 64;

const USERS_FILE: &str = "users.json";

/// Username → credential record, persisted as `users.json`, plus the
/// per-user document store it owns.
///
/// `users.json` carries credentials only. Documents live exclusively in the
/// `DocumentStore`, so there is a single source of truth per user and nothing
/// is ever merged between the two files.
pub struct CredentialStore {
    index_path: PathBuf,
    users: RwLock<BTreeMap<String, UserRecord>>,
    documents: DocumentStore,
}

impl CredentialStore {
    /// Opens (or initialises) the stores rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let index_path = data_dir.join(USERS_FILE);
        let users: BTreeMap<String, UserRecord> = read_json(&index_path)?.unwrap_or_default();
        info!(
            "Credential store opened at {} ({} users)",
            data_dir.display(),
            users.len()
        );
        Ok(Self {
            index_path,
            users: RwLock::new(users),
            documents: DocumentStore::new(data_dir),
        })
    }

    pub fn user_exists(&self, username: &str) -> bool {
        self.read_users().contains_key(username)
    }

    /// Creates a user with a default document. Both the credential index and
    /// the document are on disk before this returns `Ok`; if the document
    /// cannot be written the credential is withdrawn again.
    pub fn register(&self, username: &str, password: &str, email: &str) -> StoreResult<()> {
        validate_username(username)?;

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(StoreError::AlreadyExists);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::WeakPassword);
        }

        let record = UserRecord {
            password_hash: hash_password(password)?,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        users.insert(username.to_string(), record);
        if let Err(e) = write_json_atomic(&self.index_path, &*users) {
            users.remove(username);
            return Err(e);
        }

        let doc = Document::build_default(username, email);
        if let Err(e) = self.documents.save(username, &doc) {
            warn!("Could not write the default document for {username}: {e}");
            users.remove(username);
            if let Err(rollback) = write_json_atomic(&self.index_path, &*users) {
                // The credential stays on disk; the next read rebuilds the default document.
                warn!("Could not withdraw the credential for {username}: {rollback}");
            }
            return Err(e);
        }
        drop(users);

        info!("Registered user {username}");
        Ok(())
    }

    /// Checks `password` against the stored hash. Distinguishes an unknown
    /// username from a wrong password; callers decide how much to reveal.
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<()> {
        let password_hash = self
            .read_users()
            .get(username)
            .map(|record| record.password_hash.clone())
            .ok_or(StoreError::NotFound)?;
        verify_password(password, &password_hash)
    }

    /// Returns the persisted document. A registered user whose document file is
    /// missing (interrupted registration) gets the default skeleton back.
    pub fn get_document(&self, username: &str) -> StoreResult<Document> {
        let email = self
            .read_users()
            .get(username)
            .map(|record| record.email.clone())
            .ok_or(StoreError::NotFound)?;

        match self.documents.load(username)? {
            Some(doc) => Ok(doc),
            None => {
                warn!("No document on disk for {username}; rebuilding the default");
                Ok(Document::build_default(username, &email))
            }
        }
    }

    /// Overwrites the user's document. Full replace, never a merge.
    pub fn replace_document(&self, username: &str, doc: &Document) -> StoreResult<()> {
        if !self.user_exists(username) {
            return Err(StoreError::NotFound);
        }
        self.documents.save(username, doc)
    }

    pub fn get_public_info(&self, username: &str) -> StoreResult<UserInfo> {
        self.read_users()
            .get(username)
            .map(|record| UserInfo::from_record(username, record))
            .ok_or(StoreError::NotFound)
    }

    fn read_users(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, UserRecord>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Usernames double as file-name stems and download file names, so they must
/// be non-empty, bounded in length and free of path syntax, quotes and
/// control characters.
fn validate_username(username: &str) -> StoreResult<()> {
    if username.trim().is_empty() {
        return Err(StoreError::InvalidUsername(
            "username must not be empty".to_string(),
        ));
    }
    if username.len() > MAX_USERNAME_BYTES {
        return Err(StoreError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_BYTES} bytes"
        )));
    }
    if username.trim() != username {
        return Err(StoreError::InvalidUsername(
            "username must not start or end with whitespace".to_string(),
        ));
    }
    if username.starts_with('.')
        || username
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '"') || c.is_control())
    {
        return Err(StoreError::InvalidUsername(format!(
            "'{username}' contains characters that are not allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::{ExperienceItem, Module};
    use uuid::Uuid;

    fn open() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_register_then_authenticate() {
        let (_dir, store) = open();
        store.register("alice", "secret1", "alice@example.com").unwrap();
        assert!(store.authenticate("alice", "secret1").is_ok());
        assert!(matches!(
            store.authenticate("alice", "secret1x"),
            Err(StoreError::WrongPassword)
        ));
    }

    #[test]
    fn test_authenticate_unknown_user() {
        let (_dir, store) = open();
        assert!(matches!(
            store.authenticate("ghost", "whatever"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_weak_password_rejected() {
        let (_dir, store) = open();
        assert!(matches!(
            store.register("bob", "12345", "bob@x.io"),
            Err(StoreError::WeakPassword)
        ));
        assert!(!store.user_exists("bob"));
        assert!(store.register("bob", "123456", "bob@x.io").is_ok());
    }

    #[test]
    fn test_invalid_usernames_rejected() {
        let (_dir, store) = open();
        for name in ["", "   ", "../etc", "a/b", "a\\b", ".hidden", " padded", "quo\"te"] {
            assert!(
                matches!(
                    store.register(name, "secret1", "x@x.io"),
                    Err(StoreError::InvalidUsername(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_username_length_is_capped() {
        let (dir, store) = open();
        let long = "a".repeat(300);
        assert!(matches!(
            store.register(&long, "secret1", "a@x.io"),
            Err(StoreError::InvalidUsername(_))
        ));
        assert!(!store.user_exists(&long));

        let longest = "b".repeat(MAX_USERNAME_BYTES);
        store.register(&longest, "secret1", "b@x.io").unwrap();
        assert!(dir.path().join(format!("{longest}_data.json")).is_file());
        assert!(store.get_document(&longest).is_ok());
    }

    #[test]
    fn test_failed_document_write_withdraws_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path()).unwrap();
        // A directory in the way makes the document rename fail.
        let blocker = dir.path().join("ivy_data.json");
        std::fs::create_dir(&blocker).unwrap();

        assert!(matches!(
            store.register("ivy", "secret1", "ivy@x.io"),
            Err(StoreError::Io(_))
        ));
        assert!(!store.user_exists("ivy"));
        let raw = std::fs::read_to_string(dir.path().join(USERS_FILE)).unwrap();
        assert!(!raw.contains("ivy"));

        std::fs::remove_dir(&blocker).unwrap();
        store.register("ivy", "secret1", "ivy@x.io").unwrap();
        assert!(store.authenticate("ivy", "secret1").is_ok());
        assert!(store.get_document("ivy").is_ok());
    }

    #[test]
    fn test_duplicate_register_keeps_existing_document() {
        let (_dir, store) = open();
        store.register("alice", "secret1", "alice@example.com").unwrap();

        let mut doc = store.get_document("alice").unwrap();
        doc.modules.enable(Module::Experience);
        doc.personal_info.summary = "Edited".to_string();
        store.replace_document("alice", &doc).unwrap();

        assert!(matches!(
            store.register("alice", "another1", "other@example.com"),
            Err(StoreError::AlreadyExists)
        ));
        assert_eq!(store.get_document("alice").unwrap(), doc);
        assert!(store.authenticate("alice", "secret1").is_ok());
    }

    #[test]
    fn test_register_writes_default_document() {
        let (dir, store) = open();
        store.register("erin", "secret1", "erin@x.io").unwrap();
        assert!(dir.path().join("erin_data.json").is_file());
        assert_eq!(
            store.get_document("erin").unwrap(),
            Document::build_default("erin", "erin@x.io")
        );
    }

    #[test]
    fn test_credentials_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = CredentialStore::open(dir.path()).unwrap();
            store.register("frank", "secret1", "frank@x.io").unwrap();
        }
        let store = CredentialStore::open(dir.path()).unwrap();
        assert!(store.authenticate("frank", "secret1").is_ok());
        let info = store.get_public_info("frank").unwrap();
        assert_eq!(info.username, "frank");
        assert_eq!(info.email, "frank@x.io");
    }

    #[test]
    fn test_index_holds_no_plaintext_and_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path()).unwrap();
        store.register("gina", "secret1", "gina@x.io").unwrap();
        let raw = std::fs::read_to_string(dir.path().join(USERS_FILE)).unwrap();
        assert!(!raw.contains("secret1"));
        assert!(raw.contains("passwordHash"));
        assert!(!raw.contains("personalInfo"));
    }

    #[test]
    fn test_missing_document_rebuilds_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path()).unwrap();
        store.register("hank", "secret1", "hank@x.io").unwrap();
        std::fs::remove_file(dir.path().join("hank_data.json")).unwrap();
        assert_eq!(
            store.get_document("hank").unwrap(),
            Document::build_default("hank", "hank@x.io")
        );
    }

    #[test]
    fn test_document_calls_for_unknown_user() {
        let (_dir, store) = open();
        let doc = Document::build_default("ghost", "g@x.io");
        assert!(matches!(
            store.get_document("ghost"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.replace_document("ghost", &doc),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.get_public_info("ghost"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_alice_scenario() {
        let (_dir, store) = open();
        store.register("alice", "secret1", "alice@example.com").unwrap();
        assert!(store.authenticate("alice", "secret1").is_ok());
        assert!(matches!(
            store.authenticate("alice", "wrong"),
            Err(StoreError::WrongPassword)
        ));

        let mut doc = store.get_document("alice").unwrap();
        let item = ExperienceItem {
            id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            period: "2020-2022".to_string(),
            description: vec!["Built things".to_string()],
        };
        doc.experience.items.push(item.clone());
        store.replace_document("alice", &doc).unwrap();

        let loaded = store.get_document("alice").unwrap();
        assert_eq!(loaded.experience.items[0], item);
        assert_eq!(loaded, doc);
    }
}
