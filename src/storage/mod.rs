//! Best-effort mirroring of app state to local storage.
//!
//! Reads never fail: a missing or unreadable value becomes the type's default.
//! Writes store the whole value and swallow failures after logging them.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::i18n::Language;
use crate::types::{AdminUser, UserPlan, UserStatus};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    ComplexChat,
    FastChat,
    ImageHistory,
    AdminUsers,
    AdminUsersSeeded,
    Language,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::ComplexChat,
        StorageKey::FastChat,
        StorageKey::ImageHistory,
        StorageKey::AdminUsers,
        StorageKey::AdminUsersSeeded,
        StorageKey::Language,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::ComplexChat => "dreamcanvas_gemini_pro_history",
            StorageKey::FastChat => "dreamcanvas_fast_chat_history",
            StorageKey::ImageHistory => "dreamcanvas_image_history",
            StorageKey::AdminUsers => "dreamcanvas_admin_users",
            StorageKey::AdminUsersSeeded => "dreamcanvas_admin_users_seeded",
            StorageKey::Language => "dreamcanvas_language",
        }
    }
}

/// Fixed dataset written the first time the admin list is ever loaded.
pub fn seed_users() -> Vec<AdminUser> {
    let user = |id, name: &str, email: &str, status, images_generated, plan| AdminUser {
        id,
        name: name.to_string(),
        email: email.to_string(),
        status,
        images_generated,
        plan,
    };
    vec![
        user(1, "Alice Johnson", "alice@example.com", UserStatus::Active, 85, UserPlan::Pro),
        user(2, "Bob Williams", "bob@example.com", UserStatus::Active, 23, UserPlan::Starter),
        user(3, "Charlie Brown", "charlie@example.com", UserStatus::Blocked, 150, UserPlan::Pro),
        user(4, "Diana Miller", "diana@example.com", UserStatus::Active, 450, UserPlan::Ultimate),
        user(5, "Ethan Davis", "ethan@example.com", UserStatus::Active, 98, UserPlan::Starter),
        user(7, "Grace Hall", "grace@example.com", UserStatus::Active, 5, UserPlan::Free),
    ]
}

#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        self.try_load(key).unwrap_or_default()
    }

    /// `None` when the key is absent or holds something that does not parse.
    pub fn try_load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.store.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "could not read stored value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "stored value is corrupt, using default");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        if let Err(err) = self.try_save(key, value) {
            tracing::error!(key = key.as_str(), %err, "could not save value");
        }
    }

    fn try_save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key.as_str(), &raw)
    }

    pub fn clear(&self, key: StorageKey) {
        if let Err(err) = self.store.remove(key.as_str()) {
            tracing::error!(key = key.as_str(), %err, "could not clear value");
        }
    }

    /// Seeds the admin list exactly once. The marker lives under its own key so
    /// an emptied list stays empty across reloads.
    pub fn load_admin_users(&self) -> Vec<AdminUser> {
        let seeded = matches!(self.store.get(StorageKey::AdminUsersSeeded.as_str()), Ok(Some(_)));
        if !seeded {
            let users = seed_users();
            tracing::info!(count = users.len(), "seeding admin users");
            self.save(StorageKey::AdminUsers, &users);
            self.save(StorageKey::AdminUsersSeeded, &true);
            return users;
        }
        self.load(StorageKey::AdminUsers)
    }

    pub fn load_language(&self) -> Language {
        self.try_load::<String>(StorageKey::Language)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default()
    }

    pub fn save_language(&self, language: Language) {
        self.save(StorageKey::Language, language.code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("quota exceeded").into())
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn corrupt_value_yields_default() {
        let persistence = Persistence::in_memory();
        persistence
            .store()
            .set(StorageKey::ImageHistory.as_str(), "{not json")
            .unwrap();
        let history: Vec<String> = persistence.load(StorageKey::ImageHistory);
        assert!(history.is_empty());
    }

    #[test]
    fn failing_store_never_panics() {
        let persistence = Persistence::new(Arc::new(BrokenStore));
        persistence.save(StorageKey::FastChat, &vec!["x"]);
        let loaded: Vec<String> = persistence.load(StorageKey::FastChat);
        assert!(loaded.is_empty());
        persistence.clear(StorageKey::FastChat);
    }

    #[test]
    fn language_defaults_on_unknown_code() {
        let persistence = Persistence::in_memory();
        assert_eq!(persistence.load_language(), Language::En);
        persistence.save(StorageKey::Language, "klingon");
        assert_eq!(persistence.load_language(), Language::En);
        persistence.save_language(Language::Pt);
        assert_eq!(persistence.load_language(), Language::Pt);
    }

    #[test]
    fn seed_ids_are_unique() {
        let mut ids: Vec<u64> = seed_users().iter().map(|u| u.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
