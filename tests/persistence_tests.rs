//! Integration tests for local persistence
//!
//! Exercises the file-backed store through the same paths the app uses on startup.

use dreamcanvas::app::{AppState, Command};
use dreamcanvas::features::admin::AdminCommand;
use dreamcanvas::features::history::{HISTORY_LIMIT, ImageHistory};
use dreamcanvas::i18n::Language;
use dreamcanvas::storage::{FileStore, KeyValueStore, Persistence, StorageKey, seed_users};
use dreamcanvas::types::{ChatMessage, DataUri};
use std::sync::Arc;

fn file_persistence(dir: &tempfile::TempDir) -> Persistence {
    Persistence::new(Arc::new(FileStore::new(dir.path())))
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_every_key_survives_a_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let persistence = file_persistence(&dir);

        let complex = vec![ChatMessage::user("why is the sky blue?"), ChatMessage::model("Rayleigh scattering.")];
        let fast = vec![ChatMessage::user("2+2"), ChatMessage::model("4")];
        let mut history = ImageHistory::new();
        history.push(DataUri::from_bytes("image/jpeg", b"one"));
        history.push(DataUri::from_bytes("image/jpeg", b"two"));

        persistence.save(StorageKey::ComplexChat, &complex);
        persistence.save(StorageKey::FastChat, &fast);
        persistence.save(StorageKey::ImageHistory, &history);
        persistence.save_language(Language::Pt);
        let users = persistence.load_admin_users();

        let reloaded = file_persistence(&dir);
        let complex_back: Vec<ChatMessage> = reloaded.load(StorageKey::ComplexChat);
        let fast_back: Vec<ChatMessage> = reloaded.load(StorageKey::FastChat);
        let history_back: ImageHistory = reloaded.load(StorageKey::ImageHistory);

        assert_eq!(complex_back.len(), 2);
        assert_eq!(complex_back[1].text, "Rayleigh scattering.");
        assert_eq!(fast_back[0].text, "2+2");
        assert_eq!(history_back, history);
        assert_eq!(reloaded.load_language(), Language::Pt);
        assert_eq!(reloaded.load_admin_users(), users);
        assert_eq!(reloaded.try_load::<bool>(StorageKey::AdminUsersSeeded), Some(true));
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        for key in StorageKey::ALL {
            store.set(key.as_str(), "{not json").expect("write corrupt value");
        }

        let persistence = file_persistence(&dir);
        let transcript: Vec<ChatMessage> = persistence.load(StorageKey::ComplexChat);
        let history: ImageHistory = persistence.load(StorageKey::ImageHistory);
        assert!(transcript.is_empty());
        assert!(history.is_empty());
        assert_eq!(persistence.load_language(), Language::En);
        // The seed marker exists, so a corrupt list is not reseeded.
        assert!(persistence.load_admin_users().is_empty());
    }

    #[test]
    fn test_oversized_history_is_capped_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let persistence = file_persistence(&dir);
        let raw: Vec<DataUri> = (0..HISTORY_LIMIT + 10)
            .map(|i| DataUri::from_bytes("image/jpeg", format!("img-{i}").as_bytes()))
            .collect();
        persistence.save(StorageKey::ImageHistory, &raw);

        let history: ImageHistory = persistence.load(StorageKey::ImageHistory);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0], raw[0]);
    }
}

mod seeding_tests {
    use super::*;

    #[test]
    fn test_seed_happens_only_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let persistence = file_persistence(&dir);
        assert_eq!(persistence.load_admin_users(), seed_users());

        let mut app = AppState::load(&persistence, false);
        let ids: Vec<u64> = app.admin.users.iter().map(|user| user.id).collect();
        for id in ids {
            app.update(Command::Admin(AdminCommand::RequestDelete(id)));
            app.update(Command::Admin(AdminCommand::ConfirmDelete));
        }
        assert!(app.admin.users.is_empty());
        persistence.save(StorageKey::AdminUsers, &app.admin.users);

        let reloaded = AppState::load(&file_persistence(&dir), false);
        assert!(reloaded.admin.users.is_empty());
    }

    #[test]
    fn test_clearing_the_marker_reseeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let persistence = file_persistence(&dir);
        persistence.save(StorageKey::AdminUsers, &Vec::<u8>::new());
        persistence.save(StorageKey::AdminUsersSeeded, &true);
        assert!(persistence.load_admin_users().is_empty());

        persistence.clear(StorageKey::AdminUsersSeeded);
        assert_eq!(persistence.load_admin_users().len(), 6);
    }
}
