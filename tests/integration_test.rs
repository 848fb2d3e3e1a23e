//! Integration tests for the session store
//!
//! These run against a real temporary directory through the public API.

use convo_store::{
    MemoryFileSystem, SaveOptions, SessionError, SessionStore, SessionStoreConfig, StoredMessage,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn open_store(dir: &Path, max_sessions: usize) -> SessionStore {
    SessionStore::open(SessionStoreConfig::new(dir).max_sessions(max_sessions))
        .await
        .unwrap()
}

fn conversation() -> Vec<StoredMessage> {
    vec![StoredMessage::user("hi"), StoredMessage::assistant("hello")]
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_round_trip_preserves_messages() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;
    let messages = vec![
        StoredMessage::system("You are terse."),
        StoredMessage::user("List files"),
        StoredMessage::assistant("Calling a tool")
            .with_field("tool_calls", json!([{"id": "call_1", "name": "ls"}])),
        StoredMessage::new("tool", "a.txt b.txt").with_field("tool_call_id", json!("call_1")),
    ];

    let metadata = store
        .save_session(
            &messages,
            SaveOptions::new().provider("openai").model("gpt-4o"),
        )
        .await
        .unwrap();
    let loaded = store.load_session(&metadata.id).await.unwrap().unwrap();

    assert_eq!(loaded.messages, messages);
    assert_eq!(loaded.metadata.message_count, messages.len());
    assert_eq!(loaded.metadata.first_message, "List files");
    assert_eq!(loaded.metadata.provider, "openai");
    assert_eq!(loaded.metadata.model, "gpt-4o");
}

#[tokio::test]
async fn test_created_at_is_immutable() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    let first = store
        .save_session(&conversation(), SaveOptions::new().name("stable"))
        .await
        .unwrap();
    pause().await;
    let mut longer = conversation();
    longer.push(StoredMessage::user("and another thing"));
    store
        .save_session(&longer, SaveOptions::new().name("stable"))
        .await
        .unwrap();

    let loaded = store.load_session("stable").await.unwrap().unwrap();
    assert_eq!(loaded.metadata.created_at, first.created_at);
    assert!(loaded.metadata.last_activity_at > first.last_activity_at);
    assert_eq!(loaded.metadata.message_count, 3);
}

#[tokio::test]
async fn test_interrupted_write_leaves_original_intact() {
    let fs = MemoryFileSystem::new();
    let store = SessionStore::open(
        SessionStoreConfig::new("/sessions").file_system(Arc::new(fs.clone())),
    )
    .await
    .unwrap();

    // first save interrupted: nothing at all on disk
    fs.fail_next_rename();
    assert!(store
        .save_session(&conversation(), SaveOptions::new().name("atomic"))
        .await
        .is_err());
    assert!(store.load_session("atomic").await.unwrap().is_none());
    assert!(fs.paths().await.is_empty());

    // second save interrupted: previous content survives untouched
    store
        .save_session(&conversation(), SaveOptions::new().name("atomic"))
        .await
        .unwrap();
    fs.fail_next_rename();
    assert!(store
        .save_session(&[StoredMessage::user("replacement")], SaveOptions::new().name("atomic"))
        .await
        .is_err());

    let loaded = store.load_session("atomic").await.unwrap().unwrap();
    assert_eq!(loaded.messages, conversation());
}

#[tokio::test]
async fn test_index_rebuild_skips_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = open_store(temp_dir.path(), 50).await;
        for name in ["one", "two", "three"] {
            store
                .save_session(&conversation(), SaveOptions::new().name(name))
                .await
                .unwrap();
        }
    }
    std::fs::remove_file(temp_dir.path().join("index.json")).unwrap();
    std::fs::write(temp_dir.path().join("corrupt.json"), "{\"metadata\": {\"id\":").unwrap();

    let store = open_store(temp_dir.path(), 50).await;
    let sessions = store.list_sessions().await;

    assert_eq!(sessions.len(), 3);
    assert!(sessions.iter().all(|m| m.id != "corrupt"));
    assert!(temp_dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_malformed_index_is_rebuilt() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;
    store
        .save_session(&conversation(), SaveOptions::new().name("survivor"))
        .await
        .unwrap();

    std::fs::write(temp_dir.path().join("index.json"), "garbage").unwrap();

    let sessions = store.list_sessions().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, "survivor");
}

#[tokio::test]
async fn test_retention_keeps_most_recent() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 3).await;

    for i in 1..=5 {
        store
            .save_session(&conversation(), SaveOptions::new().name(format!("session-{}", i)))
            .await
            .unwrap();
        pause().await;
    }

    let ids: Vec<String> = store.list_sessions().await.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["session-5", "session-4", "session-3"]);
    assert!(!temp_dir.path().join("session-1.json").exists());
    assert!(!temp_dir.path().join("session-2.json").exists());
}

#[tokio::test]
async fn test_invalid_ids_touch_nothing() {
    let fs = MemoryFileSystem::new();
    let store = SessionStore::open(
        SessionStoreConfig::new("/sessions").file_system(Arc::new(fs.clone())),
    )
    .await
    .unwrap();
    let before = fs.operation_count();

    for id in ["../../etc/passwd", "a/b", "a\u{0000}b"] {
        assert!(matches!(
            store.load_session(id).await,
            Err(SessionError::InvalidId(_))
        ));
        assert!(matches!(
            store.delete_session(id).await,
            Err(SessionError::InvalidId(_))
        ));
        assert!(matches!(
            store.session_exists(id).await,
            Err(SessionError::InvalidId(_))
        ));
        assert!(matches!(
            store.restore_session(id).await,
            Err(SessionError::InvalidId(_))
        ));
    }

    assert_eq!(fs.operation_count(), before);
}

#[tokio::test]
async fn test_reserved_and_sanitized_names() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    let err = store
        .save_session(&conversation(), SaveOptions::new().name("index"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::ReservedName(_)));
    assert_eq!(err.to_string(), "Session name \"index\" is reserved");

    let metadata = store
        .save_session(&conversation(), SaveOptions::new().name("My Session!"))
        .await
        .unwrap();
    assert_eq!(metadata.id, "my-session");
    assert_eq!(metadata.name, "My Session!");
    assert!(temp_dir.path().join("my-session.json").exists());
}

#[tokio::test]
async fn test_reserved_session_id_cannot_clobber_index() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;
    store
        .save_session(&conversation(), SaveOptions::new().name("real"))
        .await
        .unwrap();
    let index_before = std::fs::read_to_string(temp_dir.path().join("index.json")).unwrap();

    for id in ["index", "INDEX"] {
        let err = store
            .save_session(&conversation(), SaveOptions::new().session_id(id))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ReservedName(_)));
    }
    assert!(!store.delete_session("index").await.unwrap());

    let index_after = std::fs::read_to_string(temp_dir.path().join("index.json")).unwrap();
    assert_eq!(index_after, index_before);
    assert!(!temp_dir.path().join("INDEX.json").exists());
    let ids: Vec<String> = store.list_sessions().await.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["real"]);
}

#[tokio::test]
async fn test_pointer_repoints_after_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    store
        .save_session(&conversation(), SaveOptions::new().name("older"))
        .await
        .unwrap();
    pause().await;
    store
        .save_session(&conversation(), SaveOptions::new().name("newer"))
        .await
        .unwrap();
    assert_eq!(store.get_last_session().await.as_deref(), Some("newer"));

    assert!(store.delete_session("newer").await.unwrap());
    assert_eq!(store.get_last_session().await.as_deref(), Some("older"));

    assert!(store.delete_session("older").await.unwrap());
    assert_eq!(store.get_last_session().await, None);
    assert!(!temp_dir.path().join("last_session").exists());
}

#[tokio::test]
async fn test_deleting_other_session_keeps_pointer() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    store
        .save_session(&conversation(), SaveOptions::new().name("first"))
        .await
        .unwrap();
    pause().await;
    store
        .save_session(&conversation(), SaveOptions::new().name("second"))
        .await
        .unwrap();

    assert!(store.delete_session("first").await.unwrap());
    assert_eq!(store.get_last_session().await.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_end_to_end_demo() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    let metadata = store
        .save_session(&conversation(), SaveOptions::new().name("demo"))
        .await
        .unwrap();
    assert_eq!(metadata.id, "demo");
    assert_eq!(metadata.message_count, 2);
    assert_eq!(metadata.first_message, "hi");

    assert_eq!(store.get_last_session().await.as_deref(), Some("demo"));
    let last = store.load_last_session().await.unwrap();
    assert_eq!(last.metadata.id, "demo");

    assert!(store.delete_session("demo").await.unwrap());
    assert_eq!(store.get_last_session().await, None);
    assert!(!store.delete_session("demo").await.unwrap());
}

#[tokio::test]
async fn test_resume_under_generated_id() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;

    let first = store
        .save_session(&conversation(), SaveOptions::new())
        .await
        .unwrap();
    let last = store.get_last_session().await.unwrap();
    assert_eq!(last, first.id);

    let mut restored = store.restore_session(&last).await.unwrap().unwrap();
    assert!(restored.context_summary.unwrap().contains("2 total"));
    restored.messages.push(StoredMessage::user("continuing"));

    let second = store
        .save_session(&restored.messages, SaveOptions::new().session_id(&last))
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(store.list_sessions().await.len(), 1);
}

#[tokio::test]
async fn test_session_files_use_documented_json_shape() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 50).await;
    store
        .save_session(
            &conversation(),
            SaveOptions::new().name("shape").description("layout check"),
        )
        .await
        .unwrap();

    let session: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("shape.json")).unwrap())
            .unwrap();
    let metadata = &session["metadata"];
    for key in [
        "id",
        "name",
        "description",
        "createdAt",
        "lastActivityAt",
        "messageCount",
        "firstMessage",
        "provider",
        "model",
    ] {
        assert!(metadata.get(key).is_some(), "missing {}", key);
    }
    assert!(session["contextSummary"].as_str().unwrap().contains("layout check"));

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("index.json")).unwrap())
            .unwrap();
    assert_eq!(index["version"], "1.0");
    assert!(index["sessions"]["shape"].is_object());
    assert!(index["updatedAt"].is_string());

    let pointer = std::fs::read_to_string(temp_dir.path().join("last_session")).unwrap();
    assert_eq!(pointer, "shape");
}

#[tokio::test]
async fn test_no_temp_files_left_behind() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 2).await;
    for name in ["a", "b", "c"] {
        store
            .save_session(&conversation(), SaveOptions::new().name(name))
            .await
            .unwrap();
    }

    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
