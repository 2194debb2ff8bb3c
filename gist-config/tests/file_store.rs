//! File store behavior against real files on disk.

use gist_config::{ConfigStore, FileStore};
use gist_types::{Profile, ReasoningEffort, Settings};
use serde_json::json;

#[tokio::test]
async fn legacy_file_is_migrated_and_saved_in_current_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let legacy = json!({
        "apiKey": "sk-legacy",
        "model": "gpt-4-turbo-preview",
        "customPrompts": ["Keep it short."],
        "debug": true
    });
    tokio::fs::write(&path, legacy.to_string()).await.unwrap();

    let store = FileStore::new(&path);
    let settings = store.load().await.unwrap();
    assert!(settings.debug);
    assert_eq!(settings.default_profile, "default");
    assert_eq!(settings.resolve_profile(None).model, "gpt-4-turbo");

    store.save(&settings).await.unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert!(written.get("model").is_none());
    assert_eq!(written["profiles"]["default"]["model"], "gpt-4-turbo");
    assert_eq!(written["apiKey"], "sk-legacy");
}

#[tokio::test]
async fn profiles_survive_a_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(&dir.path().join("settings.json"));

    let mut settings = Settings {
        api_key: Some("sk-test".into()),
        default_profile: "research".into(),
        ..Settings::default()
    };
    settings.profiles.insert(
        "research".into(),
        Profile {
            model: "o3-mini".into(),
            custom_prompts: vec!["Cite the page sections you used.".into()],
            reasoning: Some(ReasoningEffort::Low),
        },
    );
    store.save(&settings).await.unwrap();

    let loaded = FileStore::new(store.path()).load().await.unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.resolve_profile(None).model, "o3-mini");
    assert_eq!(loaded.resolve_profile(Some("default")).model, "gpt-4o-mini");
}

#[tokio::test]
async fn stored_document_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    FileStore::new(&path)
        .save(&Settings::default())
        .await
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert!(written.get("defaultProfile").is_some());
    assert!(written["profiles"]["default"].get("customPrompts").is_some());
}
