//! Storage Integration Tests
//!
//! SQLite-backed analysis store and the JSON config file on real temp files.

use somnia::models::settings::API_KEY_ENV;
use somnia::storage::{AnalysisStore, ConfigService, Database, SqliteAnalysisStore};
use somnia::{AppConfig, CacheEntry, DreamAnalysis, SettingsUpdate, Tier};

fn analysis(summary: &str) -> DreamAnalysis {
    DreamAnalysis {
        dream_title: "Test".to_string(),
        date: "October 18, 2026".to_string(),
        summary: summary.to_string(),
        symbols: vec![],
        interpretation: "i".to_string(),
        reflection_questions: vec![],
        premium_analysis: None,
    }
}

#[tokio::test]
async fn test_sqlite_store_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("somnia.db");

    {
        let store = SqliteAnalysisStore::new(Database::open(&path).unwrap());
        let entry = CacheEntry {
            dream_id: "d1".to_string(),
            analysis: analysis("first"),
            tier: Tier::Premium,
            generated_at: 100,
        };
        assert!(store.put(entry).await.unwrap());
    }

    let store = SqliteAnalysisStore::new(Database::open(&path).unwrap());
    let loaded = store.get("d1").await.unwrap().unwrap();
    assert_eq!(loaded.analysis.summary, "first");
    assert_eq!(loaded.tier, Tier::Premium);

    let stale = CacheEntry {
        generated_at: 50,
        ..loaded.clone()
    };
    assert!(!store.put(stale).await.unwrap());

    let newer = CacheEntry {
        analysis: analysis("second"),
        generated_at: 101,
        ..loaded
    };
    assert!(store.put(newer).await.unwrap());
    assert_eq!(
        store.get("d1").await.unwrap().unwrap().analysis.summary,
        "second"
    );
}

#[test]
fn test_config_file_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut service = ConfigService::open(&path).unwrap();
    assert!(path.exists());
    assert_eq!(service.get_config(), &AppConfig::default());

    service
        .update_config(SettingsUpdate {
            text_model: Some("gpt-4o".to_string()),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();

    let reopened = ConfigService::open(&path).unwrap();
    let config = reopened.get_config();
    assert_eq!(config.text.model, "gpt-4o");
    assert_eq!(config.text_provider().api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_env_key_fills_missing_only() {
    assert_eq!(API_KEY_ENV, "OPENAI_API_KEY");
    let config = AppConfig::default().with_env_api_key(Some("sk-env".to_string()));
    assert_eq!(config.text.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.image.api_key.as_deref(), Some("sk-env"));

    let mut configured = AppConfig::default();
    configured.text.api_key = Some("sk-file".to_string());
    let configured = configured.with_env_api_key(Some("sk-env".to_string()));
    assert_eq!(configured.text.api_key.as_deref(), Some("sk-file"));
}
