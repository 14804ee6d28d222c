//! Pipeline Integration Tests
//!
//! Totality, write-through caching, single-flight generation and the
//! fallback path through the public `AnalysisPipeline` surface.

use std::sync::Arc;
use std::time::Duration;

use somnia::services::analysis::fallback;
use somnia::storage::{AnalysisStore, Database, InMemoryAnalysisStore, SqliteAnalysisStore};
use somnia::{AnalysisPipeline, DreamInput, Emotion, Tier};

use crate::support::{completion, flying_dream, http_500, ScriptedProvider};

const OK_FREE: &str = r#"{"summary":"ok","symbols":[{"name":"Flying","meaning":"freedom"}],"interpretation":"i","reflectionQuestions":["q"]}"#;
const OK_PREMIUM: &str = r#"{"summary":"premium","premiumAnalysis":{"psychological":"p","lifeConnections":"l","actionableInsights":"a","futureImplications":"f"}}"#;

// ============================================================================
// Fallback and totality
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_http_500_three_times_yields_fallback() {
    let provider = Arc::new(ScriptedProvider::new(|_| http_500()));
    let store = Arc::new(InMemoryAnalysisStore::new());
    let pipeline = AnalysisPipeline::new(provider.clone(), store.clone());
    let dream = flying_dream();

    let started = tokio::time::Instant::now();
    let analysis = pipeline.generate_analysis("d1", &dream, Tier::Free).await;

    assert_eq!(provider.free_calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));

    let expected = fallback::synthesize(&dream, Tier::Free, &analysis.date);
    assert_eq!(analysis, expected);
    assert!(analysis.premium_analysis.is_none());

    // Fallback results are cached like any other.
    let entry = store.get("d1").await.unwrap().unwrap();
    assert_eq!(entry.analysis, analysis);
}

#[tokio::test(start_paused = true)]
async fn test_every_tier_and_emotion_resolves() {
    let provider = Arc::new(ScriptedProvider::new(|_| completion("not json at all")));
    let pipeline = AnalysisPipeline::new(provider, Arc::new(InMemoryAnalysisStore::new()));

    for (i, emotion) in Emotion::ALL.iter().enumerate() {
        for tier in [Tier::Free, Tier::Premium] {
            let quality = (i % 5) as u8 + 1;
            let dream = DreamInput::new("Night", "A long corridor", *emotion, quality).unwrap();
            let id = format!("{}-{}", emotion, tier);

            let analysis = pipeline.generate_analysis(&id, &dream, tier).await;
            assert_eq!(analysis.dream_title, "Night");
            assert!(!analysis.summary.is_empty());
            assert!(!analysis.date.is_empty());
            assert_eq!(analysis.has_premium(), tier.is_premium());
        }
    }
}

// ============================================================================
// Example completions
// ============================================================================

#[tokio::test]
async fn test_fenced_completion_is_used() {
    let provider = Arc::new(ScriptedProvider::always(
        "```json\n{\"summary\":\"ok\",\"symbols\":[],\"interpretation\":\"i\",\"reflectionQuestions\":[]}\n```\n",
    ));
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));

    let analysis = pipeline
        .generate_analysis("fenced", &flying_dream(), Tier::Free)
        .await;
    assert_eq!(analysis.summary, "ok");
    assert_eq!(analysis.interpretation, "i");
    assert!(analysis.symbols.is_empty());
    assert_eq!(provider.free_calls(), 1);
}

#[tokio::test]
async fn test_trailing_comma_repaired_and_missing_keys_defaulted() {
    let provider = Arc::new(ScriptedProvider::always(
        r#"{"summary":"ok","symbols":[{"name":"Flying","meaning":"x"},]}"#,
    ));
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));

    let analysis = pipeline
        .generate_analysis("comma", &flying_dream(), Tier::Free)
        .await;
    assert_eq!(analysis.summary, "ok");
    assert_eq!(analysis.symbols.len(), 1);
    assert_eq!(analysis.symbols[0].name, "Flying");
    assert_eq!(analysis.interpretation, "Dream interpretation completed.");
    assert!(analysis.reflection_questions.is_empty());
    // Schema gaps are not retried.
    assert_eq!(provider.free_calls(), 1);
}

// ============================================================================
// Caching and single flight
// ============================================================================

#[tokio::test]
async fn test_second_call_reads_cache() {
    let provider = Arc::new(ScriptedProvider::always(OK_FREE));
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));
    let dream = flying_dream();

    let first = pipeline.generate_analysis("d1", &dream, Tier::Free).await;
    let second = pipeline.generate_analysis("d1", &dream, Tier::Free).await;

    assert_eq!(first, second);
    assert_eq!(provider.total_calls(), 1);
    assert_eq!(pipeline.cached_analysis("d1").await, Some(first));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_issue_one_round() {
    let provider = Arc::new(ScriptedProvider::always(OK_FREE).with_delay(Duration::from_secs(2)));
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));
    let dream = flying_dream();

    let first = {
        let pipeline = pipeline.clone();
        let dream = dream.clone();
        tokio::spawn(async move { pipeline.generate_analysis("same", &dream, Tier::Free).await })
    };
    let second = {
        let pipeline = pipeline.clone();
        let dream = dream.clone();
        tokio::spawn(async move { pipeline.generate_analysis("same", &dream, Tier::Free).await })
    };

    let (a, b) = (first.await.unwrap(), second.await.unwrap());
    assert_eq!(a, b);
    assert_eq!(provider.free_calls(), 1);
    assert_eq!(pipeline.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_regenerate_joins_running_generation() {
    let provider = Arc::new(ScriptedProvider::always(OK_FREE).with_delay(Duration::from_secs(2)));
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));
    let dream = flying_dream();

    let (a, b) = tokio::join!(
        pipeline.generate_analysis("d1", &dream, Tier::Free),
        pipeline.regenerate_analysis("d1", &dream, Tier::Free)
    );
    assert_eq!(a, b);
    assert_eq!(provider.free_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_premium_call_waits_for_running_free_generation() {
    let provider = Arc::new(
        ScriptedProvider::by_tier(|| completion(OK_FREE), || completion(OK_PREMIUM))
            .with_delay(Duration::from_secs(2)),
    );
    let store = Arc::new(InMemoryAnalysisStore::new());
    let pipeline = AnalysisPipeline::new(provider.clone(), store.clone());
    let dream = flying_dream();

    let (free, premium) = tokio::join!(
        pipeline.generate_analysis("d1", &dream, Tier::Free),
        pipeline.generate_analysis("d1", &dream, Tier::Premium)
    );

    assert!(!free.has_premium());
    let sections = premium.premium_analysis.expect("premium request must carry premium sections");
    assert_eq!(sections.psychological, "p");
    // The free round ran first; the premium request then ran its own pair.
    assert_eq!(provider.free_calls(), 2);
    assert_eq!(provider.premium_calls(), 1);

    let entry = store.get("d1").await.unwrap().unwrap();
    assert_eq!(entry.tier, Tier::Premium);
    assert_eq!(pipeline.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_free_call_joins_running_premium_generation() {
    let provider = Arc::new(
        ScriptedProvider::by_tier(|| completion(OK_FREE), || completion(OK_PREMIUM))
            .with_delay(Duration::from_secs(2)),
    );
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));
    let dream = flying_dream();

    let (premium, free) = tokio::join!(
        pipeline.generate_analysis("d1", &dream, Tier::Premium),
        pipeline.generate_analysis("d1", &dream, Tier::Free)
    );

    assert!(premium.has_premium());
    assert!(!free.has_premium());
    assert_eq!(free.summary, premium.summary);
    assert_eq!(provider.free_calls(), 1);
    assert_eq!(provider.premium_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_forced_premium_after_running_free_generation() {
    let provider = Arc::new(
        ScriptedProvider::by_tier(|| completion(OK_FREE), || completion(OK_PREMIUM))
            .with_delay(Duration::from_secs(2)),
    );
    let pipeline = AnalysisPipeline::new(provider.clone(), Arc::new(InMemoryAnalysisStore::new()));
    let dream = flying_dream();

    let (_, premium) = tokio::join!(
        pipeline.generate_analysis("d1", &dream, Tier::Free),
        pipeline.regenerate_analysis("d1", &dream, Tier::Premium)
    );

    assert!(premium.has_premium());
    assert_eq!(provider.premium_calls(), 1);
}

#[tokio::test]
async fn test_sqlite_cache_survives_pipeline_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("somnia.db");
    let dream = flying_dream();

    let first_provider = Arc::new(ScriptedProvider::always(OK_FREE));
    let first = {
        let store = Arc::new(SqliteAnalysisStore::new(Database::open(&db_path).unwrap()));
        AnalysisPipeline::new(first_provider.clone(), store)
            .generate_analysis("persisted", &dream, Tier::Free)
            .await
    };

    let second_provider = Arc::new(ScriptedProvider::new(|_| http_500()));
    let store = Arc::new(SqliteAnalysisStore::new(Database::open(&db_path).unwrap()));
    let second = AnalysisPipeline::new(second_provider.clone(), store)
        .generate_analysis("persisted", &dream, Tier::Free)
        .await;

    assert_eq!(first, second);
    assert_eq!(first_provider.total_calls(), 1);
    assert_eq!(second_provider.total_calls(), 0);
}
