//! Premium Assembly Integration Tests
//!
//! The free and premium halves of a premium request are generated and fall
//! back independently.

use std::sync::Arc;

use somnia::services::analysis::{fallback, AnalysisAssembler, RequestExecutor, Source};
use somnia::{AnalysisPipeline, InMemoryAnalysisStore, Tier};

use crate::support::{completion, flying_dream, http_500, ScriptedProvider};

const FREE_OK: &str = r#"{"summary":"free ok","symbols":[],"interpretation":"i","reflectionQuestions":[]}"#;
const PREMIUM_OK: &str = r#"{"summary":"premium summary","premiumAnalysis":{"psychological":"p","lifeConnections":"l","actionableInsights":"a","futureImplications":"f"}}"#;

#[tokio::test(start_paused = true)]
async fn test_free_half_fails_premium_half_succeeds() {
    let provider = Arc::new(ScriptedProvider::by_tier(http_500, || completion(PREMIUM_OK)));
    let assembler = AnalysisAssembler::new(RequestExecutor::new(provider.clone()));
    let dream = flying_dream();

    let assembly = assembler.assemble(&dream, Tier::Premium).await;
    assert_eq!(provider.free_calls(), 3);
    assert_eq!(provider.premium_calls(), 1);
    assert_eq!(assembly.base_source, Source::Fallback);
    assert_eq!(assembly.premium_source, Some(Source::Model));

    let base = fallback::synthesize(&dream, Tier::Free, &assembly.analysis.date);
    assert_eq!(assembly.analysis.summary, base.summary);
    assert_eq!(assembly.analysis.symbols, base.symbols);
    let premium = assembly.analysis.premium_analysis.unwrap();
    assert_eq!(premium.psychological, "p");
    assert_eq!(premium.future_implications, "f");
}

#[tokio::test(start_paused = true)]
async fn test_premium_half_fails_free_half_succeeds() {
    let provider = Arc::new(ScriptedProvider::by_tier(|| completion(FREE_OK), http_500));
    let assembler = AnalysisAssembler::new(RequestExecutor::new(provider.clone()));

    let assembly = assembler.assemble(&flying_dream(), Tier::Premium).await;
    assert_eq!(provider.free_calls(), 1);
    assert_eq!(provider.premium_calls(), 3);
    assert_eq!(assembly.base_source, Source::Model);
    assert_eq!(assembly.premium_source, Some(Source::Fallback));
    assert_eq!(assembly.analysis.summary, "free ok");
    assert_eq!(
        assembly.analysis.premium_analysis,
        Some(fallback::premium_sections())
    );
}

#[tokio::test(start_paused = true)]
async fn test_base_fields_never_come_from_premium_round() {
    let provider = Arc::new(ScriptedProvider::by_tier(
        || completion(FREE_OK),
        || completion(PREMIUM_OK),
    ));
    let pipeline = AnalysisPipeline::new(provider, Arc::new(InMemoryAnalysisStore::new()));

    let analysis = pipeline
        .generate_analysis("premium", &flying_dream(), Tier::Premium)
        .await;
    assert_eq!(analysis.summary, "free ok");
    assert_eq!(analysis.premium_analysis.unwrap().life_connections, "l");
}

#[tokio::test(start_paused = true)]
async fn test_premium_halves_run_concurrently() {
    let provider = Arc::new(
        ScriptedProvider::by_tier(|| completion(FREE_OK), || completion(PREMIUM_OK))
            .with_delay(std::time::Duration::from_secs(4)),
    );
    let assembler = AnalysisAssembler::new(RequestExecutor::new(provider));

    let started = tokio::time::Instant::now();
    assembler.assemble(&flying_dream(), Tier::Premium).await;
    assert_eq!(started.elapsed(), std::time::Duration::from_secs(4));
}
