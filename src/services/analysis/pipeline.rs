//! Analysis Pipeline
//!
//! Public entry point: cache lookup, single-flight generation per dream id,
//! and write-through persistence. Every call resolves to a `DreamAnalysis`.
//!
//! Generations run on spawned tasks. A caller that drops its future does not
//! cancel the work; the result is still written to the store.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use somnia_core::{DreamAnalysis, DreamInput, Tier};
use somnia_llm::LlmProvider;
use tracing::{debug, error, warn};

use super::assembler::{today_label, AnalysisAssembler};
use super::executor::{RequestExecutor, RetryPolicy};
use super::fallback;
use crate::models::CacheEntry;
use crate::storage::AnalysisStore;

type SharedGeneration = Shared<BoxFuture<'static, DreamAnalysis>>;

struct InFlight {
    token: u64,
    tier: Tier,
    generation: SharedGeneration,
}

enum Slot {
    Join(SharedGeneration),
    Wait(SharedGeneration),
}

impl InFlight {
    /// Whether this generation's result is acceptable for a `tier` request.
    fn serves(&self, tier: Tier) -> bool {
        self.tier == tier || self.tier.is_premium()
    }
}

struct PipelineInner {
    assembler: AnalysisAssembler,
    store: Arc<dyn AnalysisStore>,
    in_flight: DashMap<String, InFlight>,
    next_token: AtomicU64,
    last_stamp: AtomicI64,
}

impl PipelineInner {
    /// Cached analysis usable for `tier`. A premium entry also serves free
    /// requests. Store errors are treated as a miss.
    async fn cached(&self, dream_id: &str, tier: Tier) -> Option<DreamAnalysis> {
        match self.store.get(dream_id).await {
            Ok(Some(entry)) if entry.tier == tier || entry.tier.is_premium() => {
                debug!(dream_id, %tier, "analysis cache hit");
                Some(for_tier(entry.analysis, tier))
            }
            Ok(Some(entry)) => {
                debug!(dream_id, cached = %entry.tier, requested = %tier, "cached tier too low");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(dream_id, error = %e, "analysis cache read failed");
                None
            }
        }
    }

    /// Millisecond timestamp, strictly increasing within this process.
    fn next_stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last_stamp.load(Ordering::SeqCst);
        loop {
            let stamp = now.max(last + 1);
            match self
                .last_stamp
                .compare_exchange(last, stamp, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return stamp,
                Err(current) => last = current,
            }
        }
    }

    async fn persist(&self, dream_id: &str, analysis: &DreamAnalysis, tier: Tier) {
        let entry = CacheEntry {
            dream_id: dream_id.to_string(),
            analysis: analysis.clone(),
            tier,
            generated_at: self.next_stamp(),
        };
        match self.store.put(entry).await {
            Ok(true) => debug!(dream_id, %tier, "analysis cached"),
            Ok(false) => debug!(dream_id, "newer cached analysis kept"),
            Err(e) => warn!(dream_id, error = %e, "failed to cache analysis"),
        }
    }

    fn finish(&self, dream_id: &str, token: u64) {
        self.in_flight
            .remove_if(dream_id, |_, in_flight| in_flight.token == token);
    }
}

/// Free requests never carry premium sections, even when served from a
/// premium entry or generation.
fn for_tier(mut analysis: DreamAnalysis, tier: Tier) -> DreamAnalysis {
    if !tier.is_premium() {
        analysis.premium_analysis = None;
    }
    analysis
}

/// Generates, caches, and de-duplicates dream analyses.
#[derive(Clone)]
pub struct AnalysisPipeline {
    inner: Arc<PipelineInner>,
}

impl AnalysisPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, store: Arc<dyn AnalysisStore>) -> Self {
        Self::with_retry_policy(provider, store, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn AnalysisStore>,
        policy: RetryPolicy,
    ) -> Self {
        let executor = RequestExecutor::with_policy(provider, policy);
        Self {
            inner: Arc::new(PipelineInner {
                assembler: AnalysisAssembler::new(executor),
                store,
                in_flight: DashMap::new(),
                next_token: AtomicU64::new(0),
                last_stamp: AtomicI64::new(0),
            }),
        }
    }

    /// Return the cached analysis for `dream_id`, generating and caching one
    /// if needed. Concurrent calls for the same id share one generation; a
    /// premium call that finds a free generation running waits for it and
    /// then upgrades the entry.
    pub async fn generate_analysis(
        &self,
        dream_id: &str,
        dream: &DreamInput,
        tier: Tier,
    ) -> DreamAnalysis {
        if let Some(hit) = self.inner.cached(dream_id, tier).await {
            return hit;
        }
        self.join_or_start(dream_id, dream, tier, false).await
    }

    /// Generate a fresh analysis regardless of the cache. If a generation of
    /// at least this tier is already running for the id, its result is
    /// returned instead.
    pub async fn regenerate_analysis(
        &self,
        dream_id: &str,
        dream: &DreamInput,
        tier: Tier,
    ) -> DreamAnalysis {
        self.join_or_start(dream_id, dream, tier, true).await
    }

    /// Cached analysis for `dream_id`, of any tier.
    pub async fn cached_analysis(&self, dream_id: &str) -> Option<DreamAnalysis> {
        match self.inner.store.get(dream_id).await {
            Ok(entry) => entry.map(|entry| entry.analysis),
            Err(e) => {
                warn!(dream_id, error = %e, "analysis cache read failed");
                None
            }
        }
    }

    /// Number of generations currently running.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.len()
    }

    async fn join_or_start(
        &self,
        dream_id: &str,
        dream: &DreamInput,
        tier: Tier,
        force: bool,
    ) -> DreamAnalysis {
        loop {
            let slot = match self.inner.in_flight.entry(dream_id.to_string()) {
                Entry::Occupied(occupied) if occupied.get().serves(tier) => {
                    debug!(dream_id, %tier, "joining in-flight analysis");
                    Slot::Join(occupied.get().generation.clone())
                }
                Entry::Occupied(occupied) => {
                    debug!(dream_id, %tier, "waiting for lower-tier analysis");
                    Slot::Wait(occupied.get().generation.clone())
                }
                Entry::Vacant(vacant) => {
                    let token = self.inner.next_token.fetch_add(1, Ordering::SeqCst);
                    let generation = self.start(dream_id, dream, tier, force, token);
                    vacant.insert(InFlight {
                        token,
                        tier,
                        generation: generation.clone(),
                    });
                    Slot::Join(generation)
                }
            };

            match slot {
                Slot::Join(generation) => return for_tier(generation.await, tier),
                // The running generation persists and leaves the registry
                // before resolving, so the next pass finds the slot free.
                Slot::Wait(running) => {
                    running.await;
                }
            }
        }
    }

    fn start(
        &self,
        dream_id: &str,
        dream: &DreamInput,
        tier: Tier,
        force: bool,
        token: u64,
    ) -> SharedGeneration {
        let inner = Arc::clone(&self.inner);
        let id = dream_id.to_string();
        let input = dream.clone();

        let handle = tokio::spawn(async move {
            let cached = if force {
                None
            } else {
                inner.cached(&id, tier).await
            };
            let analysis = match cached {
                Some(hit) => hit,
                None => {
                    let assembly = inner.assembler.assemble(&input, tier).await;
                    inner.persist(&id, &assembly.analysis, tier).await;
                    assembly.analysis
                }
            };
            inner.finish(&id, token);
            analysis
        });

        let inner = Arc::clone(&self.inner);
        let id = dream_id.to_string();
        let input = dream.clone();
        async move {
            match handle.await {
                Ok(analysis) => analysis,
                Err(e) => {
                    error!(dream_id = %id, error = %e, "analysis task failed");
                    inner.finish(&id, token);
                    fallback::synthesize(&input, tier, &today_label())
                }
            }
        }
        .boxed()
        .shared()
    }
}
