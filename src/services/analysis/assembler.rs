//! Analysis Assembler
//!
//! Turns generation rounds into one `DreamAnalysis`. Base fields always come
//! from the free-tier round. For premium requests a second, independent
//! premium-tier round supplies `premiumAnalysis`. Either round may fall back
//! without affecting the other.

use somnia_core::{DreamAnalysis, DreamInput, PremiumAnalysis, Tier};
use tracing::{info, warn};

use super::executor::{GenerationOutcome, RequestExecutor};
use super::fallback;
use super::payload::AnalysisPayload;
use super::prompts::build_analysis_prompt;

/// Where a part of the analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Model,
    Fallback,
}

/// An assembled analysis plus provenance of each half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub analysis: DreamAnalysis,
    pub base_source: Source,
    /// `None` for free-tier requests.
    pub premium_source: Option<Source>,
}

/// Human-readable generation date, e.g. "October 18, 2026".
pub fn today_label() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}

#[derive(Clone)]
pub struct AnalysisAssembler {
    executor: RequestExecutor,
}

impl AnalysisAssembler {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    async fn run_round(&self, dream: &DreamInput, tier: Tier) -> Option<AnalysisPayload> {
        let prompt = build_analysis_prompt(dream, tier);
        match self.executor.execute(tier, &prompt).await {
            GenerationOutcome::Success { payload, .. } => Some(payload),
            GenerationOutcome::Exhausted { failures } => {
                warn!(
                    %tier,
                    dream = dream.title(),
                    attempts = failures.len(),
                    "falling back to synthesized analysis"
                );
                None
            }
        }
    }

    /// Assemble an analysis for `dream`. Never fails.
    pub async fn assemble(&self, dream: &DreamInput, tier: Tier) -> Assembly {
        let (base, premium) = match tier {
            Tier::Free => (self.run_round(dream, Tier::Free).await, None),
            Tier::Premium => {
                let (base, premium) = tokio::join!(
                    self.run_round(dream, Tier::Free),
                    self.run_round(dream, Tier::Premium)
                );
                (base, Some(premium))
            }
        };

        let date = today_label();
        let assembly = merge(dream, tier, &date, base, premium);
        info!(
            %tier,
            base = ?assembly.base_source,
            premium = ?assembly.premium_source,
            "analysis assembled"
        );
        assembly
    }
}

/// Merge round results. `premium` is `None` for free requests and
/// `Some(None)` when the premium round was exhausted.
pub fn merge(
    dream: &DreamInput,
    tier: Tier,
    date: &str,
    base: Option<AnalysisPayload>,
    premium: Option<Option<AnalysisPayload>>,
) -> Assembly {
    let (mut analysis, base_source) = match base {
        Some(payload) => (
            DreamAnalysis {
                dream_title: dream.title().to_string(),
                date: date.to_string(),
                summary: payload.summary_or_default(),
                interpretation: payload.interpretation_or_default(),
                symbols: payload.symbols,
                reflection_questions: payload.reflection_questions,
                premium_analysis: None,
            },
            Source::Model,
        ),
        None => (fallback::synthesize(dream, Tier::Free, date), Source::Fallback),
    };

    let premium_source = if tier.is_premium() {
        let (sections, source) = premium_sections(premium.flatten());
        analysis.premium_analysis = Some(sections);
        Some(source)
    } else {
        None
    };

    Assembly {
        analysis,
        base_source,
        premium_source,
    }
}

fn premium_sections(payload: Option<AnalysisPayload>) -> (PremiumAnalysis, Source) {
    let defaults = fallback::premium_sections();
    match payload {
        Some(payload) => (payload.premium_or(&defaults), Source::Model),
        None => (defaults, Source::Fallback),
    }
}
