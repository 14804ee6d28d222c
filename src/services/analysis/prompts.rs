//! Analysis Prompts
//!
//! Persona system message and tier-specific user prompts. Both are pure
//! string builders; the JSON shapes embedded here are the response contract
//! that `payload` coerces against.

use somnia_core::{DreamInput, Tier};

/// System message sent ahead of every analysis prompt.
pub const PERSONA_SYSTEM_PROMPT: &str = r#"You are Dr. Elena Morpheus, a dream analyst with more than twenty years of practice combining Jungian psychology, modern sleep neuroscience, and cross-cultural dream interpretation. You hold a PhD in Psychology and specialize in symbolic analysis and recognizing subconscious patterns.

Your analyses are:
- Psychologically sophisticated and insightful
- Empathetic while remaining professionally grounded
- Rich in symbolic and cultural context
- Practical, with insights the dreamer can act on
- Personal to the specific dream narrative

Help the dreamer understand their inner world and surface the layers of meaning others would miss. Respond ONLY with a valid JSON object. Do not write any text outside the JSON."#;

const FREE_RESPONSE_SHAPE: &str = r#"{
  "summary": "A 3-4 sentence summary of the dream's core psychological themes and significance, professional yet accessible",
  "symbols": [
    {
      "name": "Symbol name",
      "meaning": "Detailed explanation of the symbol's psychological significance, cultural context, and personal relevance, covering universal and individual readings (150-200 words)"
    }
  ],
  "interpretation": "A 4-5 paragraph interpretation weaving symbols, emotions, and narrative into one understanding of the unconscious processes and life connections at work (400-500 words)",
  "reflectionQuestions": [
    "Open-ended questions that guide self-exploration",
    "Questions linking the dream to waking-life patterns",
    "Questions that invite emotional processing",
    "Questions about growth and unconscious motivation",
    "Prompts about relationships and life direction"
  ]
}"#;

const PREMIUM_RESPONSE_SHAPE: &str = r#"{
  "summary": "A 3-4 sentence summary of the dream's core psychological themes and significance, professional yet accessible",
  "symbols": [
    {
      "name": "Symbol name",
      "meaning": "Multi-layered explanation across psychological, cultural, archetypal, and personal dimensions, including shadow work and integration (200-250 words)"
    }
  ],
  "interpretation": "A 5-6 paragraph interpretation drawing on depth psychology, neuroscience, and therapeutic perspectives (500-600 words)",
  "reflectionQuestions": [
    "Questions for deep psychological exploration",
    "Questions that reveal unconscious patterns and motivations",
    "Questions connecting the dream to personal transformation",
    "Prompts for shadow work and integration",
    "Questions about purpose and the authentic self",
    "Questions bridging inner and outer life"
  ],
  "premiumAnalysis": {
    "psychological": "Advanced analysis using Jungian concepts (anima/animus, shadow, individuation), attachment theory, trauma-informed perspectives, and REM-sleep memory consolidation (300-400 words)",
    "lifeConnections": "How the dream's symbols and themes relate to current relationships, career, spiritual development, and growth opportunities, with practical applications (300-400 words)",
    "actionableInsights": "Concrete recommendations for personal development, relationships, creative expression, and integration, including specific exercises and practices (300-400 words)",
    "futureImplications": "Developmental trajectories, likely transitions, emerging aspects of personality, and how to prepare for them (300-400 words)"
  }
}"#;

/// Interpolated "DREAM DETAILS" block shared by both tiers.
fn dream_details(dream: &DreamInput) -> String {
    let mut details = format!(
        "DREAM DETAILS:\n\
         Title: \"{}\"\n\
         Narrative: \"{}\"\n\
         Emotional Resonance: {}\n\
         Sleep Quality: {}/5 stars\n",
        dream.title(),
        dream.content(),
        dream.emotion(),
        dream.sleep_quality()
    );
    if let Some(context) = dream.context() {
        details.push_str(&format!("Life Context: \"{}\"\n", context));
    }
    details
}

/// Build the user prompt for a dream at the given tier.
pub fn build_analysis_prompt(dream: &DreamInput, tier: Tier) -> String {
    match tier {
        Tier::Free => build_free_prompt(dream),
        Tier::Premium => build_premium_prompt(dream),
    }
}

fn build_free_prompt(dream: &DreamInput) -> String {
    format!(
        "As Dr. Elena Morpheus, provide a comprehensive dream analysis for this client.\n\n\
         {details}\n\
         ANALYSIS FRAMEWORK:\n\
         Apply Jungian archetypes, symbolic interpretation, the neuroscience of dreaming, and \
         cross-cultural dream meanings. Treat the emotional tone, sleep quality, and any life \
         context as important factors.\n\n\
         Respond with this exact JSON structure:\n\
         {shape}\n\n\
         REQUIREMENTS:\n\
         - Identify 5-7 significant symbols with detailed meanings\n\
         - Give deep psychological insight rather than surface readings\n\
         - Connect the emotional tone ({emotion}) meaningfully to the analysis\n\
         - Consider how sleep quality ({quality}/5) may have shaped the dream\n\
         - Use sophisticated concepts while staying accessible\n\
         - Personalize the interpretation to this specific narrative\n\
         - Include cultural and archetypal perspectives where relevant\n\
         - Provide 5-6 reflection questions that promote self-discovery",
        details = dream_details(dream),
        shape = FREE_RESPONSE_SHAPE,
        emotion = dream.emotion(),
        quality = dream.sleep_quality(),
    )
}

fn build_premium_prompt(dream: &DreamInput) -> String {
    format!(
        "As Dr. Elena Morpheus, provide your most comprehensive PREMIUM dream analysis for this client.\n\n\
         {details}\n\
         PREMIUM ANALYSIS FRAMEWORK:\n\
         Apply advanced Jungian analysis, neuroscientific insight, transpersonal psychology, \
         somatic experiencing, and integrative therapeutic approaches. Pay particular attention \
         to how the life context shapes the dream's meaning.\n\n\
         Respond with this exact JSON structure:\n\
         {shape}\n\n\
         PREMIUM REQUIREMENTS:\n\
         - Identify 6-8 symbols with multi-dimensional meanings\n\
         - Draw on depth psychology, neuroscience, and therapeutic approaches\n\
         - Give specific guidance the client can apply immediately\n\
         - Include shadow work, individuation, and archetypal patterns\n\
         - Connect the dream to broader life themes and spiritual development\n\
         - Offer 6-7 transformative reflection questions\n\
         - Make the premium sections substantially deeper than a basic analysis\n\
         - Include somatic and embodied approaches to integrating the dream",
        details = dream_details(dream),
        shape = PREMIUM_RESPONSE_SHAPE,
    )
}
