//! Fallback Synthesizer
//!
//! Deterministic, network-free analysis built from the dream record alone.
//! Used whenever a generation round is exhausted, so the pipeline always has
//! something to return.

use somnia_core::{DreamAnalysis, DreamInput, PremiumAnalysis, Symbol, Tier};

/// Build a complete analysis for `dream`. Premium sections are included only
/// for [`Tier::Premium`].
pub fn synthesize(dream: &DreamInput, tier: Tier, date: &str) -> DreamAnalysis {
    let emotion = dream.emotion().lowercase();
    let title = dream.title();
    DreamAnalysis {
        dream_title: title.to_string(),
        date: date.to_string(),
        summary: format!(
            "Your dream \"{title}\" reveals significant psychological themes related to your \
             current life journey. The {emotion} emotional tone suggests your unconscious mind \
             is actively processing important experiences and relationships. This dream appears \
             to be offering guidance about personal growth and self-understanding."
        ),
        symbols: symbols(dream, &emotion),
        interpretation: interpretation(dream, &emotion),
        reflection_questions: reflection_questions(&emotion),
        premium_analysis: tier.is_premium().then(premium_sections),
    }
}

fn symbols(dream: &DreamInput, emotion: &str) -> Vec<Symbol> {
    let quality = dream.sleep_quality();
    let sleep_reading = if dream.slept_well() {
        "optimal conditions for deep psychological processing and memory consolidation"
    } else {
        "that stress or life circumstances may be affecting your rest, which can influence \
         dream content and emotional processing"
    };

    vec![
        Symbol::new(
            "Central Dream Narrative",
            "The main storyline of your dream represents your psyche's attempt to process and \
             integrate recent life experiences. Dreams often act as a bridge between conscious \
             awareness and unconscious wisdom, helping you navigate complex emotions and situations.",
        ),
        Symbol::new(
            "Emotional Landscape",
            format!(
                "The {emotion} feeling that permeated your dream reflects your current emotional \
                 state and inner processing. This tone offers important clues about how your \
                 unconscious mind is working through challenges and opportunities in waking life."
            ),
        ),
        Symbol::new(
            "Sleep Quality Context",
            format!("Your sleep quality of {quality}/5 suggests {sleep_reading}."),
        ),
    ]
}

fn interpretation(dream: &DreamInput, emotion: &str) -> String {
    let sleep_note = if dream.slept_well() {
        "Good sleep quality often allows for more vivid and meaningful dreams, suggesting your \
         mind had optimal conditions for this psychological work."
    } else {
        "Lower sleep quality can intensify the emotional content of dreams, as your mind works \
         harder to process stress and restore balance."
    };

    [
        format!(
            "Your dream titled \"{}\" appears to be your psyche's way of processing recent \
             experiences and emotions. The {} emotional tone suggests that your unconscious mind \
             is actively working through significant themes in your life.",
            dream.title(),
            emotion
        ),
        "Dreams serve as a natural therapeutic process, letting your mind integrate experiences, \
         process emotions, and often find creative solutions to the challenges you face. The \
         narrative and symbols in your dream likely connect to current relationships, work, \
         personal growth, or spiritual development."
            .to_string(),
        format!(
            "The quality of your sleep ({}/5) also provides context for understanding this \
             dream. {}",
            dream.sleep_quality(),
            sleep_note
        ),
        "Consider this dream a gift from your unconscious wisdom, offering insight and guidance \
         for your conscious life. The emotions and imagery present are likely more significant \
         than they first appear."
            .to_string(),
    ]
    .join("\n\n")
}

fn reflection_questions(emotion: &str) -> Vec<String> {
    vec![
        "What recent experiences or relationships might have influenced the themes in this dream?"
            .to_string(),
        format!(
            "How does the {emotion} feeling from your dream relate to emotions you've been \
             experiencing in your waking life?"
        ),
        "Which parts of this dream felt most significant or memorable to you, and why might that be?"
            .to_string(),
        "If this dream were offering you guidance, what message might it be conveying?".to_string(),
        "How might you honor or integrate the insights from this dream in your daily life?"
            .to_string(),
    ]
}

/// The four premium sections. They do not depend on the dream.
pub fn premium_sections() -> PremiumAnalysis {
    PremiumAnalysis {
        psychological: "This dream shows your mind's natural capacity for psychological \
            integration and emotional processing. From a depth-psychology perspective, dreams \
            bridge conscious and unconscious awareness and often reveal aspects of the self that \
            are ready for integration. The emotional tone and narrative point to active \
            psychological work, possibly tied to individuation, relationship dynamics, or \
            creative expression."
            .to_string(),
        life_connections: "The themes and emotions in this dream likely connect to situations \
            you are currently navigating. Consider how the narrative might mirror your \
            relationships, work challenges, creative projects, or spiritual development. Dreams \
            give you a safe space to explore possibilities and process complex feelings about \
            real-world situations."
            .to_string(),
        actionable_insights: "Keep a dream journal to track patterns and themes over time. \
            Spend some quiet time reflecting on the emotions and imagery from this dream. Creative \
            expression such as art, writing, or movement can help integrate its wisdom further. \
            Notice how the dream's themes show up in your waking life over the next few days."
            .to_string(),
        future_implications: "This dream suggests you are in a period of psychological growth. \
            Its themes may point to emerging aspects of your personality or new directions in \
            your life path. Treat it as preparation for upcoming opportunities or challenges, and \
            trust your unconscious wisdom to guide you forward."
            .to_string(),
    }
}
