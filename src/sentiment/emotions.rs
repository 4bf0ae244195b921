//! Keyword emotion detector shared by the remote and the fallback scorer.
//!
//! Matching is by substring: a keyword counts when it appears anywhere inside a
//! whitespace token ("sad" matches "sadness"), and a single token may count for
//! several emotions at once.

use serde::{Deserialize, Serialize};

use super::tokenize;

const JOY_WORDS: &[&str] = &[
    "happy",
    "joy",
    "excited",
    "love",
    "wonderful",
    "amazing",
    "great",
];
const SADNESS_WORDS: &[&str] = &["sad", "depressed", "lonely", "cry", "tears", "heartbroken"];
const ANGER_WORDS: &[&str] = &[
    "angry",
    "furious",
    "mad",
    "frustrated",
    "annoyed",
    "irritated",
];
const FEAR_WORDS: &[&str] = &[
    "scared",
    "afraid",
    "anxious",
    "worried",
    "nervous",
    "terrified",
];
const SURPRISE_WORDS: &[&str] = &[
    "surprised",
    "shocked",
    "amazed",
    "astonished",
    "unexpected",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Joy => JOY_WORDS,
            Emotion::Sadness => SADNESS_WORDS,
            Emotion::Anger => ANGER_WORDS,
            Emotion::Fear => FEAR_WORDS,
            Emotion::Surprise => SURPRISE_WORDS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
        }
    }

    /// True if any keyword of this emotion is contained in `token`.
    fn matches(self, token: &str) -> bool {
        self.keywords().iter().any(|kw| token.contains(kw))
    }
}

/// Five-way emotion breakdown in percent. Either sums to 100 or is all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    pub joy: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub surprise: f64,
}

impl EmotionProfile {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Sadness => self.sadness,
            Emotion::Anger => self.anger,
            Emotion::Fear => self.fear,
            Emotion::Surprise => self.surprise,
        }
    }

    fn slot_mut(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Joy => &mut self.joy,
            Emotion::Sadness => &mut self.sadness,
            Emotion::Anger => &mut self.anger,
            Emotion::Fear => &mut self.fear,
            Emotion::Surprise => &mut self.surprise,
        }
    }

    pub fn total(&self) -> f64 {
        Emotion::ALL.iter().map(|e| self.get(*e)).sum()
    }

    pub fn is_empty(&self) -> bool {
        Emotion::ALL.iter().all(|e| self.get(*e) == 0.0)
    }
}

/// Count emotion keywords per token and rescale the counts to percentages.
pub fn detect_emotions(text: &str) -> EmotionProfile {
    let mut counts = [0u32; 5];
    for token in tokenize(text) {
        for (slot, emotion) in counts.iter_mut().zip(Emotion::ALL) {
            if emotion.matches(&token) {
                *slot += 1;
            }
        }
    }

    let mut profile = EmotionProfile::default();
    let total: u32 = counts.iter().sum();
    if total == 0 {
        return profile;
    }
    for (count, emotion) in counts.iter().zip(Emotion::ALL) {
        *profile.slot_mut(emotion) = (*count as f64 / total as f64) * 100.0;
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sadness_counts_word_and_its_derivatives() {
        let p = detect_emotions("I am so sad and sadness fills me");
        assert!(approx(p.sadness, 100.0), "got {p:?}");
        assert!(approx(p.total(), 100.0));
    }

    #[test]
    fn no_keywords_yields_all_zero() {
        let p = detect_emotions("The train left at nine");
        assert!(p.is_empty());
        assert_eq!(p.total(), 0.0);
    }

    #[test]
    fn empty_text_yields_all_zero() {
        assert!(detect_emotions("").is_empty());
        assert!(detect_emotions("   \n\t ").is_empty());
    }

    #[test]
    fn one_token_can_feed_several_emotions() {
        // "madly-scared" contains both "mad" (anger) and "scared" (fear).
        let p = detect_emotions("madly-scared");
        assert!(approx(p.anger, 50.0));
        assert!(approx(p.fear, 50.0));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let p = detect_emotions("HAPPY Shocked");
        assert!(approx(p.joy, 50.0));
        assert!(approx(p.surprise, 50.0));
    }

    #[test]
    fn mixed_text_splits_proportionally() {
        // joy: happy, love; anger: furious; fear: worried
        let p = detect_emotions("happy love furious worried today");
        assert!(approx(p.joy, 50.0));
        assert!(approx(p.anger, 25.0));
        assert!(approx(p.fear, 25.0));
        assert!(approx(p.sadness, 0.0));
    }

    #[test]
    fn serializes_with_fixed_keys() {
        let v = serde_json::to_value(EmotionProfile::default()).unwrap();
        for e in Emotion::ALL {
            assert!(v.get(e.as_str()).is_some(), "missing key {}", e.as_str());
        }
    }
}
