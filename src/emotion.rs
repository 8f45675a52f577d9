//! Emotion labels and the score decoder.
//!
//! The network emits one ordinal-like scalar. It is discretized into seven
//! labels with half-open bands of width 1.0 centered on the integers 0..=5;
//! everything outside those bands, negative scores and NaN included, decodes
//! to [`EmotionLabel::Happy`].

use std::fmt;

/// Discrete facial expression categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    /// Score band [0.0, 0.5)
    Surprise,
    /// Score band [0.5, 1.5)
    Fear,
    /// Score band [1.5, 2.5)
    Angry,
    /// Score band [2.5, 3.5)
    Neutral,
    /// Score band [3.5, 4.5)
    Sad,
    /// Score band [4.5, 5.5)
    Disgust,
    /// Everything else
    Happy,
}

/// Lower-inclusive, upper-exclusive bands in ascending order
const BANDS: [(f32, f32, EmotionLabel); 6] = [
    (0.0, 0.5, EmotionLabel::Surprise),
    (0.5, 1.5, EmotionLabel::Fear),
    (1.5, 2.5, EmotionLabel::Angry),
    (2.5, 3.5, EmotionLabel::Neutral),
    (3.5, 4.5, EmotionLabel::Sad),
    (4.5, 5.5, EmotionLabel::Disgust),
];

impl EmotionLabel {
    /// All labels in band order
    pub const ALL: [Self; 7] = [
        Self::Surprise,
        Self::Fear,
        Self::Angry,
        Self::Neutral,
        Self::Sad,
        Self::Disgust,
        Self::Happy,
    ];

    /// Display name used in overlays and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Surprise => "Surprise",
            Self::Fear => "Fear",
            Self::Angry => "Angry",
            Self::Neutral => "Neutral",
            Self::Sad => "Sad",
            Self::Disgust => "Disgust",
            Self::Happy => "Happy",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw model score to its emotion label
#[must_use]
pub fn decode(score: f32) -> EmotionLabel {
    BANDS
        .iter()
        .find(|(lo, hi, _)| score >= *lo && score < *hi)
        .map_or(EmotionLabel::Happy, |(_, _, label)| *label)
}

/// Overlay text for a classified face, e.g. `Neutral(3.0)`
///
/// The score uses the shortest round-trip representation and always keeps a
/// fractional part.
#[must_use]
pub fn caption(label: EmotionLabel, score: f32) -> String {
    format!("{label}({score:?})")
}
