use serde::{Deserialize, Serialize};
use std::fmt;

use crate::kernel::time::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Excited,
    Curious,
    Sad,
    Afraid,
    Angry,
    Confused,
    Surprised,
}

/// Circumplex reference points as (valence, arousal).
///
/// Order matters: nearest-point lookup keeps the first entry on an exact tie,
/// so Neutral wins any tie it takes part in.
pub const REFERENCE_POINTS: [(Emotion, f32, f32); 9] = [
    (Emotion::Neutral, 0.0, 0.3),
    (Emotion::Happy, 0.8, 0.7),
    (Emotion::Excited, 0.9, 0.9),
    (Emotion::Curious, 0.5, 0.6),
    (Emotion::Sad, -0.7, 0.3),
    (Emotion::Afraid, -0.6, 0.8),
    (Emotion::Angry, -0.8, 0.9),
    (Emotion::Confused, -0.2, 0.5),
    (Emotion::Surprised, 0.3, 0.8),
];

impl Emotion {
    pub fn name(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Curious => "curious",
            Emotion::Sad => "sad",
            Emotion::Afraid => "afraid",
            Emotion::Angry => "angry",
            Emotion::Confused => "confused",
            Emotion::Surprised => "surprised",
        }
    }

    pub fn reference_point(&self) -> (f32, f32) {
        REFERENCE_POINTS
            .iter()
            .find(|(e, _, _)| e == self)
            .map(|(_, v, a)| (*v, *a))
            .unwrap_or((0.0, 0.3))
    }

    /// Nearest reference point by Euclidean distance.
    pub fn nearest(valence: f32, arousal: f32) -> Emotion {
        let mut best = Emotion::Neutral;
        let mut best_distance = f32::INFINITY;
        for (emotion, v, a) in REFERENCE_POINTS.iter() {
            let distance = ((valence - v).powi(2) + (arousal - a).powi(2)).sqrt();
            if distance < best_distance {
                best_distance = distance;
                best = *emotion;
            }
        }
        best
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    pub emotion: Emotion,
    pub intensity: f32, // 0.0 - 1.0
    pub valence: f32,   // -1.0 - 1.0
    pub arousal: f32,   // 0.0 - 1.0
    pub timestamp: Timestamp,
}

impl EmotionState {
    /// Values are clamped into their domains.
    pub fn new(emotion: Emotion, intensity: f32, valence: f32, arousal: f32, timestamp: Timestamp) -> Self {
        Self {
            emotion,
            intensity: clamp(intensity, 0.0, 1.0),
            valence: clamp(valence, -1.0, 1.0),
            arousal: clamp(arousal, 0.0, 1.0),
            timestamp,
        }
    }

    pub fn at_reference(emotion: Emotion, timestamp: Timestamp) -> Self {
        let (valence, arousal) = emotion.reference_point();
        Self::new(emotion, 0.5, valence, arousal, timestamp)
    }
}

pub(crate) fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        return lo.max(0.0).min(hi);
    }
    value.clamp(lo, hi)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    PositiveEvent,
    NegativeEvent,
    Surprise,
    Confusion,
    Custom(String),
}

impl TriggerKind {
    pub fn name(&self) -> &str {
        match self {
            TriggerKind::PositiveEvent => "positive_event",
            TriggerKind::NegativeEvent => "negative_event",
            TriggerKind::Surprise => "surprise",
            TriggerKind::Confusion => "confusion",
            TriggerKind::Custom(name) => name,
        }
    }
}

/// Time-bounded impulse on the affect state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTrigger {
    pub kind: TriggerKind,
    pub valence_delta: f32,
    pub arousal_delta: f32,
    pub duration: f32, // seconds
    pub created_at: Timestamp,
}

impl EmotionTrigger {
    pub fn is_active(&self, now: Timestamp) -> bool {
        now.secs_since(self.created_at) < self.duration
    }
}

/// Personality-derived gains applied to summed trigger deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionModifiers {
    /// Valence gain.
    pub sensitivity: f32,
    /// Arousal gain is `1 - patience`.
    pub patience: f32,
}

impl Default for EmotionModifiers {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            patience: 0.6,
        }
    }
}

impl EmotionModifiers {
    pub fn from_personality(profile: &crate::kernel::personality::PersonalityProfile) -> Self {
        use crate::kernel::personality::PersonalityTrait;
        Self {
            sensitivity: 1.0 - profile.trait_value(PersonalityTrait::EmotionalStability),
            patience: profile.trait_value(PersonalityTrait::Patience),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionInfo {
    pub current_emotion: Emotion,
    pub intensity: f32,
    pub valence: f32,
    pub arousal: f32,
    pub active_triggers: usize,
    pub modifiers: EmotionModifiers,
    pub description: String,
}
