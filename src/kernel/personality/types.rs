use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    EmotionalStability,
    Politeness,
    Humor,
    Curiosity,
    Patience,
    Empathy,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 10] = [
        PersonalityTrait::Openness,
        PersonalityTrait::Conscientiousness,
        PersonalityTrait::Extraversion,
        PersonalityTrait::Agreeableness,
        PersonalityTrait::EmotionalStability,
        PersonalityTrait::Politeness,
        PersonalityTrait::Humor,
        PersonalityTrait::Curiosity,
        PersonalityTrait::Patience,
        PersonalityTrait::Empathy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PersonalityTrait::Openness => "openness",
            PersonalityTrait::Conscientiousness => "conscientiousness",
            PersonalityTrait::Extraversion => "extraversion",
            PersonalityTrait::Agreeableness => "agreeableness",
            PersonalityTrait::EmotionalStability => "emotional_stability",
            PersonalityTrait::Politeness => "politeness",
            PersonalityTrait::Humor => "humor",
            PersonalityTrait::Curiosity => "curiosity",
            PersonalityTrait::Patience => "patience",
            PersonalityTrait::Empathy => "empathy",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PersonalityTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PersonalityTrait {
    type Err = PersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalityTrait::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| PersonalityError::UnknownTrait(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersonalityError {
    #[error("unknown personality trait '{0}'")]
    UnknownTrait(String),
    #[error("unknown personality preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Friendly,
    Professional,
    Playful,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Friendly => "friendly",
            Preset::Professional => "professional",
            Preset::Playful => "playful",
        }
    }

    /// Values in `PersonalityTrait::ALL` order.
    pub fn values(&self) -> [f32; 10] {
        match self {
            Preset::Friendly => [0.7, 0.6, 0.8, 0.9, 0.7, 0.8, 0.6, 0.7, 0.7, 0.8],
            Preset::Professional => [0.6, 0.9, 0.5, 0.7, 0.8, 0.9, 0.3, 0.6, 0.8, 0.6],
            Preset::Playful => [0.9, 0.5, 0.9, 0.8, 0.6, 0.6, 0.9, 0.9, 0.5, 0.7],
        }
    }
}

impl FromStr for Preset {
    type Err = PersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "friendly" => Ok(Preset::Friendly),
            "professional" => Ok(Preset::Professional),
            "playful" => Ok(Preset::Playful),
            other => Err(PersonalityError::UnknownPreset(other.to_string())),
        }
    }
}

/// Dense trait vector. Every value is kept inside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitVector {
    values: [f32; 10],
}

impl TraitVector {
    pub fn from_preset(preset: Preset) -> Self {
        Self { values: preset.values() }
    }

    pub fn get(&self, t: PersonalityTrait) -> f32 {
        self.values[t.index()]
    }

    pub fn set(&mut self, t: PersonalityTrait, value: f32) {
        self.values[t.index()] = clamp_unit(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonalityTrait, f32)> + '_ {
        PersonalityTrait::ALL.iter().map(move |t| (*t, self.get(*t)))
    }
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStyle {
    pub verbosity: f32,
    pub formality: f32,
    pub warmth: f32,
    pub humor_level: f32,
    pub emoji_usage: f32,
    pub politeness_level: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityInfo {
    pub preset: Option<Preset>,
    pub traits: std::collections::BTreeMap<String, f32>,
    pub description: String,
    pub response_style: ResponseStyle,
}
