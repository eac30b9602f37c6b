use std::collections::BTreeMap;
use tracing::{info, warn};

use super::types::*;

/// Spoken replies keyed by the user's detected emotion.
const EMPATHY_RESPONSES: [(&str, &str); 4] = [
    ("sad", "Tôi hiểu cảm giác của bạn. Có điều gì tôi có thể giúp không?"),
    ("angry", "Tôi xin lỗi nếu có điều gì làm bạn khó chịu."),
    ("happy", "Thật tuyệt! Tôi cũng vui khi bạn vui!"),
    ("afraid", "Đừng lo lắng, tôi ở đây để giúp bạn."),
];

/// Trait vector plus the response policies derived from it.
///
/// The profile is effectively fixed for a session; `set_trait` and
/// `adjust_trait` exist for explicit tuning by the host.
#[derive(Debug, Clone)]
pub struct PersonalityProfile {
    preset: Option<Preset>,
    traits: TraitVector,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self::from_preset(Preset::Friendly)
    }
}

impl PersonalityProfile {
    pub fn from_preset(preset: Preset) -> Self {
        info!("Personality initialised (preset: {})", preset.name());
        Self {
            preset: Some(preset),
            traits: TraitVector::from_preset(preset),
        }
    }

    /// Resolve a preset by name. Unknown names fall back to `friendly`.
    pub fn named(name: &str) -> Self {
        match name.parse::<Preset>() {
            Ok(preset) => Self::from_preset(preset),
            Err(e) => {
                warn!("{}, falling back to 'friendly'", e);
                Self::from_preset(Preset::Friendly)
            }
        }
    }

    /// Build trait-by-trait on top of the `friendly` baseline.
    /// Unknown names are skipped with a warning.
    pub fn from_traits<'a, I>(traits: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut profile = Self {
            preset: None,
            traits: TraitVector::from_preset(Preset::Friendly),
        };
        for (name, value) in traits {
            if let Err(e) = profile.set_trait(name, value) {
                warn!("Ignoring trait override: {}", e);
            }
        }
        profile
    }

    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    pub fn trait_value(&self, t: PersonalityTrait) -> f32 {
        self.traits.get(t)
    }

    pub fn get_trait(&self, name: &str) -> Option<f32> {
        name.parse::<PersonalityTrait>().ok().map(|t| self.traits.get(t))
    }

    pub fn set_trait(&mut self, name: &str, value: f32) -> Result<(), PersonalityError> {
        let t = name.parse::<PersonalityTrait>()?;
        self.set_trait_value(t, value);
        Ok(())
    }

    pub fn set_trait_value(&mut self, t: PersonalityTrait, value: f32) {
        self.traits.set(t, value);
        info!("Trait '{}' = {:.2}", t, self.traits.get(t));
    }

    pub fn adjust_trait(&mut self, name: &str, delta: f32) -> Result<(), PersonalityError> {
        let t = name.parse::<PersonalityTrait>()?;
        let current = self.traits.get(t);
        self.set_trait_value(t, current + delta);
        Ok(())
    }

    pub fn get_all_traits(&self) -> BTreeMap<String, f32> {
        self.traits
            .iter()
            .map(|(t, v)| (t.name().to_string(), v))
            .collect()
    }

    pub fn get_response_style(&self) -> ResponseStyle {
        use PersonalityTrait::*;
        ResponseStyle {
            verbosity: self.trait_value(Extraversion),
            formality: self.trait_value(Conscientiousness),
            warmth: self.trait_value(Agreeableness),
            humor_level: self.trait_value(Humor),
            emoji_usage: self.trait_value(Extraversion) * self.trait_value(Humor),
            politeness_level: self.trait_value(Politeness),
        }
    }

    pub fn should_show_emotion(&self) -> bool {
        self.trait_value(PersonalityTrait::Extraversion) > 0.6
    }

    pub fn get_greeting_style(&self) -> &'static str {
        let extraversion = self.trait_value(PersonalityTrait::Extraversion);
        let polite = self.trait_value(PersonalityTrait::Politeness) > 0.7;

        match (extraversion > 0.7, polite) {
            (true, true) => "Xin chào! Rất vui được gặp bạn!",
            (true, false) => "Chào bạn! Có gì tôi giúp được không?",
            (false, true) => "Xin chào.",
            (false, false) => "Chào.",
        }
    }

    pub fn get_error_handling_style(&self) -> &'static str {
        let patience = self.trait_value(PersonalityTrait::Patience);
        let empathy = self.trait_value(PersonalityTrait::Empathy);

        if patience > 0.7 {
            if empathy > 0.7 {
                "Xin lỗi, tôi chưa hiểu rõ. Bạn có thể giải thích thêm được không?"
            } else {
                "Xin lỗi, tôi chưa hiểu. Vui lòng nói lại."
            }
        } else {
            "Không hiểu. Nói lại."
        }
    }

    pub fn should_ask_clarification(&self, confusion_level: f32) -> bool {
        let threshold = 0.5 - self.trait_value(PersonalityTrait::Conscientiousness) * 0.2;
        confusion_level > threshold && self.trait_value(PersonalityTrait::Patience) > 0.5
    }

    /// Seconds to wait on the user before prompting: 5s to 30s.
    pub fn get_wait_time_tolerance(&self) -> f32 {
        5.0 + self.trait_value(PersonalityTrait::Patience) * 25.0
    }

    pub fn should_use_humor(&self, context_seriousness: f32) -> bool {
        if context_seriousness > 0.7 {
            return false;
        }
        self.trait_value(PersonalityTrait::Humor) > 0.6
    }

    pub fn get_empathy_response(&self, user_emotion: &str) -> Option<&'static str> {
        if self.trait_value(PersonalityTrait::Empathy) < 0.5 {
            return None;
        }
        let key = user_emotion.trim().to_ascii_lowercase();
        EMPATHY_RESPONSES
            .iter()
            .find(|(emotion, _)| *emotion == key)
            .map(|(_, response)| *response)
    }

    pub fn describe(&self) -> String {
        use PersonalityTrait::*;
        let mut words = Vec::new();

        let extraversion = self.trait_value(Extraversion);
        if extraversion > 0.7 {
            words.push("lively");
        } else if extraversion < 0.3 {
            words.push("reserved");
        }
        if self.trait_value(Agreeableness) > 0.7 {
            words.push("friendly");
        }
        if self.trait_value(Humor) > 0.7 {
            words.push("humorous");
        }
        if self.trait_value(Empathy) > 0.7 {
            words.push("empathetic");
        }
        if words.is_empty() {
            words.push("balanced");
        }

        format!("Personality: {}", words.join(", "))
    }

    pub fn info(&self) -> PersonalityInfo {
        PersonalityInfo {
            preset: self.preset,
            traits: self.get_all_traits(),
            description: self.describe(),
            response_style: self.get_response_style(),
        }
    }
}
