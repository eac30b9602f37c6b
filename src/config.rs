use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::kernel::behavior::BehaviorState;
use crate::kernel::decision::maker::DEFAULT_ACTION_HISTORY;
use crate::kernel::emotion::model::{DEFAULT_DECAY_RATE, DEFAULT_HISTORY_CAPACITY};
use crate::kernel::emotion::Emotion;
use crate::kernel::personality::PersonalityProfile;
use crate::kernel::telemetry::recorder::MAX_EVENTS;
use crate::kernel::time::TICK_MS;

pub const ENV_PERSONALITY: &str = "ATLAS_PERSONALITY";
pub const ENV_DECAY_RATE: &str = "ATLAS_DECAY_RATE";
pub const ENV_TICK_MS: &str = "ATLAS_TICK_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Either a preset name (`"playful"`) or an explicit trait map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonalityConfig {
    Preset(String),
    Traits(BTreeMap<String, f32>),
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        PersonalityConfig::Preset("friendly".to_string())
    }
}

impl PersonalityConfig {
    pub fn build(&self) -> PersonalityProfile {
        match self {
            PersonalityConfig::Preset(name) => PersonalityProfile::named(name),
            PersonalityConfig::Traits(traits) => {
                PersonalityProfile::from_traits(traits.iter().map(|(k, v)| (k.as_str(), *v)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub personality: PersonalityConfig,
    pub initial_state: BehaviorState,
    pub initial_emotion: Emotion,
    pub decay_rate: f32,
    pub emotion_history_capacity: usize,
    pub action_history_capacity: usize,
    pub telemetry_capacity: usize,
    pub tick_ms: u64,
    pub channel_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            personality: PersonalityConfig::default(),
            initial_state: BehaviorState::Idle,
            initial_emotion: Emotion::Neutral,
            decay_rate: DEFAULT_DECAY_RATE,
            emotion_history_capacity: DEFAULT_HISTORY_CAPACITY,
            action_history_capacity: DEFAULT_ACTION_HISTORY,
            telemetry_capacity: MAX_EVENTS,
            tick_ms: TICK_MS,
            channel_capacity: 100,
        }
    }
}

impl CoreConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Same as `apply_env` with an injectable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_PERSONALITY) {
            self.personality = PersonalityConfig::Preset(name);
        }
        if let Some(raw) = lookup(ENV_DECAY_RATE) {
            self.decay_rate = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_DECAY_RATE,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_TICK_MS) {
            self.tick_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TICK_MS,
                value: raw.clone(),
            })?;
        }
        *self = self.clone().normalized();
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.decay_rate = if self.decay_rate.is_nan() { DEFAULT_DECAY_RATE } else { self.decay_rate.clamp(0.0, 1.0) };
        self.tick_ms = self.tick_ms.max(1);
        self.channel_capacity = self.channel_capacity.max(1);
        self
    }
}
