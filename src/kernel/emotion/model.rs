use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::*;
use crate::kernel::history::BoundedHistory;
use crate::kernel::time::Clock;

pub const DEFAULT_DECAY_RATE: f32 = 0.1;
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
const AROUSAL_FLOOR: f32 = 0.3;

/// Continuous valence/arousal state perturbed by triggers and decayed on every update.
///
/// Nothing runs in the background: the host calls `update` once per tick, and
/// every trigger application updates immediately.
#[derive(Debug)]
pub struct EmotionModel {
    current: EmotionState,
    triggers: Vec<EmotionTrigger>,
    history: BoundedHistory<EmotionState>,
    modifiers: EmotionModifiers,
    decay_rate: f32,
    clock: Arc<dyn Clock>,
}

impl EmotionModel {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(
            Emotion::Neutral,
            DEFAULT_DECAY_RATE,
            EmotionModifiers::default(),
            DEFAULT_HISTORY_CAPACITY,
            clock,
        )
    }

    pub fn with_settings(
        initial: Emotion,
        decay_rate: f32,
        modifiers: EmotionModifiers,
        history_capacity: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        info!("Emotion model initialised (emotion: {})", initial);
        Self {
            current: EmotionState::at_reference(initial, now),
            triggers: Vec::new(),
            history: BoundedHistory::new(history_capacity),
            modifiers: EmotionModifiers {
                sensitivity: clamp(modifiers.sensitivity, 0.0, 1.0),
                patience: clamp(modifiers.patience, 0.0, 1.0),
            },
            decay_rate: clamp(decay_rate, 0.0, 1.0),
            clock,
        }
    }

    pub fn apply_trigger(&mut self, kind: TriggerKind, valence_delta: f32, arousal_delta: f32, duration: f32) {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        debug!(
            "Applied trigger: {} (v:{:+.2}, a:{:+.2}, {:.1}s)",
            kind.name(),
            valence_delta,
            arousal_delta,
            duration
        );
        self.triggers.push(EmotionTrigger {
            kind,
            valence_delta,
            arousal_delta,
            duration,
            created_at: self.clock.now(),
        });
        self.update();
    }

    pub fn update(&mut self) {
        let now = self.clock.now();

        // 1. Expire
        self.triggers.retain(|t| t.is_active(now));

        // 2. Sum active impulses
        let (valence_sum, arousal_sum) = self
            .triggers
            .iter()
            .fold((0.0f32, 0.0f32), |(v, a), t| (v + t.valence_delta, a + t.arousal_delta));

        // 3. Personality gains
        let valence_delta = valence_sum * self.modifiers.sensitivity;
        let arousal_delta = arousal_sum * (1.0 - self.modifiers.patience);

        // 4-6. Integrate, decay toward neutral, clamp
        let mut valence = (self.current.valence + valence_delta) * (1.0 - self.decay_rate);
        let mut arousal = ((self.current.arousal + arousal_delta) * (1.0 - self.decay_rate)).max(AROUSAL_FLOOR);
        valence = clamp(valence, -1.0, 1.0);
        arousal = clamp(arousal, 0.0, 1.0);

        // 7-8. Label + intensity
        let emotion = Emotion::nearest(valence, arousal);
        let intensity = (valence.abs() + arousal) / 2.0;

        if emotion != self.current.emotion {
            info!(
                "Emotion: {} -> {} (v:{:.2}, a:{:.2})",
                self.current.emotion, emotion, valence, arousal
            );
        }

        self.current = EmotionState::new(emotion, intensity, valence, arousal, now);
        self.history.push(self.current);
    }

    pub fn trigger_positive_event(&mut self, intensity: f32) {
        let i = unit(intensity);
        self.apply_trigger(TriggerKind::PositiveEvent, 0.3 * i, 0.2 * i, 10.0);
    }

    pub fn trigger_negative_event(&mut self, intensity: f32) {
        let i = unit(intensity);
        self.apply_trigger(TriggerKind::NegativeEvent, -0.3 * i, 0.1 * i, 15.0);
    }

    pub fn trigger_surprise(&mut self, intensity: f32) {
        let i = unit(intensity);
        self.apply_trigger(TriggerKind::Surprise, 0.1, 0.5 * i, 5.0);
    }

    pub fn trigger_confusion(&mut self, intensity: f32) {
        let i = unit(intensity);
        self.apply_trigger(TriggerKind::Confusion, -0.2 * i, 0.3 * i, 8.0);
    }

    pub fn reset(&mut self) {
        self.current = EmotionState::at_reference(Emotion::Neutral, self.clock.now());
        self.triggers.clear();
        info!("Emotion model reset");
    }

    pub fn state(&self) -> &EmotionState {
        &self.current
    }

    pub fn current_emotion(&self) -> Emotion {
        self.current.emotion
    }

    pub fn intensity(&self) -> f32 {
        self.current.intensity
    }

    pub fn active_trigger_count(&self) -> usize {
        self.triggers.len()
    }

    pub fn active_triggers(&self) -> &[EmotionTrigger] {
        &self.triggers
    }

    pub fn modifiers(&self) -> EmotionModifiers {
        self.modifiers
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    /// Set one modifier by name (`sensitivity` or `patience`).
    pub fn set_modifier(&mut self, name: &str, value: f32) -> bool {
        let value = clamp(value, 0.0, 1.0);
        match name {
            "sensitivity" => self.modifiers.sensitivity = value,
            "patience" => self.modifiers.patience = value,
            _ => {
                warn!("Unknown emotion modifier '{}'", name);
                return false;
            }
        }
        info!("Emotion modifier '{}' = {:.2}", name, value);
        true
    }

    /// The most recent `count` states, oldest first.
    pub fn history(&self, count: usize) -> Vec<EmotionState> {
        self.history.recent(count).copied().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn description(&self) -> String {
        let level = match self.current.intensity {
            i if i < 0.3 => "mild",
            i if i < 0.7 => "moderate",
            _ => "strong",
        };
        format!("{} ({})", self.current.emotion, level)
    }

    pub fn info(&self) -> EmotionInfo {
        EmotionInfo {
            current_emotion: self.current.emotion,
            intensity: self.current.intensity,
            valence: self.current.valence,
            arousal: self.current.arousal,
            active_triggers: self.triggers.len(),
            modifiers: self.modifiers,
            description: self.description(),
        }
    }
}

fn unit(intensity: f32) -> f32 {
    clamp(intensity, 0.0, 1.0)
}
