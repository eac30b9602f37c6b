use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::kernel::emotion::Emotion;
use crate::kernel::priority::Priority;
use crate::kernel::time::Timestamp;

/// What the robot is doing right now. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Idle,
    Listening,
    Processing,
    Thinking,
    Speaking,
    Moving,
    Interacting,
    Alert,
    Error,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 9] = [
        BehaviorState::Idle,
        BehaviorState::Listening,
        BehaviorState::Processing,
        BehaviorState::Thinking,
        BehaviorState::Speaking,
        BehaviorState::Moving,
        BehaviorState::Interacting,
        BehaviorState::Alert,
        BehaviorState::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Listening => "listening",
            BehaviorState::Processing => "processing",
            BehaviorState::Thinking => "thinking",
            BehaviorState::Speaking => "speaking",
            BehaviorState::Moving => "moving",
            BehaviorState::Interacting => "interacting",
            BehaviorState::Alert => "alert",
            BehaviorState::Error => "error",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            BehaviorState::Listening | BehaviorState::Processing | BehaviorState::Thinking | BehaviorState::Speaking
        )
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed set of event tags that perception and language collaborators post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SpeechDetected,
    SpeechEnd,
    Thinking,
    ResponseReady,
    SpeakingDone,
    Alert,
    Error,
    // Perception signals with no state of their own
    FaceDetected,
    MotionDetected,
    ObjectDetected,
    SoundDetected,
    IntentClassified,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::SpeechDetected,
        EventKind::SpeechEnd,
        EventKind::Thinking,
        EventKind::ResponseReady,
        EventKind::SpeakingDone,
        EventKind::Alert,
        EventKind::Error,
        EventKind::FaceDetected,
        EventKind::MotionDetected,
        EventKind::ObjectDetected,
        EventKind::SoundDetected,
        EventKind::IntentClassified,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::SpeechDetected => "speech_detected",
            EventKind::SpeechEnd => "speech_end",
            EventKind::Thinking => "thinking",
            EventKind::ResponseReady => "response_ready",
            EventKind::SpeakingDone => "speaking_done",
            EventKind::Alert => "alert",
            EventKind::Error => "error",
            EventKind::FaceDetected => "face_detected",
            EventKind::MotionDetected => "motion_detected",
            EventKind::ObjectDetected => "object_detected",
            EventKind::SoundDetected => "sound_detected",
            EventKind::IntentClassified => "intent_classified",
        }
    }

    /// Event-to-state table. `None` means the event is ignored by the machine.
    pub fn target_state(&self) -> Option<BehaviorState> {
        match self {
            EventKind::SpeechDetected => Some(BehaviorState::Listening),
            EventKind::SpeechEnd => Some(BehaviorState::Processing),
            EventKind::Thinking => Some(BehaviorState::Thinking),
            EventKind::ResponseReady => Some(BehaviorState::Speaking),
            EventKind::SpeakingDone => Some(BehaviorState::Idle),
            EventKind::Alert => Some(BehaviorState::Alert),
            EventKind::Error => Some(BehaviorState::Error),
            EventKind::FaceDetected
            | EventKind::MotionDetected
            | EventKind::ObjectDetected
            | EventKind::SoundDetected
            | EventKind::IntentClassified => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        EventKind::ALL
            .iter()
            .copied()
            .find(|k| k.tag() == tag)
            .ok_or_else(|| UnknownEventKind(tag.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub kind: EventKind,
    pub payload: BTreeMap<String, serde_json::Value>,
    pub priority: Priority,
    /// Stamped by the machine when posted.
    pub timestamp: Timestamp,
}

impl BehaviorEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            payload: BTreeMap::new(),
            priority: Priority::Medium,
            timestamp: Timestamp::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("already in state {0}")]
    Unchanged(BehaviorState),
    #[error("no registered transition {from} -> {to}")]
    NotRegistered { from: BehaviorState, to: BehaviorState },
    #[error("guard rejected transition {from} -> {to}")]
    GuardRejected { from: BehaviorState, to: BehaviorState },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackPhase {
    Exit,
    Effect,
    Enter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    pub phase: CallbackPhase,
    pub state: BehaviorState,
    pub error: CallbackError,
}

/// Result of a successful transition. Callback failures are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub from: BehaviorState,
    pub to: BehaviorState,
    pub failures: Vec<CallbackFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorInfo {
    pub current_state: BehaviorState,
    pub previous_state: Option<BehaviorState>,
    pub current_emotion: Emotion,
    pub emotion_intensity: f32,
    pub is_busy: bool,
    pub state_change_count: u64,
    pub event_queue_size: usize,
    pub transition_count: usize,
    pub time_in_current_state: f32,
}
