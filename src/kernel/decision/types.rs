use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::kernel::behavior::BehaviorState;
use crate::kernel::emotion::Emotion;
use crate::kernel::priority::Priority;
use crate::kernel::time::Timestamp;

pub type Parameters = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Speak,
    Move,
    Gesture,
    LookAt,
    PlaySound,
    ControlDevice,
    Wait,
    AskClarification,
}

impl ActionType {
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::Speak => "speak",
            ActionType::Move => "move",
            ActionType::Gesture => "gesture",
            ActionType::LookAt => "look_at",
            ActionType::PlaySound => "play_sound",
            ActionType::ControlDevice => "control_device",
            ActionType::Wait => "wait",
            ActionType::AskClarification => "ask_clarification",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work handed to the external executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub action_type: ActionType,
    pub parameters: Parameters,
    pub priority: Priority,
    pub estimated_duration: f32, // seconds
    pub interruptible: bool,
    pub created_at: Timestamp,
}

impl Action {
    pub fn new(action_type: ActionType, priority: Priority) -> Self {
        Self {
            id: ActionId::new(),
            action_type,
            parameters: Parameters::new(),
            priority,
            estimated_duration: 1.0,
            interruptible: false,
            created_at: Timestamp::default(),
        }
    }

    pub fn speak(text: &str, priority: Priority) -> Self {
        Self::new(ActionType::Speak, priority).with_param("text", serde_json::Value::from(text))
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Negative or non-finite durations become zero.
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.estimated_duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    pub fn interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = at;
        self
    }

    /// Saturates instead of overflowing for very long estimates.
    pub fn expected_runtime(&self) -> Duration {
        let seconds = if self.estimated_duration.is_finite() { self.estimated_duration.max(0.0) } else { 0.0 };
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    }

    pub fn text(&self) -> Option<&str> {
        self.parameters.get("text").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Question,
    Command,
    Conversation,
    Farewell,
    Unknown,
}

impl FromStr for Intent {
    type Err = std::convert::Infallible;

    /// Unrecognised labels map to `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "greeting" => Intent::Greeting,
            "question" => Intent::Question,
            "command" => Intent::Command,
            "conversation" => Intent::Conversation,
            "farewell" => Intent::Farewell,
            _ => Intent::Unknown,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Read-only snapshot handed to `DecisionMaker::decide`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub current_state: BehaviorState,
    pub current_emotion: Emotion,
    pub user_intent: Option<Intent>,
    pub user_sentiment: Option<Sentiment>,
    pub entities: Option<Parameters>,
    pub environment: Option<Parameters>,
    pub history: Option<Vec<ActionType>>,
}

impl DecisionContext {
    pub fn new(current_state: BehaviorState, current_emotion: Emotion) -> Self {
        Self {
            current_state,
            current_emotion,
            user_intent: None,
            user_sentiment: None,
            entities: None,
            environment: None,
            history: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.user_intent = Some(intent);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.user_sentiment = Some(sentiment);
        self
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.entities.get_or_insert_with(Parameters::new).insert(key.into(), value);
        self
    }

    pub fn with_environment(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.environment.get_or_insert_with(Parameters::new).insert(key.into(), value);
        self
    }

    pub fn entity(&self, key: &str) -> Option<&serde_json::Value> {
        self.entities.as_ref().and_then(|e| e.get(key))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionInfo {
    pub decisions_made: u64,
    pub actions_completed: u64,
    pub rule_failures: u64,
    pub queue_size: usize,
    pub current_action: Option<ActionType>,
    pub estimated_time_remaining: f32,
    pub rules_count: usize,
}
