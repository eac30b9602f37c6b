use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::behavior::{BehaviorEvent, EventKind};
use crate::kernel::decision::{Action, ActionId, Intent, Parameters, Sentiment};
use crate::kernel::priority::Priority;

/// Everything collaborators may send into the reactor. Funnelled through a
/// single channel so the core only ever has one writer.
#[derive(Debug, Clone)]
pub enum Event {
    Behavior(BehaviorEvent),
    Trigger(TriggerRequest),
    /// Language understanding output for one user turn. Consumed by the next decision.
    Utterance(Utterance),
    /// Latest environment readings. Sticky until replaced.
    Environment(Parameters),
    Enqueue(Action),
    Interrupt(Action),
    ActionCompleted(ActionId),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerRequest {
    Positive { intensity: f32 },
    Negative { intensity: f32 },
    Surprise { intensity: f32 },
    Confusion { intensity: f32 },
    Custom { name: String, valence_delta: f32, arousal_delta: f32, duration: f32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub intent: Option<Intent>,
    pub sentiment: Option<Sentiment>,
    pub entities: Parameters,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("missing argument for '{0}'")]
    MissingArgument(&'static str),
}

impl Event {
    /// Parse a console line into an event.
    ///
    /// ```text
    /// speech_detected [priority]
    /// intent command device=lamp action=on
    /// sentiment negative
    /// trigger positive 0.8
    /// reset
    /// ```
    pub fn parse_command(line: &str) -> Result<Event, ParseError> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseError::Empty)?;

        match head {
            "reset" => Ok(Event::Reset),
            "intent" => {
                let name = words.next().ok_or(ParseError::MissingArgument("intent"))?;
                let intent = name.parse::<Intent>().unwrap_or(Intent::Unknown);
                let entities = words
                    .filter_map(|kv| kv.split_once('='))
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect();
                Ok(Event::Utterance(Utterance {
                    intent: Some(intent),
                    sentiment: None,
                    entities,
                }))
            }
            "sentiment" => {
                let sentiment = match words.next().ok_or(ParseError::MissingArgument("sentiment"))? {
                    "positive" => Sentiment::Positive,
                    "negative" => Sentiment::Negative,
                    "neutral" => Sentiment::Neutral,
                    other => return Err(ParseError::UnknownCommand(other.to_string())),
                };
                Ok(Event::Utterance(Utterance {
                    intent: None,
                    sentiment: Some(sentiment),
                    entities: Parameters::new(),
                }))
            }
            "trigger" => {
                let kind = words.next().ok_or(ParseError::MissingArgument("trigger"))?;
                let intensity = match words.next() {
                    Some(raw) => raw.parse::<f32>().map_err(|_| ParseError::InvalidNumber(raw.to_string()))?,
                    None => 0.5,
                };
                let request = match kind {
                    "positive" => TriggerRequest::Positive { intensity },
                    "negative" => TriggerRequest::Negative { intensity },
                    "surprise" => TriggerRequest::Surprise { intensity },
                    "confusion" => TriggerRequest::Confusion { intensity },
                    other => return Err(ParseError::UnknownCommand(other.to_string())),
                };
                Ok(Event::Trigger(request))
            }
            tag => {
                let kind = tag
                    .parse::<EventKind>()
                    .map_err(|_| ParseError::UnknownCommand(tag.to_string()))?;
                let mut event = BehaviorEvent::new(kind);
                if let Some(raw) = words.next() {
                    let value = raw.parse::<u8>().map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;
                    event = event.with_priority(Priority::from_value(value));
                }
                Ok(Event::Behavior(event))
            }
        }
    }
}
