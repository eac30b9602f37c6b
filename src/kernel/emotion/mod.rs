pub mod model;
pub mod types;

pub use model::EmotionModel;
pub use types::{Emotion, EmotionInfo, EmotionModifiers, EmotionState, EmotionTrigger, TriggerKind};
