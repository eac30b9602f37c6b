use serde_json::Value;
use tracing::debug;

use super::maker::DecisionMaker;
use super::rules::RuleCondition;
use super::types::{ActionType, Intent, Parameters, Sentiment};
use crate::kernel::emotion::Emotion;
use crate::kernel::personality::PersonalityProfile;
use crate::kernel::priority::Priority;

fn text(phrase: &str) -> Option<Parameters> {
    let mut params = Parameters::new();
    params.insert("text".to_string(), Value::from(phrase));
    Some(params)
}

impl DecisionMaker {
    /// Append rules whose wording and thresholds come from `profile`.
    ///
    /// Registered after the stock rules, so stock emotion rules still win.
    pub fn install_personality_rules(&mut self, profile: &PersonalityProfile) {
        let before = self.rules().len();

        // Impatient profiles apologise instead of asking.
        if profile.should_ask_clarification(1.0) {
            self.add_rule(
                RuleCondition::IntentIs(Intent::Unknown),
                ActionType::AskClarification,
                Priority::High,
                text(profile.get_error_handling_style()),
            );
        } else {
            self.add_rule(
                RuleCondition::IntentIs(Intent::Unknown),
                ActionType::Speak,
                Priority::Medium,
                text(profile.get_error_handling_style()),
            );
        }

        self.add_rule(
            RuleCondition::IntentIs(Intent::Greeting),
            ActionType::Speak,
            Priority::High,
            text(profile.get_greeting_style()),
        );

        if let Some(phrase) = profile.get_empathy_response(Emotion::Sad.name()) {
            self.add_rule(
                RuleCondition::SentimentIs(Sentiment::Negative),
                ActionType::Speak,
                Priority::Medium,
                text(phrase),
            );
        }

        if profile.should_show_emotion() {
            let mut params = Parameters::new();
            params.insert("emotion".to_string(), Value::from(Emotion::Excited.name()));
            self.add_rule(
                RuleCondition::EmotionIs(Emotion::Excited),
                ActionType::Gesture,
                Priority::Low,
                Some(params),
            );
        }

        debug!("Installed {} personality rules", self.rules().len() - before);
    }
}
