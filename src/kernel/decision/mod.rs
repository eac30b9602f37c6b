pub mod maker;
mod policy;
pub mod rules;
pub mod types;

pub use maker::DecisionMaker;
pub use rules::{Evaluate, Rule, RuleCondition, RuleError, RuleEvaluation, RuleFailure};
pub use types::{Action, ActionId, ActionType, DecisionContext, DecisionInfo, Intent, Parameters, Sentiment};
