use std::fmt;
use std::sync::Arc;

use super::types::{ActionType, DecisionContext, Intent, Parameters, Sentiment};
use crate::kernel::behavior::BehaviorState;
use crate::kernel::emotion::Emotion;
use crate::kernel::priority::Priority;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("context has no environment to read '{0}' from")]
    MissingEnvironment(String),
    #[error("environment value '{0}' is not a boolean")]
    NotBoolean(String),
    #[error("predicate failed: {0}")]
    Predicate(String),
}

/// A condition over a decision context.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, ctx: &DecisionContext) -> Result<bool, RuleError>;
}

struct FnPredicate<F>(F);

impl<F> Evaluate for FnPredicate<F>
where
    F: Fn(&DecisionContext) -> Result<bool, RuleError> + Send + Sync,
{
    fn evaluate(&self, ctx: &DecisionContext) -> Result<bool, RuleError> {
        (self.0)(ctx)
    }
}

/// Inspectable rule condition. `Predicate` is the escape hatch for anything
/// the built-in descriptors cannot express.
#[derive(Clone)]
pub enum RuleCondition {
    EmotionIs(Emotion),
    StateIs(BehaviorState),
    IntentIs(Intent),
    SentimentIs(Sentiment),
    HasEntity(String),
    EnvironmentFlag(String),
    All(Vec<RuleCondition>),
    Any(Vec<RuleCondition>),
    Not(Box<RuleCondition>),
    Predicate(Arc<dyn Evaluate>),
}

impl RuleCondition {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&DecisionContext) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        RuleCondition::Predicate(Arc::new(FnPredicate(f)))
    }
}

impl fmt::Debug for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCondition::EmotionIs(e) => write!(f, "EmotionIs({:?})", e),
            RuleCondition::StateIs(s) => write!(f, "StateIs({:?})", s),
            RuleCondition::IntentIs(i) => write!(f, "IntentIs({:?})", i),
            RuleCondition::SentimentIs(s) => write!(f, "SentimentIs({:?})", s),
            RuleCondition::HasEntity(k) => write!(f, "HasEntity({:?})", k),
            RuleCondition::EnvironmentFlag(k) => write!(f, "EnvironmentFlag({:?})", k),
            RuleCondition::All(c) => f.debug_tuple("All").field(c).finish(),
            RuleCondition::Any(c) => f.debug_tuple("Any").field(c).finish(),
            RuleCondition::Not(c) => f.debug_tuple("Not").field(c).finish(),
            RuleCondition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Evaluate for RuleCondition {
    fn evaluate(&self, ctx: &DecisionContext) -> Result<bool, RuleError> {
        match self {
            RuleCondition::EmotionIs(e) => Ok(ctx.current_emotion == *e),
            RuleCondition::StateIs(s) => Ok(ctx.current_state == *s),
            RuleCondition::IntentIs(i) => Ok(ctx.user_intent == Some(*i)),
            RuleCondition::SentimentIs(s) => Ok(ctx.user_sentiment == Some(*s)),
            RuleCondition::HasEntity(key) => Ok(ctx.entity(key).is_some()),
            RuleCondition::EnvironmentFlag(key) => {
                let env = ctx
                    .environment
                    .as_ref()
                    .ok_or_else(|| RuleError::MissingEnvironment(key.clone()))?;
                match env.get(key) {
                    None => Ok(false),
                    Some(value) => value.as_bool().ok_or_else(|| RuleError::NotBoolean(key.clone())),
                }
            }
            RuleCondition::All(conditions) => {
                for c in conditions {
                    if !c.evaluate(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RuleCondition::Any(conditions) => {
                for c in conditions {
                    if c.evaluate(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RuleCondition::Not(c) => Ok(!c.evaluate(ctx)?),
            RuleCondition::Predicate(p) => p.evaluate(ctx),
        }
    }
}

/// Condition plus the action template emitted when it holds.
#[derive(Debug, Clone)]
pub struct Rule {
    pub condition: RuleCondition,
    pub action_type: ActionType,
    pub priority: Priority,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub index: usize,
    pub error: RuleError,
}

/// Outcome of walking the rule list once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEvaluation {
    pub matched: Option<usize>,
    pub failures: Vec<RuleFailure>,
}
