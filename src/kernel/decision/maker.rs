use std::collections::VecDeque;
use std::sync::Arc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::rules::*;
use super::types::*;
use crate::kernel::emotion::Emotion;
use crate::kernel::history::BoundedHistory;
use crate::kernel::priority::Priority;
use crate::kernel::time::Clock;

pub const DEFAULT_ACTION_HISTORY: usize = 50;

/// Rule-driven action selection plus the bookkeeping for a single executor:
/// a priority queue (FIFO among equals) and at most one current action.
///
/// Execution itself is external. The executor pulls with `get_next_action` and
/// reports back through `complete_current_action` or `interrupt_current_action`.
#[derive(Debug)]
pub struct DecisionMaker {
    rules: Vec<Rule>,
    queue: VecDeque<Action>,
    current: Option<Action>,
    history: BoundedHistory<Action>,

    decisions_made: u64,
    actions_completed: u64,
    rule_failures: u64,
    clock: Arc<dyn Clock>,
}

impl DecisionMaker {
    /// Maker with the stock emotion rules installed.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_history(DEFAULT_ACTION_HISTORY, clock)
    }

    pub fn with_history(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let mut maker = Self::without_rules(capacity, clock);
        maker.add_rule(RuleCondition::EmotionIs(Emotion::Confused), ActionType::AskClarification, Priority::High, None);
        maker.add_rule(RuleCondition::EmotionIs(Emotion::Happy), ActionType::Gesture, Priority::Low, None);
        info!("Decision maker initialised ({} rules)", maker.rules.len());
        maker
    }

    pub fn without_rules(history_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: Vec::new(),
            queue: VecDeque::new(),
            current: None,
            history: BoundedHistory::new(history_capacity),
            decisions_made: 0,
            actions_completed: 0,
            rule_failures: 0,
            clock,
        }
    }

    pub fn add_rule(
        &mut self,
        condition: RuleCondition,
        action_type: ActionType,
        priority: Priority,
        parameters: Option<Parameters>,
    ) {
        self.rules.push(Rule {
            condition,
            action_type,
            priority,
            parameters: parameters.unwrap_or_default(),
        });
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Walk rules in registration order. A failing condition counts as a miss.
    pub fn evaluate_rules(&self, ctx: &DecisionContext) -> RuleEvaluation {
        let mut evaluation = RuleEvaluation::default();
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.condition.evaluate(ctx) {
                Ok(true) => {
                    evaluation.matched = Some(index);
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Rule {} failed: {}", index, e);
                    evaluation.failures.push(RuleFailure { index, error: e });
                }
            }
        }
        evaluation
    }

    pub fn decide(&mut self, ctx: &DecisionContext) -> Option<Action> {
        self.decisions_made += 1;

        let evaluation = self.evaluate_rules(ctx);
        self.rule_failures += evaluation.failures.len() as u64;

        if let Some(index) = evaluation.matched {
            let rule = &self.rules[index];
            let action = Action::new(rule.action_type, rule.priority)
                .with_parameters(rule.parameters.clone())
                .created_at(self.clock.now());
            debug!("Rule {} matched: {}", index, action.action_type);
            return Some(action);
        }

        let intent = ctx.user_intent?;
        Some(self.decide_from_intent(intent, ctx).created_at(self.clock.now()))
    }

    fn decide_from_intent(&self, intent: Intent, ctx: &DecisionContext) -> Action {
        match intent {
            Intent::Greeting => Action::speak("Xin chào!", Priority::High),
            Intent::Question => Action::speak("Để tôi suy nghĩ...", Priority::High),
            Intent::Command => match ctx.entity("device") {
                Some(device) => {
                    let command = ctx
                        .entity("action")
                        .cloned()
                        .unwrap_or_else(|| Value::from("toggle"));
                    Action::new(ActionType::ControlDevice, Priority::High)
                        .with_param("device", device.clone())
                        .with_param("action", command)
                }
                None => {
                    debug!("Command intent without a device entity");
                    fallback_action()
                }
            },
            Intent::Farewell => Action::speak("Tạm biệt!", Priority::Medium),
            Intent::Conversation | Intent::Unknown => fallback_action(),
        }
    }

    pub fn queue_action(&mut self, action: Action) {
        info!("Queued action: {} (priority {})", action.action_type, action.priority.value());
        let pos = self.queue.partition_point(|queued| queued.priority <= action.priority);
        self.queue.insert(pos, action);
    }

    pub fn get_next_action(&mut self) -> Option<Action> {
        let action = self.queue.pop_front()?;
        if let Some(unfinished) = self.current.take() {
            warn!("Replacing unfinished action: {}", unfinished.action_type);
        }
        info!("Executing action: {} ({})", action.action_type, action.id);
        self.current = Some(action.clone());
        Some(action)
    }

    pub fn complete_current_action(&mut self) -> Option<Action> {
        let action = self.current.take()?;
        self.actions_completed += 1;
        debug!("Action completed: {}", action.action_type);
        self.history.push(action.clone());
        Some(action)
    }

    pub fn can_interrupt_current(&self, new_action: &Action) -> bool {
        match &self.current {
            None => true,
            Some(current) => new_action.priority < current.priority || current.interruptible,
        }
    }

    pub fn interrupt_current_action(&mut self, new_action: Action) -> bool {
        if !self.can_interrupt_current(&new_action) {
            warn!("Cannot interrupt current action");
            return false;
        }

        if let Some(displaced) = self.current.take() {
            info!("Interrupted: {}", displaced.action_type);
            // Front of its own priority band keeps the queue sorted.
            let pos = self.queue.partition_point(|queued| queued.priority < displaced.priority);
            self.queue.insert(pos, displaced);
        }

        info!("Executing (interrupt): {}", new_action.action_type);
        self.current = Some(new_action);
        true
    }

    pub fn estimate_total_time(&self) -> f32 {
        let queued: f32 = self.queue.iter().map(|a| a.estimated_duration).sum();
        queued + self.current.as_ref().map_or(0.0, |a| a.estimated_duration)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        info!("Action queue cleared");
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_actions(&self) -> impl Iterator<Item = &Action> {
        self.queue.iter()
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.current.as_ref()
    }

    /// Types of the last `count` completed actions, oldest first.
    pub fn recent_actions(&self, count: usize) -> Vec<ActionType> {
        self.history.recent(count).map(|a| a.action_type).collect()
    }

    pub fn decisions_made(&self) -> u64 {
        self.decisions_made
    }

    pub fn actions_completed(&self) -> u64 {
        self.actions_completed
    }

    pub fn rule_failures(&self) -> u64 {
        self.rule_failures
    }

    pub fn info(&self) -> DecisionInfo {
        DecisionInfo {
            decisions_made: self.decisions_made,
            actions_completed: self.actions_completed,
            rule_failures: self.rule_failures,
            queue_size: self.queue.len(),
            current_action: self.current.as_ref().map(|a| a.action_type),
            estimated_time_remaining: self.estimate_total_time(),
            rules_count: self.rules.len(),
        }
    }
}

fn fallback_action() -> Action {
    Action::speak("Tôi hiểu rồi.", Priority::Low)
}
