use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use atlas::kernel::behavior::BehaviorState;
use atlas::kernel::decision::{
    Action, ActionType, DecisionContext, DecisionMaker, Intent, RuleCondition, RuleError, Sentiment,
};
use atlas::kernel::emotion::Emotion;
use atlas::kernel::personality::{PersonalityProfile, Preset};
use atlas::kernel::priority::Priority;
use atlas::kernel::time::ManualClock;

fn maker() -> DecisionMaker {
    DecisionMaker::new(Arc::new(ManualClock::new()))
}

fn neutral_ctx() -> DecisionContext {
    DecisionContext::new(BehaviorState::Idle, Emotion::Neutral)
}

#[test]
fn test_higher_priority_dispatched_first() {
    let mut dm = maker();
    let low = Action::new(ActionType::Gesture, Priority::Low);
    let high = Action::new(ActionType::Speak, Priority::High);
    let high_id = high.id;

    dm.queue_action(low);
    dm.queue_action(high);

    let next = dm.get_next_action().unwrap();
    assert_eq!(next.id, high_id);
    assert_eq!(dm.current_action().map(|a| a.id), Some(high_id));
    assert_eq!(dm.queue_len(), 1);
}

#[test]
fn test_equal_priority_is_fifo() {
    let mut dm = maker();
    let first = Action::new(ActionType::Speak, Priority::Medium);
    let second = Action::new(ActionType::Move, Priority::Medium);
    let (first_id, second_id) = (first.id, second.id);

    dm.queue_action(first);
    dm.queue_action(Action::new(ActionType::Wait, Priority::Low));
    dm.queue_action(second);

    let order: Vec<_> = dm.queued_actions().map(|a| a.id).collect();
    assert_eq!(order[0], first_id);
    assert_eq!(order[1], second_id);
}

#[test]
fn test_higher_priority_interrupts_non_interruptible() {
    let mut dm = maker();
    let low = Action::new(ActionType::Gesture, Priority::Low).interruptible(false);
    let low_id = low.id;
    dm.queue_action(low);
    dm.get_next_action();

    let urgent = Action::new(ActionType::Speak, Priority::High);
    let urgent_id = urgent.id;
    assert!(dm.can_interrupt_current(&urgent), "1 < 3 regardless of the interruptible flag");
    assert!(dm.interrupt_current_action(urgent));

    assert_eq!(dm.current_action().map(|a| a.id), Some(urgent_id));
    assert_eq!(dm.queued_actions().next().map(|a| a.id), Some(low_id), "displaced action requeued at the front");
}

#[test]
fn test_displaced_action_goes_to_front_of_its_band() {
    let mut dm = maker();
    let running = Action::new(ActionType::Move, Priority::Low);
    let running_id = running.id;
    dm.queue_action(running);
    dm.get_next_action();

    let queued_high = Action::new(ActionType::Speak, Priority::High);
    let queued_low = Action::new(ActionType::Wait, Priority::Low);
    let (high_id, low_id) = (queued_high.id, queued_low.id);
    dm.queue_action(queued_high);
    dm.queue_action(queued_low);

    assert!(dm.interrupt_current_action(Action::new(ActionType::Speak, Priority::Critical)));

    let order: Vec<_> = dm.queued_actions().map(|a| a.id).collect();
    assert_eq!(order, vec![high_id, running_id, low_id]);
}

#[test]
fn test_interrupt_rejected() {
    let mut dm = maker();
    let running = Action::new(ActionType::Speak, Priority::High);
    let running_id = running.id;
    dm.queue_action(running);
    dm.get_next_action();

    let same = Action::new(ActionType::Speak, Priority::High);
    assert!(!dm.can_interrupt_current(&same));
    assert!(!dm.interrupt_current_action(same));
    assert_eq!(dm.current_action().map(|a| a.id), Some(running_id));
    assert_eq!(dm.queue_len(), 0);
}

#[test]
fn test_interruptible_current_yields_to_equal_priority() {
    let mut dm = maker();
    dm.queue_action(Action::new(ActionType::Gesture, Priority::Medium).interruptible(true));
    dm.get_next_action();

    let other = Action::new(ActionType::LookAt, Priority::Medium);
    assert!(dm.can_interrupt_current(&other));
}

#[test]
fn test_interrupt_with_nothing_running() {
    let mut dm = maker();
    assert!(dm.interrupt_current_action(Action::new(ActionType::Wait, Priority::Low)));
    assert_eq!(dm.queue_len(), 0);
    assert!(dm.current_action().is_some());
}

#[test]
fn test_emotion_rules() {
    let mut dm = maker();

    let confused = DecisionContext::new(BehaviorState::Idle, Emotion::Confused);
    let action = dm.decide(&confused).unwrap();
    assert_eq!(action.action_type, ActionType::AskClarification);
    assert_eq!(action.priority, Priority::High);

    let happy = DecisionContext::new(BehaviorState::Idle, Emotion::Happy);
    let action = dm.decide(&happy).unwrap();
    assert_eq!(action.action_type, ActionType::Gesture);
    assert_eq!(action.priority, Priority::Low);
}

#[test]
fn test_rules_win_over_intent() {
    let mut dm = maker();
    let ctx = DecisionContext::new(BehaviorState::Listening, Emotion::Confused).with_intent(Intent::Greeting);
    assert_eq!(dm.decide(&ctx).unwrap().action_type, ActionType::AskClarification);
}

#[test]
fn test_first_matching_rule_wins() {
    let mut dm = DecisionMaker::without_rules(10, Arc::new(ManualClock::new()));
    dm.add_rule(RuleCondition::StateIs(BehaviorState::Idle), ActionType::Wait, Priority::Low, None);
    dm.add_rule(RuleCondition::EmotionIs(Emotion::Neutral), ActionType::Move, Priority::High, None);

    assert_eq!(dm.decide(&neutral_ctx()).unwrap().action_type, ActionType::Wait);
}

#[test]
fn test_intent_fallbacks() {
    let mut dm = maker();

    let greet = dm.decide(&neutral_ctx().with_intent(Intent::Greeting)).unwrap();
    assert_eq!(greet.action_type, ActionType::Speak);
    assert_eq!(greet.text(), Some("Xin chào!"));
    assert_eq!(greet.priority, Priority::High);

    let question = dm.decide(&neutral_ctx().with_intent(Intent::Question)).unwrap();
    assert_eq!(question.text(), Some("Để tôi suy nghĩ..."));
    assert_eq!(question.priority, Priority::High);

    let farewell = dm.decide(&neutral_ctx().with_intent(Intent::Farewell)).unwrap();
    assert_eq!(farewell.text(), Some("Tạm biệt!"));
    assert_eq!(farewell.priority, Priority::Medium);

    let chat = dm.decide(&neutral_ctx().with_intent(Intent::Conversation)).unwrap();
    assert_eq!(chat.text(), Some("Tôi hiểu rồi."));
    assert_eq!(chat.priority, Priority::Low);

    assert_eq!(dm.decisions_made(), 4);
}

#[test]
fn test_command_controls_device() {
    let mut dm = maker();

    let ctx = neutral_ctx().with_intent(Intent::Command).with_entity("device", json!("lamp"));
    let action = dm.decide(&ctx).unwrap();
    assert_eq!(action.action_type, ActionType::ControlDevice);
    assert_eq!(action.priority, Priority::High);
    assert_eq!(action.parameters["device"], json!("lamp"));
    assert_eq!(action.parameters["action"], json!("toggle"));

    let ctx = neutral_ctx()
        .with_intent(Intent::Command)
        .with_entity("device", json!("fan"))
        .with_entity("action", json!("on"));
    assert_eq!(dm.decide(&ctx).unwrap().parameters["action"], json!("on"));
}

#[test]
fn test_command_without_device_falls_back() {
    let mut dm = maker();
    let action = dm.decide(&neutral_ctx().with_intent(Intent::Command)).unwrap();
    assert_eq!(action.action_type, ActionType::Speak);
    assert_eq!(action.text(), Some("Tôi hiểu rồi."));
}

#[test]
fn test_no_rule_no_intent_yields_nothing() {
    let mut dm = maker();
    assert!(dm.decide(&neutral_ctx()).is_none());
    assert_eq!(dm.decisions_made(), 1);
}

#[test]
fn test_failing_rule_is_skipped() {
    let mut dm = DecisionMaker::without_rules(10, Arc::new(ManualClock::new()));
    dm.add_rule(
        RuleCondition::predicate(|_| Err(RuleError::Predicate("sensor offline".into()))),
        ActionType::Move,
        Priority::Critical,
        None,
    );
    dm.add_rule(RuleCondition::EmotionIs(Emotion::Neutral), ActionType::Wait, Priority::Low, None);

    let evaluation = dm.evaluate_rules(&neutral_ctx());
    assert_eq!(evaluation.matched, Some(1));
    assert_eq!(evaluation.failures.len(), 1);
    assert_eq!(evaluation.failures[0].index, 0);

    let action = dm.decide(&neutral_ctx()).unwrap();
    assert_eq!(action.action_type, ActionType::Wait);
    assert_eq!(dm.rule_failures(), 1);
}

#[test]
fn test_environment_flag() {
    let mut dm = DecisionMaker::without_rules(10, Arc::new(ManualClock::new()));
    dm.add_rule(RuleCondition::EnvironmentFlag("dark".into()), ActionType::ControlDevice, Priority::Medium, None);

    // No environment at all is a rule failure, not a match
    assert!(dm.decide(&neutral_ctx()).is_none());
    assert_eq!(dm.rule_failures(), 1);

    assert!(dm.decide(&neutral_ctx().with_environment("noisy", json!(true))).is_none());
    assert_eq!(dm.rule_failures(), 1, "missing key is a plain miss");

    let lit = dm.decide(&neutral_ctx().with_environment("dark", json!(true))).unwrap();
    assert_eq!(lit.action_type, ActionType::ControlDevice);

    let evaluation = dm.evaluate_rules(&neutral_ctx().with_environment("dark", json!("yes")));
    assert_eq!(evaluation.failures[0].error, RuleError::NotBoolean("dark".into()));
}

#[test]
fn test_composite_conditions() {
    let mut dm = DecisionMaker::without_rules(10, Arc::new(ManualClock::new()));
    dm.add_rule(
        RuleCondition::All(vec![
            RuleCondition::SentimentIs(Sentiment::Negative),
            RuleCondition::Not(Box::new(RuleCondition::StateIs(BehaviorState::Speaking))),
            RuleCondition::Any(vec![RuleCondition::HasEntity("name".into()), RuleCondition::EmotionIs(Emotion::Sad)]),
        ]),
        ActionType::Speak,
        Priority::Medium,
        None,
    );

    let ctx = neutral_ctx().with_sentiment(Sentiment::Negative).with_entity("name", json!("An"));
    assert!(dm.decide(&ctx).is_some());

    let speaking = DecisionContext::new(BehaviorState::Speaking, Emotion::Sad).with_sentiment(Sentiment::Negative);
    assert!(dm.decide(&speaking).is_none());

    assert!(dm.decide(&neutral_ctx().with_sentiment(Sentiment::Negative)).is_none());
}

#[test]
fn test_rule_parameters_are_copied() {
    let mut dm = DecisionMaker::without_rules(10, Arc::new(ManualClock::new()));
    let mut params = atlas::kernel::decision::Parameters::new();
    params.insert("sound".into(), json!("chime"));
    dm.add_rule(RuleCondition::StateIs(BehaviorState::Alert), ActionType::PlaySound, Priority::Critical, Some(params));

    let ctx = DecisionContext::new(BehaviorState::Alert, Emotion::Afraid);
    let first = dm.decide(&ctx).unwrap();
    let second = dm.decide(&ctx).unwrap();
    assert_eq!(first.parameters["sound"], json!("chime"));
    assert_ne!(first.id, second.id);
}

#[test]
fn test_decided_actions_are_timestamped() {
    let clock = Arc::new(ManualClock::new());
    let mut dm = DecisionMaker::new(clock.clone());
    clock.advance(Duration::from_millis(1500));

    let action = dm.decide(&neutral_ctx().with_intent(Intent::Greeting)).unwrap();
    assert_eq!(action.created_at.millis, 1500);
}

#[test]
fn test_estimate_total_time() {
    let mut dm = maker();
    assert_eq!(dm.estimate_total_time(), 0.0);

    dm.queue_action(Action::new(ActionType::Speak, Priority::High).with_duration(2.0));
    dm.get_next_action();
    dm.queue_action(Action::new(ActionType::Wait, Priority::Low));
    dm.queue_action(Action::new(ActionType::Move, Priority::Low).with_duration(0.5));

    assert!((dm.estimate_total_time() - 3.5).abs() < 1e-6);
}

#[test]
fn test_expected_runtime_saturates() {
    let short = Action::new(ActionType::Speak, Priority::High).with_duration(1.5);
    assert_eq!(short.expected_runtime(), Duration::from_millis(1500));

    let huge = Action::new(ActionType::Move, Priority::Low).with_duration(1e30);
    assert_eq!(huge.expected_runtime(), Duration::MAX);

    let mut odd = Action::new(ActionType::Wait, Priority::Low);
    odd.estimated_duration = f32::NAN;
    assert_eq!(odd.expected_runtime(), Duration::ZERO);
}

#[test]
fn test_complete_current_action() {
    let mut dm = maker();
    assert!(dm.complete_current_action().is_none());

    dm.queue_action(Action::new(ActionType::Speak, Priority::High));
    dm.queue_action(Action::new(ActionType::Gesture, Priority::Low));
    dm.get_next_action();

    let done = dm.complete_current_action().unwrap();
    assert_eq!(done.action_type, ActionType::Speak);
    assert!(dm.current_action().is_none());
    assert_eq!(dm.actions_completed(), 1);
    assert!(dm.has_pending_actions());

    dm.get_next_action();
    dm.complete_current_action();
    assert_eq!(dm.recent_actions(10), vec![ActionType::Speak, ActionType::Gesture]);
    assert_eq!(dm.recent_actions(1), vec![ActionType::Gesture]);
}

#[test]
fn test_action_history_is_bounded() {
    let mut dm = DecisionMaker::with_history(2, Arc::new(ManualClock::new()));
    for action_type in [ActionType::Speak, ActionType::Move, ActionType::Wait] {
        dm.queue_action(Action::new(action_type, Priority::Medium));
        dm.get_next_action();
        dm.complete_current_action();
    }
    assert_eq!(dm.recent_actions(10), vec![ActionType::Move, ActionType::Wait]);
    assert_eq!(dm.actions_completed(), 3);
}

#[test]
fn test_clear_queue_keeps_current() {
    let mut dm = maker();
    dm.queue_action(Action::new(ActionType::Speak, Priority::High));
    dm.queue_action(Action::new(ActionType::Wait, Priority::Low));
    dm.get_next_action();

    dm.clear_queue();
    assert!(!dm.has_pending_actions());
    assert!(dm.current_action().is_some());
}

#[test]
fn test_info_snapshot() {
    let mut dm = maker();
    dm.queue_action(Action::new(ActionType::Speak, Priority::High));
    dm.get_next_action();
    dm.queue_action(Action::new(ActionType::Wait, Priority::Low));

    let info = dm.info();
    assert_eq!(info.rules_count, 2);
    assert_eq!(info.queue_size, 1);
    assert_eq!(info.current_action, Some(ActionType::Speak));
    assert!((info.estimated_time_remaining - 2.0).abs() < 1e-6);
}

#[test]
fn test_personality_rules_use_profile_wording() {
    let mut dm = maker();
    dm.install_personality_rules(&PersonalityProfile::from_preset(Preset::Friendly));
    assert_eq!(dm.rules().len(), 6);

    let greet = dm.decide(&neutral_ctx().with_intent(Intent::Greeting)).unwrap();
    assert_eq!(greet.text(), Some("Xin chào! Rất vui được gặp bạn!"));

    let unknown = dm.decide(&neutral_ctx().with_intent(Intent::Unknown)).unwrap();
    assert_eq!(unknown.action_type, ActionType::AskClarification);

    let sad_user = dm.decide(&neutral_ctx().with_sentiment(Sentiment::Negative)).unwrap();
    assert_eq!(sad_user.text(), Some("Tôi hiểu cảm giác của bạn. Có điều gì tôi có thể giúp không?"));
}

#[test]
fn test_impatient_personality_does_not_ask() {
    let mut dm = maker();
    dm.install_personality_rules(&PersonalityProfile::from_preset(Preset::Playful));

    let unknown = dm.decide(&neutral_ctx().with_intent(Intent::Unknown)).unwrap();
    assert_eq!(unknown.action_type, ActionType::Speak);
    assert_eq!(unknown.text(), Some("Không hiểu. Nói lại."));
}
