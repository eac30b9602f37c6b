use std::sync::Arc;
use std::time::Duration;

use atlas::kernel::emotion::types::REFERENCE_POINTS;
use atlas::kernel::emotion::{Emotion, EmotionModel, EmotionModifiers, TriggerKind};
use atlas::kernel::personality::{PersonalityProfile, Preset};
use atlas::kernel::time::ManualClock;

fn model() -> (Arc<ManualClock>, EmotionModel) {
    let clock = Arc::new(ManualClock::new());
    let model = EmotionModel::new(clock.clone());
    (clock, model)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn test_starts_neutral() {
    let (_clock, model) = model();
    let state = model.state();

    assert_eq!(state.emotion, Emotion::Neutral);
    assert!(approx(state.valence, 0.0));
    assert!(approx(state.arousal, 0.3));
    assert!(approx(state.intensity, 0.5));
    assert_eq!(model.description(), "neutral (moderate)");
}

#[test]
fn test_positive_trigger_moves_toward_positive() {
    let (_clock, mut model) = model();

    model.trigger_positive_event(1.0);
    // dv = 0.3 * 0.5, da = 0.2 * (1 - 0.6), then 10% decay
    assert!(approx(model.state().valence, 0.135));
    assert!(approx(model.state().arousal, 0.342));
    assert_eq!(model.active_trigger_count(), 1);

    let mut last_valence = model.state().valence;
    for _ in 0..100 {
        model.update();
        let state = model.state();
        assert!(state.valence >= last_valence - 1e-6, "valence must not drop while the trigger is active");
        assert!(state.valence <= 1.0);
        assert!(state.arousal <= 1.0);
        last_valence = state.valence;
    }

    assert!(approx(model.state().valence, 1.0), "saturates at the clamp");
    assert!((model.state().arousal - 0.72).abs() < 1e-2);
    assert_eq!(model.current_emotion(), Emotion::Happy);
}

#[test]
fn test_trigger_expires_at_duration() {
    let (clock, mut model) = model();
    model.trigger_positive_event(1.0);

    clock.advance(Duration::from_millis(9_999));
    model.update();
    assert_eq!(model.active_trigger_count(), 1);

    clock.advance(Duration::from_millis(1));
    model.update();
    assert_eq!(model.active_trigger_count(), 0, "inactive once elapsed == duration");
}

#[test]
fn test_decay_returns_to_neutral() {
    let (clock, mut model) = model();
    model.trigger_negative_event(1.0);
    assert_eq!(model.active_trigger_count(), 1);

    clock.advance(Duration::from_secs(20));
    for _ in 0..200 {
        model.update();
    }

    let state = model.state();
    assert!(state.valence.abs() < 1e-3);
    assert!(approx(state.arousal, 0.3), "arousal rests on its floor");
    assert_eq!(model.current_emotion(), Emotion::Neutral);
}

#[test]
fn test_arousal_floor_without_triggers() {
    let (_clock, mut model) = model();
    for _ in 0..10 {
        model.update();
        assert!(model.state().arousal >= 0.3);
    }
    assert!(approx(model.state().arousal, 0.3));
}

#[test]
fn test_extreme_triggers_stay_clamped() {
    let (_clock, mut model) = model();
    model.apply_trigger(TriggerKind::Custom("shock".into()), -5.0, 5.0, 60.0);

    for _ in 0..20 {
        model.update();
        let state = model.state();
        assert!((-1.0..=1.0).contains(&state.valence));
        assert!((0.0..=1.0).contains(&state.arousal));
        assert!((0.0..=1.0).contains(&state.intensity));
    }
    assert_eq!(model.active_triggers()[0].kind.name(), "shock");
}

#[test]
fn test_reference_points_map_to_themselves() {
    for (emotion, valence, arousal) in REFERENCE_POINTS {
        assert_eq!(Emotion::nearest(valence, arousal), emotion);
    }
}

#[test]
fn test_tie_prefers_earlier_table_entry() {
    // Equidistant from Neutral (0.0, 0.3) and Sad (-0.7, 0.3), nothing closer
    assert_eq!(Emotion::nearest(-0.35, 0.0), Emotion::Neutral);
}

#[test]
fn test_history_is_bounded_and_ordered() {
    let clock = Arc::new(ManualClock::new());
    let mut model = EmotionModel::with_settings(Emotion::Neutral, 0.1, EmotionModifiers::default(), 3, clock.clone());

    for _ in 0..5 {
        clock.advance(Duration::from_millis(100));
        model.update();
    }

    assert_eq!(model.history_len(), 3);
    let all = model.history(10);
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(all[2].timestamp.millis, 500);

    let last_two = model.history(2);
    assert_eq!(last_two[0].timestamp.millis, 400);
}

#[test]
fn test_reset_clears_triggers() {
    let (_clock, mut model) = model();
    model.trigger_surprise(1.0);
    model.trigger_confusion(1.0);
    assert_eq!(model.active_trigger_count(), 2);

    model.reset();
    assert_eq!(model.current_emotion(), Emotion::Neutral);
    assert_eq!(model.active_trigger_count(), 0);
    assert!(approx(model.intensity(), 0.5));
    assert!(approx(model.state().valence, 0.0));
}

#[test]
fn test_modifiers() {
    let (_clock, mut model) = model();
    assert_eq!(model.modifiers(), EmotionModifiers::default());

    assert!(model.set_modifier("sensitivity", 2.0));
    assert_eq!(model.modifiers().sensitivity, 1.0);
    assert!(!model.set_modifier("courage", 0.5));

    let from_friendly = EmotionModifiers::from_personality(&PersonalityProfile::from_preset(Preset::Friendly));
    assert!(approx(from_friendly.sensitivity, 0.3));
    assert!(approx(from_friendly.patience, 0.7));
}

#[test]
fn test_zero_sensitivity_ignores_valence() {
    let clock = Arc::new(ManualClock::new());
    let modifiers = EmotionModifiers { sensitivity: 0.0, patience: 0.6 };
    let mut model = EmotionModel::with_settings(Emotion::Neutral, 0.1, modifiers, 10, clock);

    model.trigger_positive_event(1.0);
    assert!(approx(model.state().valence, 0.0));
}

#[test]
fn test_info_snapshot() {
    let (_clock, mut model) = model();
    model.trigger_confusion(0.5);

    let info = model.info();
    assert_eq!(info.active_triggers, 1);
    assert_eq!(info.current_emotion, model.current_emotion());
    assert_eq!(info.description, model.description());
}
