use serde_json::json;

use atlas::kernel::behavior::EventKind;
use atlas::kernel::decision::{Intent, Sentiment};
use atlas::kernel::event::{Event, ParseError, TriggerRequest};
use atlas::kernel::priority::Priority;

#[test]
fn test_parse_behavior_event() {
    match Event::parse_command("speech_detected").unwrap() {
        Event::Behavior(e) => {
            assert_eq!(e.kind, EventKind::SpeechDetected);
            assert_eq!(e.priority, Priority::Medium);
        }
        other => panic!("unexpected {:?}", other),
    }

    match Event::parse_command("alert 0").unwrap() {
        Event::Behavior(e) => assert_eq!(e.priority, Priority::Critical),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_intent_with_entities() {
    match Event::parse_command("intent command device=lamp action=on").unwrap() {
        Event::Utterance(u) => {
            assert_eq!(u.intent, Some(Intent::Command));
            assert_eq!(u.entities["device"], json!("lamp"));
            assert_eq!(u.entities["action"], json!("on"));
        }
        other => panic!("unexpected {:?}", other),
    }

    match Event::parse_command("intent mumble").unwrap() {
        Event::Utterance(u) => assert_eq!(u.intent, Some(Intent::Unknown)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_sentiment() {
    match Event::parse_command("sentiment negative").unwrap() {
        Event::Utterance(u) => {
            assert_eq!(u.intent, None);
            assert_eq!(u.sentiment, Some(Sentiment::Negative));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_trigger() {
    match Event::parse_command("trigger surprise 0.8").unwrap() {
        Event::Trigger(t) => assert_eq!(t, TriggerRequest::Surprise { intensity: 0.8 }),
        other => panic!("unexpected {:?}", other),
    }

    match Event::parse_command("trigger positive").unwrap() {
        Event::Trigger(t) => assert_eq!(t, TriggerRequest::Positive { intensity: 0.5 }),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_errors() {
    assert_eq!(Event::parse_command("   ").unwrap_err(), ParseError::Empty);
    assert_eq!(Event::parse_command("dance").unwrap_err(), ParseError::UnknownCommand("dance".into()));
    assert_eq!(Event::parse_command("intent").unwrap_err(), ParseError::MissingArgument("intent"));
    assert_eq!(
        Event::parse_command("trigger joy").unwrap_err(),
        ParseError::UnknownCommand("joy".into())
    );
    assert_eq!(
        Event::parse_command("trigger positive lots").unwrap_err(),
        ParseError::InvalidNumber("lots".into())
    );
    assert_eq!(Event::parse_command("alert x").unwrap_err(), ParseError::InvalidNumber("x".into()));
}

#[test]
fn test_parse_reset() {
    assert!(matches!(Event::parse_command("reset"), Ok(Event::Reset)));
}
