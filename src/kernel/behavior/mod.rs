pub mod machine;
pub mod types;

pub use machine::{BehaviorStateMachine, BehaviorTransition};
pub use types::{
    BehaviorEvent, BehaviorInfo, BehaviorState, CallbackError, CallbackFailure, CallbackPhase, EventKind,
    TransitionError, TransitionReport, UnknownEventKind,
};
