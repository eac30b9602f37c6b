use serde::{Deserialize, Serialize};

use crate::kernel::behavior::BehaviorState;
use crate::kernel::decision::{ActionId, ActionType};
use crate::kernel::emotion::Emotion;
use crate::kernel::time::Tick;

// Allowed: IDs, Ticks, Enums, Counts
// Forbidden: utterance text, entity values, action parameters

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    StateTransition {
        from: BehaviorState,
        to: BehaviorState,
        tick: Tick,
    },

    EmotionShift {
        from: Emotion,
        to: Emotion,
        tick: Tick,
    },

    ActionLifecycle {
        action_id: ActionId,
        action_type: ActionType,
        event: ActionEventKind,
        tick: Tick,
    },

    RuleFailures {
        count: u64,
        tick: Tick,
    },

    Reset {
        tick: Tick,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEventKind {
    Queued,
    Started,
    Completed,
    Preempted,
    PreemptionRejected,
}
