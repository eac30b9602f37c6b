use crate::kernel::behavior::BehaviorState;
use crate::kernel::decision::{Action, ActionId, DecisionMaker};

/// Instructions for the driver. The kernel never performs these itself.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Start executing; report back with `Event::ActionCompleted`.
    Execute(Action),
    /// Stop `displaced` (if any) and run `action` instead. The displaced action stays queued.
    Preempt { displaced: Option<ActionId>, action: Action },
    StateChanged { from: BehaviorState, to: BehaviorState },
}

pub struct Scheduler;

impl Scheduler {
    /// Hand the queue head to the executor when it is free.
    pub fn dispatch(&self, decision: &mut DecisionMaker) -> Option<SideEffect> {
        if decision.current_action().is_some() {
            return None;
        }
        decision.get_next_action().map(SideEffect::Execute)
    }
}
