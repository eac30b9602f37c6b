use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::types::*;
use crate::kernel::emotion::Emotion;
use crate::kernel::time::{Clock, Timestamp};

/// Guard evaluated as `(from, to)` when a transition is attempted.
pub type Guard = Box<dyn Fn(BehaviorState, BehaviorState) -> bool + Send + Sync>;
/// Side effect attached to a registered edge.
pub type TransitionEffect = Box<dyn FnMut(BehaviorState, BehaviorState) -> Result<(), CallbackError> + Send>;
/// Enter/exit hook for a single state.
pub type StateCallback = Box<dyn FnMut(BehaviorState) -> Result<(), CallbackError> + Send>;

pub struct BehaviorTransition {
    pub from: BehaviorState,
    pub to: BehaviorState,
    guard: Option<Guard>,
    effect: Option<TransitionEffect>,
}

impl BehaviorTransition {
    pub fn new(from: BehaviorState, to: BehaviorState) -> Self {
        Self { from, to, guard: None, effect: None }
    }

    pub fn with_guard<G>(mut self, guard: G) -> Self
    where
        G: Fn(BehaviorState, BehaviorState) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn with_effect<E>(mut self, effect: E) -> Self
    where
        E: FnMut(BehaviorState, BehaviorState) -> Result<(), CallbackError> + Send + 'static,
    {
        self.effect = Some(Box::new(effect));
        self
    }

    fn permits(&self) -> bool {
        match &self.guard {
            Some(guard) => guard(self.from, self.to),
            None => true,
        }
    }
}

/// Discrete "what is the robot doing" state driven by a priority event queue.
///
/// The legal edge set is exactly what has been registered. Duplicated edges are
/// allowed; a change succeeds if any registered edge for the pair permits it.
pub struct BehaviorStateMachine {
    current: BehaviorState,
    previous: Option<BehaviorState>,
    transitions: Vec<BehaviorTransition>,
    on_enter: HashMap<BehaviorState, Vec<StateCallback>>,
    on_exit: HashMap<BehaviorState, Vec<StateCallback>>,
    queue: VecDeque<BehaviorEvent>,

    // Displayed emotion, synced from the emotion model by the host
    emotion: Emotion,
    emotion_intensity: f32,

    state_change_count: u64,
    last_state_change: Timestamp,
    clock: Arc<dyn Clock>,
}

impl BehaviorStateMachine {
    /// Idle machine with the canonical transition set.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_initial(BehaviorState::Idle, Emotion::Neutral, clock)
    }

    pub fn with_initial(initial: BehaviorState, emotion: Emotion, clock: Arc<dyn Clock>) -> Self {
        let mut machine = Self::empty(initial, clock);
        machine.emotion = emotion;
        machine.install_default_transitions();
        info!("Behavior state machine initialised (state: {})", initial);
        machine
    }

    /// Machine with no registered transitions.
    pub fn empty(initial: BehaviorState, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            current: initial,
            previous: None,
            transitions: Vec::new(),
            on_enter: HashMap::new(),
            on_exit: HashMap::new(),
            queue: VecDeque::new(),
            emotion: Emotion::Neutral,
            emotion_intensity: 0.5,
            state_change_count: 0,
            last_state_change: now,
            clock,
        }
    }

    fn install_default_transitions(&mut self) {
        use BehaviorState::*;

        // Conversation cycle
        self.add_transition(Idle, Listening);
        self.add_transition(Listening, Processing);
        self.add_transition(Processing, Thinking);
        self.add_transition(Thinking, Speaking);
        self.add_transition(Speaking, Idle);

        for state in BehaviorState::ALL {
            if state != Alert {
                self.add_transition(state, Alert);
            }
        }
        self.add_transition(Alert, Idle);

        for state in BehaviorState::ALL {
            if state != Error {
                self.add_transition(state, Error);
            }
        }
        self.add_transition(Error, Idle);

        debug!("Registered {} default transitions", self.transitions.len());
    }

    pub fn add_transition(&mut self, from: BehaviorState, to: BehaviorState) {
        self.register(BehaviorTransition::new(from, to));
    }

    pub fn register(&mut self, transition: BehaviorTransition) {
        self.transitions.push(transition);
    }

    pub fn register_on_enter<F>(&mut self, state: BehaviorState, callback: F)
    where
        F: FnMut(BehaviorState) -> Result<(), CallbackError> + Send + 'static,
    {
        self.on_enter.entry(state).or_default().push(Box::new(callback));
    }

    pub fn register_on_exit<F>(&mut self, state: BehaviorState, callback: F)
    where
        F: FnMut(BehaviorState) -> Result<(), CallbackError> + Send + 'static,
    {
        self.on_exit.entry(state).or_default().push(Box::new(callback));
    }

    pub fn change_state(&mut self, target: BehaviorState, reason: Option<&str>) -> bool {
        self.try_change_state(target, reason).is_ok()
    }

    pub fn try_change_state(&mut self, target: BehaviorState, reason: Option<&str>) -> Result<TransitionReport, TransitionError> {
        let from = self.current;
        if target == from {
            debug!("State unchanged: {}", target);
            return Err(TransitionError::Unchanged(target));
        }

        let mut registered = false;
        let mut chosen = None;
        for (idx, t) in self.transitions.iter().enumerate() {
            if t.from == from && t.to == target {
                registered = true;
                if t.permits() {
                    chosen = Some(idx);
                    break;
                }
            }
        }

        let idx = match (registered, chosen) {
            (false, _) => {
                warn!("Invalid transition: {} -> {}", from, target);
                return Err(TransitionError::NotRegistered { from, to: target });
            }
            (true, None) => {
                warn!("Guard rejected transition: {} -> {}", from, target);
                return Err(TransitionError::GuardRejected { from, to: target });
            }
            (true, Some(idx)) => idx,
        };

        let mut failures = Vec::new();
        run_callbacks(&mut self.on_exit, from, CallbackPhase::Exit, &mut failures);

        self.previous = Some(from);
        self.current = target;
        self.state_change_count += 1;
        self.last_state_change = self.clock.now();

        match reason {
            Some(reason) => info!("State changed: {} -> {} (reason: {})", from, target, reason),
            None => info!("State changed: {} -> {}", from, target),
        }

        if let Some(effect) = self.transitions[idx].effect.as_mut() {
            if let Err(e) = effect(from, target) {
                error!("Transition effect failed ({} -> {}): {}", from, target, e);
                failures.push(CallbackFailure {
                    phase: CallbackPhase::Effect,
                    state: target,
                    error: e,
                });
            }
        }

        run_callbacks(&mut self.on_enter, target, CallbackPhase::Enter, &mut failures);

        Ok(TransitionReport { from, to: target, failures })
    }

    /// Queue an event. Ordered by priority, FIFO among equals.
    pub fn post_event(&mut self, mut event: BehaviorEvent) {
        event.timestamp = self.clock.now();
        let pos = self.queue.partition_point(|queued| queued.priority <= event.priority);
        debug!("Posted event: {} (priority {})", event.kind, event.priority.value());
        self.queue.insert(pos, event);
    }

    /// Drain the whole queue, applying the event-to-state table.
    /// Returns the transitions that succeeded, in order.
    pub fn process_events(&mut self) -> Vec<TransitionReport> {
        let mut reports = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            match event.kind.target_state() {
                Some(target) => {
                    if let Ok(report) = self.try_change_state(target, Some(event.kind.tag())) {
                        reports.push(report);
                    }
                }
                None => debug!("Ignoring unmapped event: {}", event.kind),
            }
        }
        reports
    }

    /// Force Idle regardless of registered edges, drop queued events and reset the displayed emotion.
    pub fn reset(&mut self) -> Option<TransitionReport> {
        self.queue.clear();
        self.emotion = Emotion::Neutral;
        self.emotion_intensity = 0.5;

        let from = self.current;
        let report = if from != BehaviorState::Idle {
            let mut failures = Vec::new();
            run_callbacks(&mut self.on_exit, from, CallbackPhase::Exit, &mut failures);
            self.previous = Some(from);
            self.current = BehaviorState::Idle;
            self.state_change_count += 1;
            self.last_state_change = self.clock.now();
            run_callbacks(&mut self.on_enter, BehaviorState::Idle, CallbackPhase::Enter, &mut failures);
            Some(TransitionReport { from, to: BehaviorState::Idle, failures })
        } else {
            None
        };

        info!("Behavior state machine reset");
        report
    }

    pub fn set_emotion(&mut self, emotion: Emotion, intensity: f32) {
        let intensity = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
        if emotion != self.emotion {
            info!("Displayed emotion: {} (intensity: {:.2})", emotion, intensity);
        }
        self.emotion = emotion;
        self.emotion_intensity = intensity;
    }

    pub fn current(&self) -> BehaviorState {
        self.current
    }

    pub fn previous(&self) -> Option<BehaviorState> {
        self.previous
    }

    pub fn current_emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn emotion_intensity(&self) -> f32 {
        self.emotion_intensity
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_busy()
    }

    pub fn is_idle(&self) -> bool {
        self.current == BehaviorState::Idle
    }

    pub fn state_change_count(&self) -> u64 {
        self.state_change_count
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_events(&self) -> impl Iterator<Item = &BehaviorEvent> {
        self.queue.iter()
    }

    /// Whether any edge `(from, to)` is registered, ignoring guards.
    pub fn is_registered(&self, from: BehaviorState, to: BehaviorState) -> bool {
        self.transitions.iter().any(|t| t.from == from && t.to == to)
    }

    pub fn time_in_current_state(&self) -> f32 {
        self.clock.now().secs_since(self.last_state_change)
    }

    pub fn info(&self) -> BehaviorInfo {
        BehaviorInfo {
            current_state: self.current,
            previous_state: self.previous,
            current_emotion: self.emotion,
            emotion_intensity: self.emotion_intensity,
            is_busy: self.is_busy(),
            state_change_count: self.state_change_count,
            event_queue_size: self.queue.len(),
            transition_count: self.transitions.len(),
            time_in_current_state: self.time_in_current_state(),
        }
    }
}

fn run_callbacks(
    table: &mut HashMap<BehaviorState, Vec<StateCallback>>,
    state: BehaviorState,
    phase: CallbackPhase,
    failures: &mut Vec<CallbackFailure>,
) {
    let Some(callbacks) = table.get_mut(&state) else {
        return;
    };
    for callback in callbacks.iter_mut() {
        if let Err(e) = callback(state) {
            error!("{:?} callback failed for {}: {}", phase, state, e);
            failures.push(CallbackFailure { phase, state, error: e });
        }
    }
}
