use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::behavior::{BehaviorInfo, BehaviorStateMachine, TransitionReport};
use super::decision::{Action, DecisionContext, DecisionInfo, DecisionMaker, Parameters};
use super::emotion::{EmotionInfo, EmotionModel, EmotionModifiers, TriggerKind};
use super::event::{Event, TriggerRequest, Utterance};
use super::personality::{PersonalityInfo, PersonalityProfile};
use super::scheduler::{Scheduler, SideEffect};
use super::telemetry::{ActionEventKind, TelemetryEvent, TelemetryRecorder, TelemetrySnapshot};
use super::time::{Clock, Tick};
use crate::config::CoreConfig;

/// Recent action types handed to rules as context.
const CONTEXT_HISTORY: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CoreStatus {
    pub tick: Tick,
    pub behavior: BehaviorInfo,
    pub emotion: EmotionInfo,
    pub decision: DecisionInfo,
    pub personality: PersonalityInfo,
    pub telemetry: TelemetrySnapshot,
}

pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub machine: BehaviorStateMachine,
    pub emotion: EmotionModel,
    pub decision: DecisionMaker,
    pub personality: PersonalityProfile,
    pub scheduler: Scheduler,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,

    pending_utterance: Option<Utterance>,
    environment: Option<Parameters>,
    // Bumped whenever the observed situation changes
    version: u64,
    last_decided_version: Option<u64>,
}

impl Reactor {
    pub fn new(config: &CoreConfig, clock: Arc<dyn Clock>, receiver: mpsc::Receiver<Event>) -> Self {
        let personality = config.personality.build();

        let emotion = EmotionModel::with_settings(
            config.initial_emotion,
            config.decay_rate,
            EmotionModifiers::from_personality(&personality),
            config.emotion_history_capacity,
            clock.clone(),
        );

        let mut machine = BehaviorStateMachine::with_initial(config.initial_state, config.initial_emotion, clock.clone());
        machine.set_emotion(emotion.current_emotion(), emotion.intensity());

        let mut decision = DecisionMaker::with_history(config.action_history_capacity, clock);
        decision.install_personality_rules(&personality);

        info!("Reactor ready. {}", personality.describe());

        Self {
            receiver,
            machine,
            emotion,
            decision,
            personality,
            scheduler: Scheduler,
            telemetry: TelemetryRecorder::new(config.telemetry_capacity),
            tick: Tick::new(),
            pending_utterance: None,
            environment: None,
            version: 0,
            last_decided_version: None,
        }
    }

    /// Channel plus reactor in one call.
    pub fn channel(config: &CoreConfig, clock: Arc<dyn Clock>) -> (mpsc::Sender<Event>, Self) {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        (tx, Self::new(config, clock, rx))
    }

    /// Pure tick step. Never awaits; returns the work the driver must perform.
    pub fn tick_step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        let mut effects = Vec::new();
        let emotion_before = self.emotion.current_emotion();

        for event in events {
            self.apply(event, &mut effects);
        }

        for report in self.machine.process_events() {
            self.record_transition(&report, &mut effects);
        }

        self.emotion.update();
        let emotion_after = self.emotion.current_emotion();
        if emotion_after != emotion_before {
            self.telemetry.record(TelemetryEvent::EmotionShift {
                from: emotion_before,
                to: emotion_after,
                tick: self.tick,
            });
            self.version += 1;
        }
        self.machine.set_emotion(emotion_after, self.emotion.intensity());

        if self.last_decided_version != Some(self.version) {
            self.decide();
            self.last_decided_version = Some(self.version);
        }

        if let Some(effect) = self.scheduler.dispatch(&mut self.decision) {
            if let SideEffect::Execute(action) = &effect {
                info!("Dispatching {} ({})", action.action_type, action.id);
                self.record_action(action, ActionEventKind::Started);
            }
            effects.push(effect);
        }

        effects
    }

    /// Drain whatever is waiting on the channel and step once.
    pub fn run_tick(&mut self) -> Vec<SideEffect> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        self.tick_step(events)
    }

    /// Situation version; moves on every utterance, transition or emotion shift.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn status(&self) -> CoreStatus {
        CoreStatus {
            tick: self.tick,
            behavior: self.machine.info(),
            emotion: self.emotion.info(),
            decision: self.decision.info(),
            personality: self.personality.info(),
            telemetry: self.telemetry.snapshot(),
        }
    }

    /// Back to Idle/Neutral with empty queues. A running action is left to finish.
    pub fn reset(&mut self) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        if let Some(report) = self.machine.reset() {
            self.record_transition(&report, &mut effects);
        }
        self.emotion.reset();
        self.machine.set_emotion(self.emotion.current_emotion(), self.emotion.intensity());
        self.decision.clear_queue();
        self.pending_utterance = None;
        self.version += 1;
        self.telemetry.record(TelemetryEvent::Reset { tick: self.tick });
        effects
    }

    fn apply(&mut self, event: Event, effects: &mut Vec<SideEffect>) {
        match event {
            Event::Behavior(behavior_event) => self.machine.post_event(behavior_event),
            Event::Trigger(request) => self.apply_trigger(request),
            Event::Utterance(utterance) => {
                debug!("Utterance received: {:?}", utterance.intent);
                self.pending_utterance = Some(utterance);
                self.version += 1;
            }
            Event::Environment(environment) => {
                self.environment = Some(environment);
                self.version += 1;
            }
            Event::Enqueue(action) => self.enqueue(action),
            Event::Interrupt(action) => {
                let displaced = self.decision.current_action().cloned();
                if self.decision.interrupt_current_action(action.clone()) {
                    if let Some(displaced) = &displaced {
                        self.record_action(displaced, ActionEventKind::Preempted);
                    }
                    self.record_action(&action, ActionEventKind::Started);
                    effects.push(SideEffect::Preempt { displaced: displaced.map(|a| a.id), action });
                } else {
                    self.record_action(&action, ActionEventKind::PreemptionRejected);
                    self.enqueue(action);
                }
            }
            Event::ActionCompleted(id) => {
                if self.decision.current_action().map(|a| a.id) != Some(id) {
                    warn!("Ignoring stale completion for {}", id);
                    return;
                }
                if let Some(done) = self.decision.complete_current_action() {
                    self.record_action(&done, ActionEventKind::Completed);
                }
            }
            Event::Reset => effects.extend(self.reset()),
        }
    }

    fn apply_trigger(&mut self, request: TriggerRequest) {
        match request {
            TriggerRequest::Positive { intensity } => self.emotion.trigger_positive_event(intensity),
            TriggerRequest::Negative { intensity } => self.emotion.trigger_negative_event(intensity),
            TriggerRequest::Surprise { intensity } => self.emotion.trigger_surprise(intensity),
            TriggerRequest::Confusion { intensity } => self.emotion.trigger_confusion(intensity),
            TriggerRequest::Custom { name, valence_delta, arousal_delta, duration } => {
                self.emotion
                    .apply_trigger(TriggerKind::Custom(name), valence_delta, arousal_delta, duration)
            }
        }
    }

    fn decide(&mut self) {
        let utterance = self.pending_utterance.take().unwrap_or_default();
        let mut ctx = DecisionContext::new(self.machine.current(), self.emotion.current_emotion());
        ctx.user_intent = utterance.intent;
        ctx.user_sentiment = utterance.sentiment;
        ctx.entities = (!utterance.entities.is_empty()).then_some(utterance.entities);
        ctx.environment = self.environment.clone();
        ctx.history = Some(self.decision.recent_actions(CONTEXT_HISTORY));

        let failures_before = self.decision.rule_failures();
        let decided = self.decision.decide(&ctx);
        let failed = self.decision.rule_failures() - failures_before;
        if failed > 0 {
            self.telemetry.record(TelemetryEvent::RuleFailures { count: failed, tick: self.tick });
        }

        if let Some(action) = decided {
            self.enqueue(action);
        }
    }

    fn enqueue(&mut self, action: Action) {
        self.record_action(&action, ActionEventKind::Queued);
        self.decision.queue_action(action);
    }

    fn record_action(&mut self, action: &Action, event: ActionEventKind) {
        self.telemetry.record(TelemetryEvent::ActionLifecycle {
            action_id: action.id,
            action_type: action.action_type,
            event,
            tick: self.tick,
        });
    }

    fn record_transition(&mut self, report: &TransitionReport, effects: &mut Vec<SideEffect>) {
        self.telemetry.record(TelemetryEvent::StateTransition {
            from: report.from,
            to: report.to,
            tick: self.tick,
        });
        self.version += 1;
        effects.push(SideEffect::StateChanged { from: report.from, to: report.to });
    }
}
