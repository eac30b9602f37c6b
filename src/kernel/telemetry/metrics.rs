use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::event::{ActionEventKind, TelemetryEvent};
use crate::kernel::decision::ActionId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub transitions: u64,
    pub emotion_shifts: u64,
    pub rule_failures: u64,
    pub resets: u64,
    pub action_stats: ActionStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionStats {
    pub queued: u64,
    pub started: u64,
    pub completed: u64,
    pub preempted: u64,
    pub rejected_preemptions: u64,
    pub total_run_ticks: u64,
    pub avg_run_ticks: f64,
}

/// Pure fold over the retained events.
pub fn compute_snapshot<'a, I>(events: I) -> TelemetrySnapshot
where
    I: IntoIterator<Item = &'a TelemetryEvent>,
{
    let mut snap = TelemetrySnapshot::default();
    let mut started_at: HashMap<ActionId, u64> = HashMap::new();
    let mut timed_completions = 0u64;

    for event in events {
        match event {
            TelemetryEvent::StateTransition { .. } => snap.transitions += 1,
            TelemetryEvent::EmotionShift { .. } => snap.emotion_shifts += 1,
            TelemetryEvent::RuleFailures { count, .. } => snap.rule_failures += count,
            TelemetryEvent::Reset { .. } => snap.resets += 1,
            TelemetryEvent::ActionLifecycle { action_id, event, tick, .. } => {
                let stats = &mut snap.action_stats;
                match event {
                    ActionEventKind::Queued => stats.queued += 1,
                    ActionEventKind::Started => {
                        stats.started += 1;
                        started_at.insert(*action_id, tick.frame);
                    }
                    ActionEventKind::Completed => {
                        stats.completed += 1;
                        // Start may have been evicted from the buffer
                        if let Some(start) = started_at.remove(action_id) {
                            stats.total_run_ticks += tick.frame.saturating_sub(start);
                            timed_completions += 1;
                        }
                    }
                    ActionEventKind::Preempted => stats.preempted += 1,
                    ActionEventKind::PreemptionRejected => stats.rejected_preemptions += 1,
                }
            }
        }
    }

    if timed_completions > 0 {
        snap.action_stats.avg_run_ticks = snap.action_stats.total_run_ticks as f64 / timed_completions as f64;
    }

    snap
}
