use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::kernel::history::BoundedHistory;

pub const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: BoundedHistory<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new(MAX_EVENTS)
    }
}

impl TelemetryRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BoundedHistory::new(capacity),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        self.buffer.push(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(self.buffer.iter())
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
