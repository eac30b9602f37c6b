//! Read-only observability log.
//!
//! Telemetry is a side-effect layer: decision logic never reads it.
//! Events carry IDs, ticks and enums only, never user content.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{ActionEventKind, TelemetryEvent};
pub use metrics::{ActionStats, TelemetrySnapshot};
pub use recorder::TelemetryRecorder;
