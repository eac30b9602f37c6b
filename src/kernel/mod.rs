pub mod behavior;
pub mod decision;
pub mod emotion;
pub mod event;
pub mod history;
pub mod personality;
pub mod priority;
pub mod reactor;
pub mod scheduler;
pub mod telemetry;
pub mod time;
