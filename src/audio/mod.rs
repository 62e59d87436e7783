pub mod controller;
pub mod timer;

pub use controller::{plan_stop, AudioController, StopPlan};
pub use timer::{format_elapsed, RecordingTimer};
