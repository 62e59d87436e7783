use std::collections::HashMap;
use std::sync::Mutex;

use super::buffer::EventLog;
use super::event::{NormalizedUpdate, Person, VitalSign, WorkloadEvent, WorkloadType};
use super::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkloadStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Health of the event-stream connection itself, not of any workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregatorStatus {
    #[default]
    Stopped,
    Connecting,
    Connected,
    Error,
}

/// Latest decoded samples for one waveform channel.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSnapshot {
    pub samples: Vec<f64>,
    pub frequency_hz: Option<f64>,
}

/// Accumulated view of one workload. Status never auto-reverts on
/// silence; only `stop_all` or `reset` moves it off `Running`.
#[derive(Debug, Clone, Default)]
pub struct WorkloadState {
    pub status: WorkloadStatus,
    pub event_count: u64,
    pub last_event_time: Option<f64>,
    pub vitals: HashMap<VitalSign, f64>,
    pub waveforms: HashMap<&'static str, WaveformSnapshot>,
    pub prediction: Option<String>,
    pub filename: Option<String>,
    pub people: Vec<Person>,
    pub activity: Option<String>,
    pub frame_number: Option<u64>,
    pub frame_base64: Option<String>,
}

impl WorkloadState {
    fn absorb(&mut self, update: NormalizedUpdate) {
        match update {
            NormalizedUpdate::Vitals(values) => {
                for (sign, value) in values {
                    self.vitals.insert(sign, value);
                }
            }
            NormalizedUpdate::Waveform { kind, samples, frequency_hz } => {
                self.waveforms.insert(
                    kind.as_str(),
                    WaveformSnapshot { samples, frequency_hz },
                );
            }
            NormalizedUpdate::EcgInference { prediction, filename } => {
                if prediction.is_some() {
                    self.prediction = prediction;
                }
                if filename.is_some() {
                    self.filename = filename;
                }
            }
            NormalizedUpdate::Pose { people, activity, frame_number, frame_base64 } => {
                self.people = people;
                if activity.is_some() {
                    self.activity = activity;
                }
                self.frame_number = frame_number;
                if frame_base64.is_some() {
                    self.frame_base64 = frame_base64;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Hub {
    states: HashMap<WorkloadType, WorkloadState>,
    aggregator: AggregatorStatus,
    log: EventLog,
}

/// Shared store of workload views fed by the ingestor. Same discipline
/// as the session store: the lock is never held across an await.
#[derive(Debug, Default)]
pub struct WorkloadStore {
    inner: Mutex<Hub>,
}

impl WorkloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event: normalization, state absorption, audit log.
    /// Every applied event marks its workload running.
    pub fn apply(&self, event: WorkloadEvent) {
        let updates = normalize(&event);
        let mut hub = self.inner.lock().expect("workload store poisoned");
        let state = hub.states.entry(event.workload).or_default();
        state.status = WorkloadStatus::Running;
        state.event_count += 1;
        if event.timestamp.is_some() {
            state.last_event_time = event.timestamp;
        }
        for update in updates {
            state.absorb(update);
        }
        hub.log.push(event);
    }

    pub fn stop_all(&self) {
        let mut hub = self.inner.lock().expect("workload store poisoned");
        for state in hub.states.values_mut() {
            state.status = WorkloadStatus::Stopped;
        }
    }

    /// Back to pristine idle: views, statuses, and the audit log.
    pub fn reset(&self) {
        let mut hub = self.inner.lock().expect("workload store poisoned");
        hub.states.clear();
        hub.log.clear();
        hub.aggregator = AggregatorStatus::Stopped;
    }

    pub fn set_aggregator(&self, status: AggregatorStatus) {
        self.inner.lock().expect("workload store poisoned").aggregator = status;
    }

    pub fn aggregator(&self) -> AggregatorStatus {
        self.inner.lock().expect("workload store poisoned").aggregator
    }

    pub fn workload(&self, workload: WorkloadType) -> WorkloadState {
        self.inner
            .lock()
            .expect("workload store poisoned")
            .states
            .get(&workload)
            .cloned()
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().expect("workload store poisoned").log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vitals_event(time: f64) -> WorkloadEvent {
        WorkloadEvent {
            uuid: None,
            workload: WorkloadType::Mdpnp,
            event_type: None,
            timestamp: Some(time),
            payload: json!({"metric": "MDC_ECG_HEART_RATE", "value": 64.0}),
        }
    }

    #[test]
    fn applied_events_mark_running_and_count() {
        let store = WorkloadStore::new();
        store.apply(vitals_event(1.0));
        store.apply(vitals_event(2.0));

        let state = store.workload(WorkloadType::Mdpnp);
        assert_eq!(state.status, WorkloadStatus::Running);
        assert_eq!(state.event_count, 2);
        assert_eq!(state.last_event_time, Some(2.0));
        assert_eq!(state.vitals.get(&VitalSign::Hr), Some(&64.0));
    }

    #[test]
    fn silence_never_reverts_running() {
        let store = WorkloadStore::new();
        store.apply(vitals_event(1.0));
        // No further events. Status stays as the last transition left it.
        assert_eq!(store.workload(WorkloadType::Mdpnp).status, WorkloadStatus::Running);

        store.stop_all();
        assert_eq!(store.workload(WorkloadType::Mdpnp).status, WorkloadStatus::Stopped);
        // Untouched workloads stay pristine.
        assert_eq!(store.workload(WorkloadType::Rppg).status, WorkloadStatus::Idle);
    }

    #[test]
    fn reset_returns_to_pristine_idle() {
        let store = WorkloadStore::new();
        store.apply(vitals_event(1.0));
        store.set_aggregator(AggregatorStatus::Connected);
        store.reset();

        let state = store.workload(WorkloadType::Mdpnp);
        assert_eq!(state.status, WorkloadStatus::Idle);
        assert_eq!(state.event_count, 0);
        assert!(state.vitals.is_empty());
        assert_eq!(store.aggregator(), AggregatorStatus::Stopped);
        assert_eq!(store.event_count(), 0);
    }
}
