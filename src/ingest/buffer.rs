use std::collections::{HashMap, VecDeque};

use super::event::{WorkloadEvent, WorkloadType};

const PER_WORKLOAD_CAP: usize = 100;
const OVERALL_CAP: usize = 500;

/// Bounded audit trail of raw events: the last 100 per workload plus
/// the last 500 overall. Old entries fall off the front.
#[derive(Debug, Default)]
pub struct EventLog {
    per_workload: HashMap<WorkloadType, VecDeque<WorkloadEvent>>,
    overall: VecDeque<WorkloadEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: WorkloadEvent) {
        let ring = self.per_workload.entry(event.workload).or_default();
        if ring.len() == PER_WORKLOAD_CAP {
            ring.pop_front();
        }
        ring.push_back(event.clone());

        if self.overall.len() == OVERALL_CAP {
            self.overall.pop_front();
        }
        self.overall.push_back(event);
    }

    pub fn for_workload(&self, workload: WorkloadType) -> impl Iterator<Item = &WorkloadEvent> {
        self.per_workload.get(&workload).into_iter().flatten()
    }

    pub fn recent(&self) -> impl Iterator<Item = &WorkloadEvent> {
        self.overall.iter()
    }

    pub fn len(&self) -> usize {
        self.overall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }

    pub fn clear(&mut self) {
        self.per_workload.clear();
        self.overall.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(workload: WorkloadType, n: u64) -> WorkloadEvent {
        WorkloadEvent {
            uuid: Some(uuid::Uuid::new_v4()),
            workload,
            event_type: None,
            timestamp: Some(n as f64),
            payload: json!({}),
        }
    }

    #[test]
    fn per_workload_ring_keeps_the_newest_hundred() {
        let mut log = EventLog::new();
        for n in 0..150 {
            log.push(event(WorkloadType::Rppg, n));
        }
        let kept: Vec<_> = log
            .for_workload(WorkloadType::Rppg)
            .filter_map(|e| e.timestamp)
            .collect();
        assert_eq!(kept.len(), 100);
        assert_eq!(kept.first(), Some(&50.0));
        assert_eq!(kept.last(), Some(&149.0));
    }

    #[test]
    fn overall_ring_caps_at_five_hundred_across_workloads() {
        let mut log = EventLog::new();
        for n in 0..300 {
            log.push(event(WorkloadType::Rppg, n));
            log.push(event(WorkloadType::Mdpnp, n));
        }
        assert_eq!(log.len(), 500);
        assert_eq!(log.for_workload(WorkloadType::Rppg).count(), 100);
        assert_eq!(log.for_workload(WorkloadType::Mdpnp).count(), 100);
    }
}
