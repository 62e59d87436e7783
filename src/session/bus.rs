use serde_json::Value;
use tokio::sync::broadcast;

/// Typed side-channel for cross-component notifications that are not
/// session state: timeline highlighting from search hits, seek requests
/// into playback, short-lived status text, and classroom monitoring
/// frames. Explicit pub/sub instead of stringly-named global events.
#[derive(Debug, Clone)]
pub enum UiEvent {
    TimelineHighlight {
        start_time: f64,
        end_time: f64,
        topic: String,
    },
    SeekRequest {
        time: f64,
    },
    /// Dismissable, non-modal status/error text.
    StatusNotice {
        message: String,
    },
    /// Classroom monitoring stream frame (`init` or `analysis`).
    MonitoringUpdate {
        kind: MonitoringEventKind,
        data: Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringEventKind {
    Init,
    Analysis,
}

const BUS_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Fire-and-forget: no subscribers is not an error.
    pub fn publish(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    pub fn notice(&self, message: impl Into<String>) {
        self.publish(UiEvent::StatusNotice { message: message.into() });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
