use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::session::{EventBus, MonitoringEventKind, SessionStore, UiEvent};

use super::event::WorkloadEvent;
use super::workloads::{AggregatorStatus, WorkloadStore};

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// One complete server-sent event: optional event name plus the joined
/// data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE framer. Feed it raw chunks; complete frames come
/// out in arrival order. Comment lines (`:` prefix) are discarded,
/// multiple `data:` lines are newline-joined per the SSE format.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();

        while let Some(end) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..end + 2).collect();
            let mut event = None;
            let mut data_lines = Vec::new();
            for line in raw.lines() {
                if line.starts_with(':') {
                    continue;
                }
                if let Some(rest) = line.strip_prefix("event:") {
                    event = Some(rest.trim_start().to_string());
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
                }
            }
            if event.is_none() && data_lines.is_empty() {
                continue;
            }
            frames.push(SseFrame { event, data: data_lines.join("\n") });
        }
        frames
    }
}

/// Where one frame is routed after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingested {
    Monitoring { kind: MonitoringEventKind, data: Value },
    Workload(WorkloadEvent),
}

/// Classifies a frame. Keepalives, malformed payloads, and unknown
/// workloads all yield `None`; a bad frame never stops the stream.
pub fn classify(frame: &SseFrame) -> Option<Ingested> {
    match frame.event.as_deref() {
        Some("keepalive") => return None,
        Some("init") => {
            let data = serde_json::from_str(&frame.data).ok()?;
            return Some(Ingested::Monitoring { kind: MonitoringEventKind::Init, data });
        }
        Some("analysis") => {
            let data = serde_json::from_str(&frame.data).ok()?;
            return Some(Ingested::Monitoring { kind: MonitoringEventKind::Analysis, data });
        }
        Some(other) => {
            debug!("ignoring unknown event name {:?}", other);
            return None;
        }
        None => {}
    }

    match serde_json::from_str::<WorkloadEvent>(&frame.data) {
        Ok(event) => Some(Ingested::Workload(event)),
        Err(e) => {
            debug!("dropping unparseable workload event: {}", e);
            None
        }
    }
}

/// Owns the single event-stream connection for the client. Opening a
/// new connection cancels the previous one; events are applied strictly
/// in delivery order.
pub struct EventIngestor {
    store: Arc<SessionStore>,
    workloads: Arc<WorkloadStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    token: Mutex<Option<CancellationToken>>,
}

impl EventIngestor {
    pub fn new(
        store: Arc<SessionStore>,
        workloads: Arc<WorkloadStore>,
        api: Arc<ApiClient>,
        bus: EventBus,
    ) -> Self {
        Self { store, workloads, api, bus, token: Mutex::new(None) }
    }

    pub async fn connect(&self, session_id: &str) {
        let token = CancellationToken::new();
        if let Some(old) = self.token.lock().await.replace(token.clone()) {
            old.cancel();
        }

        let store = Arc::clone(&self.store);
        let workloads = Arc::clone(&self.workloads);
        let api = Arc::clone(&self.api);
        let bus = self.bus.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("event ingestor cancelled for session {}", session_id);
                    workloads.set_aggregator(AggregatorStatus::Stopped);
                }
                _ = run(store, workloads.clone(), api, bus, session_id.clone()) => {}
            }
        });
    }

    pub async fn disconnect(&self) {
        if let Some(token) = self.token.lock().await.take() {
            token.cancel();
        }
        self.workloads.set_aggregator(AggregatorStatus::Stopped);
    }
}

async fn run(
    store: Arc<SessionStore>,
    workloads: Arc<WorkloadStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    session_id: String,
) {
    loop {
        workloads.set_aggregator(AggregatorStatus::Connecting);
        match api.events_stream().await {
            Ok(response) => {
                info!("event stream connected for session {}", session_id);
                workloads.set_aggregator(AggregatorStatus::Connected);
                consume(&workloads, &bus, response).await;
            }
            Err(e) => {
                warn!("event stream connect failed: {}", e);
            }
        }

        workloads.set_aggregator(AggregatorStatus::Error);

        // Reconnect only while this session is still processing.
        let snap = store.snapshot();
        let still_live =
            snap.ai_processing && snap.session_id.as_deref() == Some(session_id.as_str());
        if !still_live {
            debug!("event stream not reconnecting; session no longer processing");
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn consume(workloads: &WorkloadStore, bus: &EventBus, response: reqwest::Response) {
    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                warn!("event stream read error: {}", e);
                return;
            }
        };
        // Frames apply fully, in order, before the next chunk is read.
        for frame in parser.push(&String::from_utf8_lossy(&chunk)) {
            match classify(&frame) {
                Some(Ingested::Workload(event)) => workloads.apply(event),
                Some(Ingested::Monitoring { kind, data }) => {
                    bus.publish(UiEvent::MonitoringUpdate { kind, data });
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::event::WorkloadType;

    #[test]
    fn frames_split_on_blank_line_and_join_data() {
        let mut parser = SseParser::new();
        let frames = parser.push("data: {\"a\":\ndata: 1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"a\":\n1}");
        assert!(frames[0].event.is_none());
    }

    #[test]
    fn partial_frames_wait_for_the_rest() {
        let mut parser = SseParser::new();
        assert!(parser.push("data: {\"x\"").is_empty());
        let frames = parser.push(": 1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"x\": 1}");
    }

    #[test]
    fn comment_keepalives_are_discarded() {
        let mut parser = SseParser::new();
        let frames = parser.push(": ping\n\ndata: {}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn named_frames_carry_their_event() {
        let mut parser = SseParser::new();
        let frames = parser.push("event: analysis\ndata: {\"summary\": \"ok\"}\n\n");
        assert_eq!(frames[0].event.as_deref(), Some("analysis"));

        let routed = classify(&frames[0]);
        assert!(matches!(
            routed,
            Some(Ingested::Monitoring { kind: MonitoringEventKind::Analysis, .. })
        ));
    }

    #[test]
    fn keepalive_events_drop_silently() {
        let frame = SseFrame { event: Some("keepalive".into()), data: "{}".into() };
        assert_eq!(classify(&frame), None);
    }

    #[test]
    fn workload_events_accept_both_field_spellings() {
        for field in ["workload_type", "workload"] {
            let frame = SseFrame {
                event: None,
                data: format!("{{\"{field}\": \"ai-ecg\", \"payload\": {{}}}}"),
            };
            let Some(Ingested::Workload(event)) = classify(&frame) else {
                panic!("expected a workload event via {field}");
            };
            assert_eq!(event.workload, WorkloadType::AiEcg);
        }
    }

    #[test]
    fn legacy_data_key_still_carries_the_payload() {
        let frame = SseFrame {
            event: None,
            data: "{\"workload_type\": \"rppg\", \"data\": {\"HR\": 70.0}}".into(),
        };
        let Some(Ingested::Workload(event)) = classify(&frame) else {
            panic!("expected a workload event");
        };
        assert_eq!(event.payload["HR"], 70.0);
    }

    #[test]
    fn unknown_workloads_drop_without_error() {
        let frame = SseFrame {
            event: None,
            data: "{\"workload_type\": \"mystery\", \"payload\": {}}".into(),
        };
        assert_eq!(classify(&frame), None);
    }
}
