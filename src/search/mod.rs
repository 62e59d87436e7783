use std::sync::Arc;

use tracing::{error, info};

use crate::api::client::SEARCH_RESULT_LIMIT;
use crate::api::types::SearchResult;
use crate::api::ApiClient;
use crate::session::{
    Action, AudioStatus, EventBus, SegmentationStatus, SessionState, SessionStore, UiEvent,
    MICROPHONE,
};

/// The facts the segmentation trigger decision is made from, lifted out
/// of the full state so the predicate stays pure and testable.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationInputs {
    pub uploaded_audio_path: Option<String>,
    pub audio_status: AudioStatus,
    pub has_uploaded_video_files: bool,
    pub video_playback_mode: bool,
    pub segmentation_status: SegmentationStatus,
}

impl SegmentationInputs {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            uploaded_audio_path: state.uploaded_audio_path.clone(),
            audio_status: state.audio_status,
            has_uploaded_video_files: state.has_uploaded_video_files,
            video_playback_mode: state.video_playback_mode,
            segmentation_status: state.segmentation_status,
        }
    }

    /// Segmentation wants a finished uploaded-audio session: a real
    /// file (never the live-microphone sentinel), a terminal audio
    /// pipeline, and, when video was uploaded too, playback mode.
    /// The idle check makes the trigger at-most-once per session.
    pub fn should_trigger(&self) -> bool {
        let Some(path) = self.uploaded_audio_path.as_deref() else {
            return false;
        };
        if path.is_empty() || path == MICROPHONE {
            return false;
        }
        if !self.audio_status.is_terminal() {
            return false;
        }
        if self.has_uploaded_video_files && !self.video_playback_mode {
            return false;
        }
        self.segmentation_status == SegmentationStatus::Idle
    }
}

/// Kicks off content segmentation when the session qualifies. Safe to
/// call repeatedly; non-idle status makes re-entry a no-op.
pub async fn maybe_trigger_segmentation(store: &Arc<SessionStore>, api: &ApiClient) {
    let snap = store.snapshot();
    if !SegmentationInputs::from_state(&snap).should_trigger() {
        return;
    }
    let Some(session_id) = snap.session_id else {
        return;
    };

    if !store.dispatch_for(&session_id, Action::SegmentationStarted) {
        return;
    }
    info!("starting content segmentation for session {}", session_id);
    match api.start_content_segmentation(&session_id).await {
        Ok(()) => {
            store.dispatch_for(&session_id, Action::SegmentationComplete);
        }
        Err(e) => {
            error!("content segmentation failed: {}", e);
            store.dispatch_for(&session_id, Action::SegmentationFailed);
        }
    }
}

/// Runs semantic search over the session's segmented content and routes
/// the hits to the timeline. The camera-view switch is an injected
/// callback so this module never reaches into view internals.
pub struct SearchOrchestrator {
    store: Arc<SessionStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    view_switch: Box<dyn Fn() + Send + Sync>,
}

impl SearchOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        api: Arc<ApiClient>,
        bus: EventBus,
        view_switch: Box<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self { store, api, bus, view_switch }
    }

    pub async fn perform_search(&self, query: &str) {
        self.store.dispatch(Action::SetSearchQuery(query.to_string()));

        if query.trim().is_empty() {
            self.store.dispatch(Action::ClearSearchResults);
            self.store.dispatch(Action::SetSearchError(None));
            return;
        }
        let Some(session_id) = self.store.session_id() else {
            self.store
                .dispatch(Action::SetSearchError(Some("No active session".to_string())));
            return;
        };

        self.store.dispatch(Action::SetSearchLoading(true));
        self.store.dispatch(Action::SetSearchError(None));

        match self.api.search(&session_id, query, SEARCH_RESULT_LIMIT).await {
            Ok(response) => {
                info!("search returned {} result(s)", response.results.len());
                for result in &response.results {
                    self.bus.publish(UiEvent::TimelineHighlight {
                        start_time: result.start_time,
                        end_time: result.end_time,
                        topic: result.topic.clone(),
                    });
                }
                let snap = self.store.snapshot();
                if !response.results.is_empty() && snap.uploaded_video_files.back.is_some() {
                    (self.view_switch)();
                }
                self.store.dispatch(Action::SetSearchResults(response.results));
            }
            Err(e) => {
                error!("search failed: {}", e);
                self.store.dispatch(Action::ClearSearchResults);
                self.store.dispatch(Action::SetSearchError(Some(e.to_string())));
            }
        }
        self.store.dispatch(Action::SetSearchLoading(false));
    }

    /// Jump playback to a chosen hit.
    pub fn jump_to(&self, result: &SearchResult) {
        self.bus.publish(UiEvent::SeekRequest { time: result.start_time });
    }
}
