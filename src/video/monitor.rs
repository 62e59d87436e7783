use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::types::{MonitorUpdate, PipelineRunStatus};
use crate::api::{ApiClient, ApiError};
use crate::session::{Action, CameraRole, SessionStore, VideoStatus};

/// The monitor endpoint registers shortly after the pipelines start;
/// a 404 gets one delayed retry before giving up.
const NOT_FOUND_RETRY: Duration = Duration::from_millis(1500);

/// What one health frame means for session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorVerdict {
    /// At least one pipeline is still running.
    Streaming,
    /// Every pipeline stopped cleanly.
    Completed,
    /// At least one pipeline stopped with an error.
    Failed,
}

impl MonitorVerdict {
    /// Frames with no pipelines carry no information and yield nothing.
    pub fn evaluate(update: &MonitorUpdate) -> Option<MonitorVerdict> {
        if update.pipelines.is_empty() {
            return None;
        }
        if update
            .pipelines
            .iter()
            .any(|p| p.status == PipelineRunStatus::StoppedError)
        {
            return Some(MonitorVerdict::Failed);
        }
        let any_running = update
            .pipelines
            .iter()
            .any(|p| p.status == PipelineRunStatus::Running);
        if any_running {
            Some(MonitorVerdict::Streaming)
        } else {
            Some(MonitorVerdict::Completed)
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorVerdict::Streaming)
    }
}

/// Applies a verdict to the store; returns whether the monitor should
/// stop watching. Completion always enters playback mode so the UI can
/// offer the just-recorded footage; only failure clears the stream
/// slots.
pub fn apply_verdict(store: &SessionStore, verdict: MonitorVerdict) -> bool {
    match verdict {
        MonitorVerdict::Streaming => {
            store.dispatch(Action::SetVideoStatus(VideoStatus::Streaming));
            false
        }
        MonitorVerdict::Completed => {
            info!("all pipelines finished; entering playback mode");
            store.dispatch(Action::SetVideoStatus(VideoStatus::Completed));
            deactivate(store);
            store.dispatch(Action::SetHasUploadedVideoFiles(true));
            store.dispatch(Action::SetVideoPlaybackMode(true));
            true
        }
        MonitorVerdict::Failed => {
            warn!("pipeline reported stopped_error; marking video failed");
            store.dispatch(Action::SetVideoStatus(VideoStatus::Failed));
            deactivate(store);
            for role in CameraRole::ALL {
                store.dispatch(Action::SetCameraStream(role, String::new()));
            }
            store.dispatch(Action::SetActiveStream(None));
            true
        }
    }
}

fn deactivate(store: &SessionStore) {
    store.dispatch(Action::SetVideoAnalyticsActive(false));
    store.dispatch(Action::SetVideoAnalyticsLoading(false));
    store.dispatch(Action::SetVideoAnalyticsStopping(false));
}

/// Watches the pipeline-health stream for one session. Starting a new
/// watch cancels the previous one, so at most one stream is ever open.
pub struct PipelineMonitor {
    store: Arc<SessionStore>,
    api: Arc<ApiClient>,
    token: Mutex<Option<CancellationToken>>,
}

impl PipelineMonitor {
    pub fn new(store: Arc<SessionStore>, api: Arc<ApiClient>) -> Self {
        Self { store, api, token: Mutex::new(None) }
    }

    pub async fn start(&self, session_id: &str) {
        let token = CancellationToken::new();
        if let Some(old) = self.token.lock().await.replace(token.clone()) {
            old.cancel();
        }

        let store = Arc::clone(&self.store);
        let api = Arc::clone(&self.api);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("pipeline monitor cancelled for session {}", session_id);
                }
                _ = watch(store, api, session_id.clone()) => {
                    debug!("pipeline monitor finished for session {}", session_id);
                }
            }
        });
    }

    pub async fn stop(&self) {
        if let Some(token) = self.token.lock().await.take() {
            token.cancel();
        }
    }
}

/// 404 means the session is not registered yet; anything else ends the
/// watch. Pipelines can take several seconds to come up, so every 404
/// re-arms the delay.
fn retry_delay(err: &ApiError) -> Option<Duration> {
    err.is_not_found().then_some(NOT_FOUND_RETRY)
}

async fn watch(store: Arc<SessionStore>, api: Arc<ApiClient>, session_id: String) {
    loop {
        let response = match api.monitor_stream(&session_id).await {
            Ok(resp) => resp,
            Err(e) => match retry_delay(&e) {
                Some(delay) => {
                    debug!("monitor endpoint not ready yet, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                None => {
                    warn!("pipeline monitor connect failed: {}", e);
                    return;
                }
            },
        };

        match consume(&store, &session_id, response).await {
            Ok(true) => return,
            Ok(false) => {
                // Stream closed without a terminal verdict; the session is
                // over or the server restarted. Either way, stop watching.
                debug!("monitor stream ended without terminal verdict");
                return;
            }
            Err(e) => {
                warn!("pipeline monitor stream error: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_not_found_rearms_the_retry() {
        let not_found = ApiError::Status { code: 404, message: "no session".into() };
        // Consecutive 404s each get the same delay; the watch never
        // gives up on them.
        assert_eq!(retry_delay(&not_found), Some(NOT_FOUND_RETRY));
        assert_eq!(retry_delay(&not_found), Some(NOT_FOUND_RETRY));
    }

    #[test]
    fn other_errors_end_the_watch() {
        let server = ApiError::Status { code: 500, message: "boom".into() };
        assert_eq!(retry_delay(&server), None);
        assert_eq!(retry_delay(&ApiError::Unavailable("down".into())), None);
    }
}

/// Reads newline-delimited JSON health frames until a terminal verdict
/// (Ok(true)), the stream closes (Ok(false)), or transport fails.
async fn consume(
    store: &SessionStore,
    session_id: &str,
    response: reqwest::Response,
) -> Result<bool, ApiError> {
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = buffer.find('\n') {
            let line = buffer[..pos].trim().to_string();
            buffer.drain(..=pos);
            if line.is_empty() {
                continue;
            }
            let update: MonitorUpdate = match serde_json::from_str(&line) {
                Ok(u) => u,
                Err(e) => {
                    debug!("skipping malformed monitor frame: {}", e);
                    continue;
                }
            };
            if let Some(verdict) = MonitorVerdict::evaluate(&update) {
                // Verdicts only apply while this is still the live session.
                if !store.session_matches(session_id) {
                    debug!("dropping monitor verdict for superseded session");
                    return Ok(true);
                }
                if apply_verdict(store, verdict) {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}
