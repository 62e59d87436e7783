use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::types::{PipelineRequest, PipelineStartResult, PipelineStopRequest};
use crate::api::{ApiClient, ApiError};
use crate::monitoring;
use crate::session::{
    Action, ActiveStream, AudioStatus, CameraRole, EventBus, ProcessingMode, SessionStore,
    UploadedVideoFiles, VideoStatus,
};

use super::monitor::PipelineMonitor;

/// Camera sources mapped to their canonical pipeline names. Blank
/// sources are skipped; an empty result means no video capability.
pub fn build_pipeline_requests(front: &str, back: &str, board: &str) -> Vec<PipelineRequest> {
    let mut requests = Vec::new();
    for (role, source) in [
        (CameraRole::Front, front),
        (CameraRole::Back, back),
        (CameraRole::Content, board),
    ] {
        let source = source.trim();
        if !source.is_empty() {
            requests.push(PipelineRequest {
                pipeline_name: role.pipeline_name().to_string(),
                source: source.to_string(),
            });
        }
    }
    requests
}

/// One start result, interpreted: a known pipeline that reported
/// success with a non-empty stream handle, or nothing.
pub fn interpret_start_result(result: &PipelineStartResult) -> Option<(CameraRole, String)> {
    if result.status != "success" {
        return None;
    }
    let stream = result.hls_stream.as_deref().filter(|s| !s.is_empty())?;
    let role = role_for_pipeline(&result.pipeline_name)?;
    Some((role, stream.to_string()))
}

/// Upload playback prefers the back camera, then content, then front.
pub fn default_active_stream(roles: &[CameraRole]) -> Option<ActiveStream> {
    if roles.contains(&CameraRole::Back) {
        Some(ActiveStream::Back)
    } else if roles.contains(&CameraRole::Content) {
        Some(ActiveStream::Content)
    } else if roles.contains(&CameraRole::Front) {
        Some(ActiveStream::Front)
    } else {
        None
    }
}

fn role_for_pipeline(name: &str) -> Option<CameraRole> {
    match name {
        "front" => Some(CameraRole::Front),
        "back" => Some(CameraRole::Back),
        "content" => Some(CameraRole::Content),
        other => {
            warn!("ignoring start result for unknown pipeline {:?}", other);
            None
        }
    }
}

/// Join the configured upload base directory with a bare file name.
/// Paths are opaque strings for the backend host; no local existence
/// check, and the separator style of the base is preserved.
pub fn construct_file_path(base_dir: &str, file_name: &str) -> String {
    if base_dir.is_empty() {
        return file_name.to_string();
    }
    if base_dir.ends_with('/') || base_dir.ends_with('\\') {
        format!("{}{}", base_dir, file_name)
    } else if base_dir.contains('\\') {
        format!("{}\\{}", base_dir, file_name)
    } else {
        format!("{}/{}", base_dir, file_name)
    }
}

/// Files selected for an upload session: optional audio plus up to
/// three video slots.
#[derive(Debug, Clone, Default)]
pub struct UploadSelection {
    /// Original file name and raw contents of the audio file, if any.
    pub audio: Option<(String, Vec<u8>)>,
    pub video: UploadedVideoFiles,
    pub base_dir: String,
}

impl UploadSelection {
    pub fn video_requests(&self) -> Vec<PipelineRequest> {
        self.video
            .front
            .iter()
            .map(|f| (CameraRole::Front, f))
            .chain(self.video.back.iter().map(|f| (CameraRole::Back, f)))
            .chain(self.video.board.iter().map(|f| (CameraRole::Content, f)))
            .map(|(role, file)| PipelineRequest {
                pipeline_name: role.pipeline_name().to_string(),
                source: construct_file_path(&self.base_dir, file),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && !self.video.any()
    }
}

/// Drives video-analytics pipelines: live starts from configured
/// cameras, upload-mode starts from selected files, and the stop path.
pub struct VideoController {
    store: Arc<SessionStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    monitor: PipelineMonitor,
}

impl VideoController {
    pub fn new(store: Arc<SessionStore>, api: Arc<ApiClient>, bus: EventBus) -> Self {
        let monitor = PipelineMonitor::new(Arc::clone(&store), Arc::clone(&api));
        Self { store, api, bus, monitor }
    }

    /// Live start from the configured camera sources.
    pub async fn start_for_session(&self, session_id: &str) {
        let snap = self.store.snapshot();
        let requests =
            build_pipeline_requests(&snap.front_camera, &snap.back_camera, &snap.board_camera);
        if requests.is_empty() {
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::NoConfig));
            return;
        }
        self.start_with_pipelines(&requests, session_id, None).await;
    }

    /// One bulk start call, interpreted per entry. Streaming iff at
    /// least one pipeline came up; otherwise failed.
    async fn start_with_pipelines(
        &self,
        requests: &[PipelineRequest],
        session_id: &str,
        preferred_stream: Option<ActiveStream>,
    ) {
        self.store.dispatch(Action::SetVideoAnalyticsLoading(true));

        let response = match self.api.start_video_analytics(requests, session_id).await {
            Ok(resp) => resp,
            Err(e) => {
                error!("video analytics start failed: {}", e);
                self.store.dispatch(Action::SetVideoAnalyticsLoading(false));
                self.store.dispatch(Action::SetVideoStatus(VideoStatus::Failed));
                return;
            }
        };

        let mut started = Vec::new();
        for result in &response.results {
            match interpret_start_result(result) {
                Some((role, stream)) => {
                    self.store.dispatch(Action::SetCameraStream(role, stream));
                    started.push(role);
                }
                None => warn!(
                    "pipeline {} did not start: {}",
                    result.pipeline_name,
                    result.error.as_deref().unwrap_or("no stream handle")
                ),
            }
        }

        if started.is_empty() {
            self.store.dispatch(Action::SetVideoAnalyticsLoading(false));
            self.store.dispatch(Action::SetVideoAnalyticsActive(false));
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::Failed));
            return;
        }

        info!("{}/{} pipeline(s) streaming", started.len(), requests.len());
        self.store.dispatch(Action::SetVideoPlaybackMode(false));
        self.store.dispatch(Action::SetVideoAnalyticsActive(true));
        let active = preferred_stream.or(Some(ActiveStream::All));
        self.store.dispatch(Action::SetActiveStream(active));
        self.monitor.start(session_id).await;
    }

    /// Stops every canonical pipeline and tears the video surface down.
    pub async fn stop(&self, session_id: &str) -> Result<(), ApiError> {
        self.store.dispatch(Action::SetVideoAnalyticsStopping(true));
        self.monitor.stop().await;

        let requests: Vec<PipelineStopRequest> = CameraRole::ALL
            .iter()
            .map(|role| PipelineStopRequest { pipeline_name: role.pipeline_name().to_string() })
            .collect();

        match self.api.stop_video_analytics(&requests, session_id).await {
            Ok(()) => {
                for role in CameraRole::ALL {
                    self.store.dispatch(Action::SetCameraStream(role, String::new()));
                }
                self.store.dispatch(Action::SetActiveStream(None));
                self.store.dispatch(Action::SetVideoAnalyticsActive(false));
                self.store.dispatch(Action::SetVideoStatus(VideoStatus::Completed));
                self.store
                    .dispatch(Action::SetUploadedVideoFiles(UploadedVideoFiles::default()));
                self.store.dispatch(Action::SetVideoAnalyticsStopping(false));
                Ok(())
            }
            Err(e) => {
                error!("video analytics stop failed: {}", e);
                self.store.dispatch(Action::SetVideoStatus(VideoStatus::Failed));
                self.store.dispatch(Action::SetVideoAnalyticsStopping(false));
                Err(e)
            }
        }
    }

    /// Upload-mode session: optional audio file plus recorded footage,
    /// processed by the same pipelines as a live session.
    pub async fn upload_and_start(&self, selection: UploadSelection) -> Result<(), ApiError> {
        let snap = self.store.snapshot();
        if snap.is_upload_disabled() {
            return Ok(());
        }
        if selection.is_empty() {
            return Ok(());
        }

        self.store.dispatch(Action::ResetFlow);
        self.store.dispatch(Action::StartProcessing);

        let session_id = match self.api.create_session().await {
            Ok(resp) => resp.session_id,
            Err(e) => {
                error!("failed to start upload session: {}", e);
                self.bus.notice("Failed to start processing");
                self.store.dispatch(Action::ProcessingFailed);
                return Err(e);
            }
        };
        self.store.dispatch(Action::SetSessionId(Some(session_id.clone())));
        monitoring::restart_for_session(&self.store, &self.api, &session_id).await;

        match &selection.audio {
            Some((file_name, bytes)) => {
                self.store.dispatch(Action::SetProcessingMode(Some(ProcessingMode::Audio)));
                match self.api.upload_audio(file_name, bytes.clone()).await {
                    Ok(resp) => {
                        self.store.dispatch(Action::SetUploadedAudioPath(resp.path));
                    }
                    Err(e) => {
                        error!("audio upload failed: {}", e);
                        self.bus.notice("Audio upload failed");
                        self.store.dispatch(Action::ProcessingFailed);
                        return Err(e);
                    }
                }
            }
            None => {
                self.store.dispatch(Action::SetProcessingMode(Some(ProcessingMode::VideoOnly)));
                self.store.dispatch(Action::SetAudioStatus(AudioStatus::NoDevices));
            }
        }

        let requests = selection.video_requests();
        if requests.is_empty() {
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::NoConfig));
            return Ok(());
        }

        self.store.dispatch(Action::SetUploadedVideoFiles(selection.video.clone()));
        self.store.dispatch(Action::SetHasUploadedVideoFiles(true));

        let roles: Vec<CameraRole> = requests
            .iter()
            .filter_map(|r| role_for_pipeline(&r.pipeline_name))
            .collect();
        let preferred = default_active_stream(&roles);
        self.start_with_pipelines(&requests, &session_id, preferred).await;
        Ok(())
    }
}
