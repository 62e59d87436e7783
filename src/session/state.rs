use serde::{Deserialize, Serialize};

use crate::api::types::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Transcripts,
    Summary,
    Mindmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    Audio,
    VideoOnly,
    Microphone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioStatus {
    Idle,
    Checking,
    Ready,
    Recording,
    Processing,
    Transcribing,
    Summarizing,
    Mindmapping,
    Complete,
    Error,
    NoDevices,
}

impl AudioStatus {
    /// Terminal for the audio pipeline: segmentation may be gated on it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AudioStatus::Complete | AudioStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoStatus {
    Idle,
    Ready,
    Starting,
    Streaming,
    Stopping,
    Failed,
    Completed,
    NoConfig,
    Playback,
}

impl VideoStatus {
    /// Sticky terminal values: the reactive recompute must not overwrite
    /// them, only an explicit reset may.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

/// Which camera view the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveStream {
    Front,
    Back,
    Content,
    All,
}

/// Canonical pipeline names on the wire: front / back / content.
/// The board camera maps to `content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraRole {
    Front,
    Back,
    Content,
}

impl CameraRole {
    pub fn pipeline_name(&self) -> &'static str {
        match self {
            CameraRole::Front => "front",
            CameraRole::Back => "back",
            CameraRole::Content => "content",
        }
    }

    pub const ALL: [CameraRole; 3] = [CameraRole::Front, CameraRole::Back, CameraRole::Content];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationStatus {
    Idle,
    Running,
    Complete,
    Failed,
}

/// File names the user selected for playback-mode uploads, by camera slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedVideoFiles {
    pub front: Option<String>,
    pub back: Option<String>,
    pub board: Option<String>,
}

impl UploadedVideoFiles {
    pub fn any(&self) -> bool {
        self.front.is_some() || self.back.is_some() || self.board.is_some()
    }
}

/// The recording sentinel: audio came from the live microphone, not an
/// uploaded file.
pub const MICROPHONE: &str = "MICROPHONE";

/// Canonical client-side session state. Mutation happens exclusively
/// through `reduce`; views and controllers never poke fields directly.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Monotonic version for stale-writer rejection.
    pub version: u64,

    pub ai_processing: bool,
    pub summary_enabled: bool,
    pub summary_loading: bool,
    pub summary_complete: bool,
    pub mindmap_enabled: bool,
    pub mindmap_loading: bool,
    pub active_tab: Tab,
    pub auto_switched: bool,
    pub auto_switched_to_mindmap: bool,
    pub should_start_summary: bool,
    pub should_start_mindmap: bool,

    pub session_id: Option<String>,
    pub project_location: String,
    pub uploaded_audio_path: Option<String>,
    pub processing_mode: Option<ProcessingMode>,

    pub front_camera: String,
    pub back_camera: String,
    pub board_camera: String,
    pub front_camera_stream: String,
    pub back_camera_stream: String,
    pub board_camera_stream: String,
    pub active_stream: Option<ActiveStream>,

    pub video_analytics_loading: bool,
    pub video_analytics_active: bool,
    pub video_analytics_stopping: bool,

    pub audio_status: AudioStatus,
    pub video_status: VideoStatus,

    // Hardware capability, not session state. Survives session resets.
    pub has_audio_devices: bool,
    pub audio_devices_loading: bool,

    pub is_recording: bool,
    pub just_stopped_recording: bool,

    pub has_uploaded_video_files: bool,
    pub uploaded_video_files: UploadedVideoFiles,
    pub video_playback_mode: bool,
    pub monitoring_active: bool,

    pub segmentation_status: SegmentationStatus,
    pub search_query: String,
    pub search_results: Vec<SearchResult>,
    pub search_loading: bool,
    pub search_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            version: 0,
            ai_processing: false,
            summary_enabled: false,
            summary_loading: false,
            summary_complete: false,
            mindmap_enabled: false,
            mindmap_loading: false,
            active_tab: Tab::Transcripts,
            auto_switched: false,
            auto_switched_to_mindmap: false,
            should_start_summary: false,
            should_start_mindmap: false,
            session_id: None,
            project_location: "storage/".to_string(),
            uploaded_audio_path: None,
            processing_mode: None,
            front_camera: String::new(),
            back_camera: String::new(),
            board_camera: String::new(),
            front_camera_stream: String::new(),
            back_camera_stream: String::new(),
            board_camera_stream: String::new(),
            active_stream: None,
            video_analytics_loading: false,
            video_analytics_active: false,
            video_analytics_stopping: false,
            audio_status: AudioStatus::Idle,
            video_status: VideoStatus::Idle,
            has_audio_devices: true,
            audio_devices_loading: false,
            is_recording: false,
            just_stopped_recording: false,
            has_uploaded_video_files: false,
            uploaded_video_files: UploadedVideoFiles::default(),
            video_playback_mode: false,
            monitoring_active: false,
            segmentation_status: SegmentationStatus::Idle,
            search_query: String::new(),
            search_results: Vec::new(),
            search_loading: false,
            search_error: None,
        }
    }
}

/// Strict state delta. This is the ONLY way session state mutates.
#[derive(Debug, Clone)]
pub enum Action {
    // Session lifecycle
    StartProcessing,
    ProcessingFailed,
    ResetFlow,
    SetSessionId(Option<String>),
    SetProjectLocation(String),
    SetProcessingMode(Option<ProcessingMode>),

    // Audio path
    SetUploadedAudioPath(String),
    SetHasAudioDevices(bool),
    SetAudioDevicesLoading(bool),
    SetAudioStatus(AudioStatus),
    SetIsRecording(bool),
    SetJustStoppedRecording(bool),
    StartTranscription,
    TranscriptionComplete,
    ClearSummaryStartRequest,
    FirstSummaryToken,
    SummaryStreamComplete,
    SummaryDone,
    MindmapStart,
    MindmapSuccess,
    MindmapFailed,
    ClearMindmapStartRequest,
    SetActiveTab(Tab),

    // Video path
    SetFrontCamera(String),
    SetBackCamera(String),
    SetBoardCamera(String),
    SetCameraStream(CameraRole, String),
    SetActiveStream(Option<ActiveStream>),
    SetVideoAnalyticsLoading(bool),
    SetVideoAnalyticsActive(bool),
    SetVideoAnalyticsStopping(bool),
    SetVideoStatus(VideoStatus),
    /// Reactive recompute funnel: `no-config ⇄ ready` from capability,
    /// terminal values sticky.
    ReconcileVideoStatus,
    SetHasUploadedVideoFiles(bool),
    SetUploadedVideoFiles(UploadedVideoFiles),
    SetVideoPlaybackMode(bool),
    SetMonitoringActive(bool),

    // Search / segmentation
    SegmentationStarted,
    SegmentationComplete,
    SegmentationFailed,
    SetSearchQuery(String),
    SetSearchResults(Vec<SearchResult>),
    ClearSearchResults,
    SetSearchLoading(bool),
    SetSearchError(Option<String>),
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reduction: State + Action -> mutated State. Infallible, so a
    /// committed action is always fully applied (no partial writes).
    pub fn reduce(&mut self, action: Action) {
        self.version += 1;

        match action {
            Action::StartProcessing => {
                self.ai_processing = true;
                self.summary_enabled = false;
                self.summary_loading = false;
                self.summary_complete = false;
                self.mindmap_enabled = false;
                self.mindmap_loading = false;
                self.active_tab = Tab::Transcripts;
                self.auto_switched = false;
                self.auto_switched_to_mindmap = false;
                self.session_id = None;
                self.uploaded_audio_path = None;
                self.should_start_summary = false;
                self.should_start_mindmap = false;
                self.video_analytics_loading = false;
                self.video_analytics_active = false;
            }

            Action::ProcessingFailed => {
                self.ai_processing = false;
                self.summary_loading = false;
                self.summary_complete = false;
                self.mindmap_loading = false;
                self.video_analytics_loading = false;
                self.video_analytics_active = false;
                self.processing_mode = None;
                self.audio_status = AudioStatus::Error;
                self.video_status = VideoStatus::Failed;
                self.is_recording = false;
                self.video_analytics_stopping = false;
            }

            Action::ResetFlow => {
                // Wholesale reset, minus hardware capability flags.
                let preserved_devices = self.has_audio_devices;
                let preserved_loading = self.audio_devices_loading;
                let version = self.version;
                *self = SessionState::default();
                self.version = version;
                self.has_audio_devices = preserved_devices;
                self.audio_devices_loading = preserved_loading;
                self.audio_status =
                    super::status::baseline_audio_status(preserved_devices, preserved_loading);
            }

            Action::SetSessionId(id) => {
                // Empty/whitespace ids are discarded, never committed.
                if let Some(id) = id {
                    if !id.trim().is_empty() {
                        self.session_id = Some(id);
                    }
                }
            }

            Action::SetProjectLocation(loc) => self.project_location = loc,
            Action::SetProcessingMode(mode) => self.processing_mode = mode,

            Action::SetUploadedAudioPath(path) => {
                if path == MICROPHONE {
                    self.audio_status = AudioStatus::Recording;
                } else if !path.is_empty() {
                    self.audio_status = AudioStatus::Processing;
                }
                self.uploaded_audio_path = if path.is_empty() { None } else { Some(path) };
            }

            Action::SetHasAudioDevices(has) => {
                self.has_audio_devices = has;
                self.audio_status = if has { AudioStatus::Ready } else { AudioStatus::NoDevices };
            }

            Action::SetAudioDevicesLoading(loading) => {
                self.audio_devices_loading = loading;
                if loading {
                    self.audio_status = AudioStatus::Checking;
                }
            }

            Action::SetAudioStatus(status) => self.audio_status = status,

            Action::SetIsRecording(recording) => {
                self.is_recording = recording;
                if recording {
                    self.just_stopped_recording = false;
                    if self.has_audio_devices {
                        self.audio_status = AudioStatus::Recording;
                    }
                    if self.video_status == VideoStatus::Ready {
                        self.video_status = VideoStatus::Starting;
                    }
                } else {
                    self.just_stopped_recording = true;
                }
            }

            Action::SetJustStoppedRecording(v) => self.just_stopped_recording = v,

            Action::StartTranscription => self.audio_status = AudioStatus::Transcribing,

            Action::TranscriptionComplete => {
                self.summary_enabled = true;
                self.summary_loading = true;
                self.summary_complete = false;
                self.should_start_summary = true;
                self.audio_status = AudioStatus::Summarizing;
                if !self.auto_switched {
                    self.active_tab = Tab::Summary;
                    self.auto_switched = true;
                }
            }

            Action::ClearSummaryStartRequest => self.should_start_summary = false,

            Action::FirstSummaryToken => {
                self.summary_loading = false;
                self.audio_status = AudioStatus::Summarizing;
            }

            Action::SummaryStreamComplete => {
                self.summary_loading = false;
                self.summary_complete = true;
                self.audio_status = AudioStatus::Summarizing;
            }

            Action::SummaryDone => {
                self.ai_processing = false;
                self.summary_complete = true;
                self.mindmap_enabled = true;
                self.mindmap_loading = true;
                self.should_start_mindmap = true;
                self.audio_status = AudioStatus::Mindmapping;
                if !self.auto_switched_to_mindmap {
                    self.active_tab = Tab::Mindmap;
                    self.auto_switched_to_mindmap = true;
                }
            }

            Action::MindmapStart => {
                self.mindmap_loading = true;
                self.should_start_mindmap = true;
                self.audio_status = AudioStatus::Mindmapping;
            }

            Action::MindmapSuccess => {
                self.mindmap_loading = false;
                self.should_start_mindmap = false;
                self.audio_status = AudioStatus::Complete;
            }

            Action::MindmapFailed => {
                self.mindmap_loading = false;
                self.should_start_mindmap = false;
                self.audio_status = AudioStatus::Error;
            }

            Action::ClearMindmapStartRequest => self.should_start_mindmap = false,

            Action::SetActiveTab(tab) => self.active_tab = tab,

            // Camera-source edits change capability, so the status
            // recompute rides along with them.
            Action::SetFrontCamera(v) => {
                self.front_camera = v;
                self.reconcile_video();
            }
            Action::SetBackCamera(v) => {
                self.back_camera = v;
                self.reconcile_video();
            }
            Action::SetBoardCamera(v) => {
                self.board_camera = v;
                self.reconcile_video();
            }

            Action::SetCameraStream(role, url) => match role {
                CameraRole::Front => self.front_camera_stream = url,
                CameraRole::Back => self.back_camera_stream = url,
                CameraRole::Content => self.board_camera_stream = url,
            },

            Action::SetActiveStream(stream) => self.active_stream = stream,

            Action::SetVideoAnalyticsLoading(loading) => {
                self.video_analytics_loading = loading;
                if loading {
                    self.video_status = VideoStatus::Starting;
                }
            }

            Action::SetVideoAnalyticsActive(active) => {
                self.video_analytics_active = active;
                if active {
                    self.video_status = VideoStatus::Streaming;
                    self.video_analytics_loading = false;
                } else if !self.video_analytics_loading && !self.video_status.is_terminal() {
                    self.video_status = VideoStatus::Ready;
                }
            }

            Action::SetVideoAnalyticsStopping(stopping) => {
                self.video_analytics_stopping = stopping;
                if stopping {
                    self.video_status = VideoStatus::Stopping;
                }
            }

            Action::SetVideoStatus(status) => self.video_status = status,

            Action::ReconcileVideoStatus => self.reconcile_video(),

            Action::SetHasUploadedVideoFiles(has) => {
                self.has_uploaded_video_files = has;
                if has && self.video_status == VideoStatus::NoConfig {
                    self.video_status = VideoStatus::Ready;
                }
            }

            Action::SetUploadedVideoFiles(files) => self.uploaded_video_files = files,
            Action::SetVideoPlaybackMode(v) => self.video_playback_mode = v,
            Action::SetMonitoringActive(v) => self.monitoring_active = v,

            Action::SegmentationStarted => self.segmentation_status = SegmentationStatus::Running,
            Action::SegmentationComplete => self.segmentation_status = SegmentationStatus::Complete,
            Action::SegmentationFailed => self.segmentation_status = SegmentationStatus::Failed,

            Action::SetSearchQuery(q) => self.search_query = q,
            Action::SetSearchResults(results) => self.search_results = results,
            Action::ClearSearchResults => self.search_results.clear(),
            Action::SetSearchLoading(v) => self.search_loading = v,
            Action::SetSearchError(e) => self.search_error = e,
        }
    }

    fn reconcile_video(&mut self) {
        self.video_status =
            super::status::derive_video_status(self.video_status, self.has_video_capability());
    }

    // --- Derived read-only views ----------------------------------------

    /// Any configured camera source, or uploaded footage.
    pub fn has_video_capability(&self) -> bool {
        self.has_camera_config() || self.has_uploaded_video_files
    }

    pub fn has_camera_config(&self) -> bool {
        !self.front_camera.trim().is_empty()
            || !self.back_camera.trim().is_empty()
            || !self.board_camera.trim().is_empty()
    }

    pub fn has_live_capability(&self) -> bool {
        self.has_audio_devices || self.has_camera_config()
    }

    pub fn is_audio_busy(&self) -> bool {
        matches!(
            self.audio_status,
            AudioStatus::Processing
                | AudioStatus::Transcribing
                | AudioStatus::Summarizing
                | AudioStatus::Mindmapping
        )
    }

    pub fn is_video_busy(&self) -> bool {
        matches!(
            self.video_status,
            VideoStatus::Starting | VideoStatus::Streaming | VideoStatus::Stopping
        )
    }

    pub fn is_recording_disabled(&self, uploading: bool) -> bool {
        self.audio_devices_loading
            || !self.has_live_capability()
            || uploading
            || self.is_audio_busy()
            || self.is_video_busy()
    }

    pub fn is_upload_disabled(&self) -> bool {
        let has_audio = self.uploaded_audio_path.is_some();
        let has_video = self.has_uploaded_video_files;
        let audio_done = self.audio_status.is_terminal();
        let streams_stopped = matches!(
            self.video_status,
            VideoStatus::Completed | VideoStatus::Ready | VideoStatus::NoConfig | VideoStatus::Failed
        );
        let audio_ready = !has_audio || audio_done;
        let video_ready = !has_video || streams_stopped;
        self.is_recording || !(audio_ready && video_ready)
    }

    /// Playback mode as the views see it: pipelines done + footage on disk.
    pub fn is_playback_mode(&self) -> bool {
        self.video_status == VideoStatus::Completed && self.uploaded_video_files.any()
    }

    /// Uploaded files mapped to their canonical pipeline roles
    /// (board slot surfaces as `content`).
    pub fn available_video_files(&self) -> Vec<(CameraRole, String)> {
        let mut available = Vec::new();
        if let Some(f) = &self.uploaded_video_files.front {
            available.push((CameraRole::Front, f.clone()));
        }
        if let Some(f) = &self.uploaded_video_files.back {
            available.push((CameraRole::Back, f.clone()));
        }
        if let Some(f) = &self.uploaded_video_files.board {
            available.push((CameraRole::Content, f.clone()));
        }
        available
    }
}
