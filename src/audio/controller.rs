use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::monitoring;
use crate::session::{
    Action, AudioStatus, CameraRole, EventBus, ProcessingMode, SessionState, SessionStore,
    VideoStatus, MICROPHONE,
};
use crate::video::VideoController;

use super::timer::RecordingTimer;

/// Grace-period notification window after a stop, mirrored by the
/// transient `just_stopped_recording` flag.
const JUST_STOPPED_CLEAR: Duration = Duration::from_millis(2000);

/// What the stop path must do, decided up-front from one snapshot.
/// Pure so the branch matrix is testable without a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopPlan {
    /// Live microphone capture to stop remotely; downstream transcription
    /// keeps running, so audio status is preserved.
    pub stop_microphone: bool,
    pub force_no_devices: bool,
    /// Recording status but nothing was actually captured: demote to ready.
    pub demote_recording_status: bool,
    pub stop_video: bool,
    pub video_fallback_no_config: bool,
    /// Capability present but analytics idle: reconcile status + clear slots.
    pub reconcile_idle_video: bool,
    pub clear_processing_mode: bool,
    pub clear_uploaded_path: bool,
}

pub fn plan_stop(snap: &SessionState) -> StopPlan {
    let was_recording_audio =
        snap.has_audio_devices && snap.uploaded_audio_path.as_deref() == Some(MICROPHONE);
    let was_video_active = snap.video_analytics_active && snap.has_video_capability();

    StopPlan {
        stop_microphone: snap.session_id.is_some() && was_recording_audio,
        force_no_devices: !snap.has_audio_devices,
        demote_recording_status: snap.has_audio_devices
            && !was_recording_audio
            && snap.audio_status == AudioStatus::Recording,
        stop_video: was_video_active && snap.session_id.is_some(),
        video_fallback_no_config: !snap.has_video_capability(),
        reconcile_idle_video: snap.has_video_capability() && !was_video_active,
        // Processing continues asynchronously only for a live mic session.
        clear_processing_mode: !was_recording_audio || !snap.has_audio_devices,
        clear_uploaded_path: snap.uploaded_audio_path.as_deref() == Some(MICROPHONE)
            && !was_recording_audio,
    }
}

/// Orchestrates the microphone/recording lifecycle: device checks, the
/// start/stop toggle, and the recording clock.
pub struct AudioController {
    store: Arc<SessionStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    video: Arc<VideoController>,
    timer: RecordingTimer,
}

impl AudioController {
    pub fn new(
        store: Arc<SessionStore>,
        api: Arc<ApiClient>,
        bus: EventBus,
        video: Arc<VideoController>,
    ) -> Self {
        Self { store, api, bus, video, timer: RecordingTimer::new() }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    /// Boot-time setup: clear any stale monitoring stream, then probe
    /// for audio devices.
    pub async fn bootstrap(&self) {
        monitoring::stop_existing(&self.store, &self.api).await;
        self.check_device_availability().await;
    }

    /// Remote device enumeration. Fails closed: a transport error or an
    /// empty list both land on `no-devices`.
    pub async fn check_device_availability(&self) {
        self.store.dispatch(Action::SetAudioDevicesLoading(true));
        let has_devices = match self.api.get_audio_devices().await {
            Ok(devices) => {
                info!("audio device check: {} device(s)", devices.len());
                !devices.is_empty()
            }
            Err(e) => {
                error!("audio device check failed: {}", e);
                false
            }
        };
        self.store.dispatch(Action::SetHasAudioDevices(has_devices));
        self.store.dispatch(Action::SetAudioDevicesLoading(false));
    }

    pub async fn toggle_recording(&mut self) -> Result<(), ApiError> {
        let snap = self.store.snapshot();
        if snap.is_recording_disabled(false) && !snap.is_recording {
            return Ok(());
        }
        if snap.is_recording {
            self.stop_recording(snap).await
        } else {
            self.start_recording(snap).await
        }
    }

    async fn start_recording(&mut self, snap: SessionState) -> Result<(), ApiError> {
        self.timer.reset();
        self.store.dispatch(Action::ResetFlow);
        self.store.dispatch(Action::SetJustStoppedRecording(false));

        self.store.dispatch(Action::StartProcessing);
        if snap.has_audio_devices {
            self.store.dispatch(Action::SetProcessingMode(Some(ProcessingMode::Microphone)));
            self.store.dispatch(Action::SetAudioStatus(AudioStatus::Recording));
            info!("starting recording with microphone");
        } else {
            self.store.dispatch(Action::SetProcessingMode(Some(ProcessingMode::VideoOnly)));
            info!("starting video-only recording (no audio devices)");
        }

        let session_id = match self.api.create_session().await {
            Ok(resp) => resp.session_id,
            Err(e) => {
                error!("failed to start recording: {}", e);
                self.bus.notice("Failed to start recording");
                self.store.dispatch(Action::ProcessingFailed);
                self.store.dispatch(Action::SetIsRecording(false));
                return Err(e);
            }
        };
        self.store.dispatch(Action::SetSessionId(Some(session_id.clone())));

        // Best-effort: a monitoring failure never aborts the recording.
        monitoring::restart_for_session(&self.store, &self.api, &session_id).await;

        if snap.has_audio_devices {
            self.store.dispatch(Action::SetUploadedAudioPath(MICROPHONE.to_string()));
            self.store.dispatch(Action::StartTranscription);
        }

        self.store.dispatch(Action::SetIsRecording(true));
        self.timer.start(Arc::clone(&self.store));

        if self.store.snapshot().has_video_capability() {
            self.video.start_for_session(&session_id).await;
        } else {
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::NoConfig));
        }

        Ok(())
    }

    async fn stop_recording(&mut self, snap: SessionState) -> Result<(), ApiError> {
        // Optimistic: the UI reflects the stop before any network I/O.
        self.store.dispatch(Action::SetIsRecording(false));
        self.timer.stop();
        self.schedule_just_stopped_clear(snap.session_id.clone());

        let plan = plan_stop(&snap);
        match self.run_stop_plan(&snap, &plan).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("failed to stop recording: {}", e);
                self.bus.notice("Failed to stop recording");
                // Conservative synchronous reset: no dangling loading or
                // partially-stopped flags.
                self.store.dispatch(Action::SetVideoAnalyticsStopping(false));
                self.store.dispatch(Action::SetAudioStatus(if snap.has_audio_devices {
                    AudioStatus::Ready
                } else {
                    AudioStatus::NoDevices
                }));
                self.store.dispatch(Action::SetVideoStatus(if snap.has_video_capability() {
                    VideoStatus::Ready
                } else {
                    VideoStatus::NoConfig
                }));
                self.store.dispatch(Action::SetProcessingMode(None));
                self.store.dispatch(Action::SetUploadedAudioPath(String::new()));
                Err(e)
            }
        }
    }

    async fn run_stop_plan(&self, snap: &SessionState, plan: &StopPlan) -> Result<(), ApiError> {
        if plan.stop_microphone {
            let session_id = snap.session_id.as_deref().unwrap_or_default();
            self.api.stop_microphone(session_id).await?;
            info!("microphone stopped; audio pipeline may continue downstream");
            // Audio status deliberately untouched: transcription is still live.
        } else if plan.force_no_devices {
            self.store.dispatch(Action::SetAudioStatus(AudioStatus::NoDevices));
        } else if plan.demote_recording_status {
            self.store.dispatch(Action::SetAudioStatus(AudioStatus::Ready));
        }

        if plan.stop_video {
            let session_id = snap.session_id.as_deref().unwrap_or_default();
            self.video.stop(session_id).await?;
        } else if plan.video_fallback_no_config {
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::NoConfig));
        } else if plan.reconcile_idle_video {
            self.store.dispatch(Action::SetVideoStatus(VideoStatus::Ready));
            for role in CameraRole::ALL {
                self.store.dispatch(Action::SetCameraStream(role, String::new()));
            }
            self.store.dispatch(Action::SetActiveStream(None));
            self.store.dispatch(Action::SetVideoAnalyticsActive(false));
        }

        if plan.clear_processing_mode {
            self.store.dispatch(Action::SetProcessingMode(None));
        }
        if plan.clear_uploaded_path {
            self.store.dispatch(Action::SetUploadedAudioPath(String::new()));
        }

        Ok(())
    }

    /// The transient stop flag auto-clears after the grace period,
    /// session-tagged so a newer session never sees a stale clear.
    fn schedule_just_stopped_clear(&self, session_id: Option<String>) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            tokio::time::sleep(JUST_STOPPED_CLEAR).await;
            match session_id {
                Some(id) => {
                    if !store.dispatch_for(&id, Action::SetJustStoppedRecording(false)) {
                        warn!("skipped just-stopped clear for superseded session {}", id);
                    }
                }
                // Session never materialized; clear unconditionally.
                None => store.dispatch(Action::SetJustStoppedRecording(false)),
            }
        });
    }
}
