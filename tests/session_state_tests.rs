use lectern::session::{
    Action, ActiveStream, AudioStatus, CameraRole, EventBus, ProcessingMode, SegmentationStatus,
    SessionState, SessionStore, UiEvent, UploadedVideoFiles, VideoStatus, MICROPHONE,
};

fn recording_state() -> SessionState {
    let mut state = SessionState::new();
    state.reduce(Action::StartProcessing);
    state.reduce(Action::SetSessionId(Some("sess-1".into())));
    state.reduce(Action::SetUploadedAudioPath(MICROPHONE.into()));
    state.reduce(Action::SetIsRecording(true));
    state
}

#[test]
fn test_reset_flow_preserves_hardware_flags() {
    let mut state = recording_state();
    state.reduce(Action::SetHasAudioDevices(false));
    state.reduce(Action::ResetFlow);

    // Session data is gone, hardware capability survives.
    assert_eq!(state.session_id, None, "reset must drop the session");
    assert!(!state.is_recording);
    assert!(!state.has_audio_devices, "device flag must survive reset");
    assert_eq!(state.audio_status, AudioStatus::NoDevices);

    state.reduce(Action::SetHasAudioDevices(true));
    state.reduce(Action::ResetFlow);
    assert_eq!(state.audio_status, AudioStatus::Ready);
}

#[test]
fn test_reset_flow_during_device_check_lands_on_checking() {
    let mut state = SessionState::new();
    state.reduce(Action::SetAudioDevicesLoading(true));
    state.reduce(Action::ResetFlow);
    assert_eq!(state.audio_status, AudioStatus::Checking);
    assert!(state.audio_devices_loading);
}

#[test]
fn test_empty_session_id_is_never_committed() {
    let mut state = SessionState::new();
    state.reduce(Action::SetSessionId(Some("  ".into())));
    assert_eq!(state.session_id, None);
    state.reduce(Action::SetSessionId(Some("sess-9".into())));
    assert_eq!(state.session_id.as_deref(), Some("sess-9"));
}

#[test]
fn test_start_recording_promotes_both_pipelines() {
    let mut state = SessionState::new();
    state.reduce(Action::SetVideoStatus(VideoStatus::Ready));
    state.reduce(Action::SetJustStoppedRecording(true));
    state.reduce(Action::SetIsRecording(true));

    assert!(!state.just_stopped_recording, "start must clear the stop flag");
    assert_eq!(state.audio_status, AudioStatus::Recording);
    assert_eq!(state.video_status, VideoStatus::Starting, "ready video moves to starting");
}

#[test]
fn test_start_recording_without_devices_leaves_audio_alone() {
    let mut state = SessionState::new();
    state.reduce(Action::SetHasAudioDevices(false));
    state.reduce(Action::SetIsRecording(true));
    assert_eq!(state.audio_status, AudioStatus::NoDevices);
}

#[test]
fn test_processing_failed_lands_on_error_everywhere() {
    let mut state = recording_state();
    state.reduce(Action::ProcessingFailed);

    assert!(!state.ai_processing);
    assert!(!state.is_recording);
    assert_eq!(state.audio_status, AudioStatus::Error);
    assert_eq!(state.video_status, VideoStatus::Failed);
    assert_eq!(state.processing_mode, None);
}

#[test]
fn test_uploaded_audio_path_drives_audio_status() {
    let mut state = SessionState::new();
    state.reduce(Action::SetUploadedAudioPath(MICROPHONE.into()));
    assert_eq!(state.audio_status, AudioStatus::Recording);

    state.reduce(Action::SetUploadedAudioPath("storage/talk.mp3".into()));
    assert_eq!(state.audio_status, AudioStatus::Processing);

    state.reduce(Action::SetUploadedAudioPath(String::new()));
    assert_eq!(state.uploaded_audio_path, None, "empty path clears the field");
}

#[test]
fn test_analytics_inactive_respects_terminal_status() {
    let mut state = SessionState::new();
    state.reduce(Action::SetVideoStatus(VideoStatus::Failed));
    state.reduce(Action::SetVideoAnalyticsActive(false));
    assert_eq!(
        state.video_status,
        VideoStatus::Failed,
        "deactivation must not resurrect a failed pipeline"
    );

    state.reduce(Action::SetVideoStatus(VideoStatus::Streaming));
    state.reduce(Action::SetVideoAnalyticsActive(false));
    assert_eq!(state.video_status, VideoStatus::Ready);
}

#[test]
fn test_reconcile_follows_capability_but_not_terminals() {
    let mut state = SessionState::new();
    state.reduce(Action::SetVideoStatus(VideoStatus::NoConfig));
    state.reduce(Action::SetFrontCamera("rtsp://cam-front".into()));
    state.reduce(Action::ReconcileVideoStatus);
    assert_eq!(state.video_status, VideoStatus::Ready);

    state.reduce(Action::SetVideoStatus(VideoStatus::Completed));
    state.reduce(Action::SetFrontCamera(String::new()));
    state.reduce(Action::ReconcileVideoStatus);
    assert_eq!(state.video_status, VideoStatus::Completed, "terminal is sticky");
}

#[test]
fn test_camera_edits_drive_video_status_directly() {
    let mut state = SessionState::new();
    state.reduce(Action::SetVideoStatus(VideoStatus::NoConfig));

    // No separate reconcile dispatch: the setter carries it.
    state.reduce(Action::SetBackCamera("rtsp://cam-back".into()));
    assert_eq!(state.video_status, VideoStatus::Ready);

    state.reduce(Action::SetBackCamera(String::new()));
    assert_eq!(state.video_status, VideoStatus::NoConfig);
}

#[test]
fn test_upload_gate_blocks_while_busy() {
    let mut state = recording_state();
    assert!(state.is_upload_disabled(), "recording blocks uploads");

    state.reduce(Action::SetIsRecording(false));
    state.reduce(Action::SetUploadedAudioPath("storage/talk.mp3".into()));
    assert!(state.is_upload_disabled(), "processing audio blocks uploads");

    state.reduce(Action::SetAudioStatus(AudioStatus::Complete));
    assert!(!state.is_upload_disabled(), "terminal audio unblocks uploads");
}

#[test]
fn test_playback_mode_needs_completion_and_files() {
    let mut state = SessionState::new();
    state.reduce(Action::SetVideoStatus(VideoStatus::Completed));
    assert!(!state.is_playback_mode(), "no files yet");

    state.reduce(Action::SetUploadedVideoFiles(UploadedVideoFiles {
        back: Some("lecture.mp4".into()),
        ..Default::default()
    }));
    assert!(state.is_playback_mode());
}

#[test]
fn test_available_files_map_board_to_content() {
    let mut state = SessionState::new();
    state.reduce(Action::SetUploadedVideoFiles(UploadedVideoFiles {
        front: Some("f.mp4".into()),
        board: Some("b.mp4".into()),
        ..Default::default()
    }));
    let files = state.available_video_files();
    assert_eq!(
        files,
        vec![
            (CameraRole::Front, "f.mp4".to_string()),
            (CameraRole::Content, "b.mp4".to_string()),
        ]
    );
}

#[test]
fn test_stale_session_writers_are_discarded() {
    let store = SessionStore::new();
    store.dispatch(Action::SetSessionId(Some("old".into())));

    // A writer tagged with the old session keeps working...
    assert!(store.dispatch_for("old", Action::SetIsRecording(true)));

    // ...until a new session replaces it.
    store.dispatch(Action::SetSessionId(Some("new".into())));
    assert!(
        !store.dispatch_for("old", Action::SetJustStoppedRecording(false)),
        "stale writer must be rejected"
    );
    assert!(store.snapshot().is_recording, "state untouched by the stale write");
    assert!(store.session_matches("new"));
}

#[test]
fn test_version_is_monotonic_per_dispatch() {
    let store = SessionStore::new();
    let v0 = store.snapshot().version;
    store.dispatch(Action::SetSearchQuery("pendulum".into()));
    store.dispatch(Action::ClearSearchResults);
    assert_eq!(store.snapshot().version, v0 + 2);
}

#[test]
fn test_segmentation_status_walk() {
    let mut state = SessionState::new();
    assert_eq!(state.segmentation_status, SegmentationStatus::Idle);
    state.reduce(Action::SegmentationStarted);
    assert_eq!(state.segmentation_status, SegmentationStatus::Running);
    state.reduce(Action::SegmentationComplete);
    assert_eq!(state.segmentation_status, SegmentationStatus::Complete);
}

#[test]
fn test_processing_mode_values_survive_round_trips() {
    let mut state = SessionState::new();
    for mode in [ProcessingMode::Audio, ProcessingMode::VideoOnly, ProcessingMode::Microphone] {
        state.reduce(Action::SetProcessingMode(Some(mode)));
        assert_eq!(state.processing_mode, Some(mode));
    }
}

#[tokio::test]
async fn test_bus_delivers_to_every_subscriber() {
    let bus = EventBus::new();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    bus.publish(UiEvent::SeekRequest { time: 12.5 });
    bus.notice("heads up");

    for rx in [&mut a, &mut b] {
        let UiEvent::SeekRequest { time } = rx.recv().await.unwrap() else {
            panic!("expected the seek first");
        };
        assert_eq!(time, 12.5);
        let UiEvent::StatusNotice { message } = rx.recv().await.unwrap() else {
            panic!("expected the notice second");
        };
        assert_eq!(message, "heads up");
    }
}

#[test]
fn test_active_stream_serializes_kebab_case() {
    let json = serde_json::to_string(&ActiveStream::All).unwrap();
    assert_eq!(json, "\"all\"");
    let back: ActiveStream = serde_json::from_str("\"back\"").unwrap();
    assert_eq!(back, ActiveStream::Back);
}
