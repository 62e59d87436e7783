use lectern::audio::{format_elapsed, plan_stop};
use lectern::session::{Action, AudioStatus, SessionState, MICROPHONE};

fn live_mic_session() -> SessionState {
    let mut state = SessionState::new();
    state.reduce(Action::SetSessionId(Some("sess-1".into())));
    state.reduce(Action::SetUploadedAudioPath(MICROPHONE.into()));
    state.reduce(Action::SetIsRecording(true));
    state
}

#[test]
fn test_stopping_a_live_mic_keeps_processing_alive() {
    let plan = plan_stop(&live_mic_session());
    assert!(plan.stop_microphone, "remote capture must be stopped");
    assert!(!plan.demote_recording_status, "transcription continues downstream");
    assert!(!plan.clear_processing_mode);
    assert!(!plan.clear_uploaded_path);
}

#[test]
fn test_stopping_without_devices_forces_no_devices() {
    let mut state = live_mic_session();
    state.reduce(Action::SetHasAudioDevices(false));
    state.reduce(Action::SetUploadedAudioPath(MICROPHONE.into()));

    let plan = plan_stop(&state);
    assert!(!plan.stop_microphone, "no devices means nothing to stop remotely");
    assert!(plan.force_no_devices);
    assert!(plan.clear_processing_mode);
    assert!(plan.clear_uploaded_path, "stale sentinel must not linger");
}

#[test]
fn test_recording_status_without_capture_demotes_to_ready() {
    let mut state = SessionState::new();
    state.reduce(Action::SetSessionId(Some("sess-1".into())));
    state.reduce(Action::SetAudioStatus(AudioStatus::Recording));

    let plan = plan_stop(&state);
    assert!(plan.demote_recording_status);
    assert!(!plan.stop_microphone);
}

#[test]
fn test_video_branches_are_mutually_exclusive() {
    // Active analytics with a configured camera: remote stop.
    let mut active = live_mic_session();
    active.reduce(Action::SetFrontCamera("rtsp://front".into()));
    active.reduce(Action::SetVideoAnalyticsActive(true));
    let plan = plan_stop(&active);
    assert!(plan.stop_video);
    assert!(!plan.video_fallback_no_config);
    assert!(!plan.reconcile_idle_video);

    // Camera configured but analytics never started: local reconcile only.
    let mut idle = live_mic_session();
    idle.reduce(Action::SetFrontCamera("rtsp://front".into()));
    let plan = plan_stop(&idle);
    assert!(!plan.stop_video);
    assert!(plan.reconcile_idle_video);

    // No capability at all.
    let plan = plan_stop(&live_mic_session());
    assert!(plan.video_fallback_no_config);
    assert!(!plan.stop_video && !plan.reconcile_idle_video);
}

#[test]
fn test_no_session_never_calls_remote_endpoints() {
    let mut state = SessionState::new();
    state.reduce(Action::SetUploadedAudioPath(MICROPHONE.into()));
    state.reduce(Action::SetFrontCamera("rtsp://front".into()));
    state.reduce(Action::SetVideoAnalyticsActive(true));
    state.reduce(Action::SetIsRecording(true));

    let plan = plan_stop(&state);
    assert!(!plan.stop_microphone, "remote mic stop needs a session id");
    assert!(!plan.stop_video, "remote video stop needs a session id");
}

#[test]
fn test_elapsed_clock_rendering() {
    assert_eq!(format_elapsed(0), "00:00");
    assert_eq!(format_elapsed(59), "00:59");
    assert_eq!(format_elapsed(61), "01:01");
    assert_eq!(format_elapsed(45 * 60 + 3), "45:03");
}
