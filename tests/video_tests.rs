use lectern::api::types::PipelineStartResult;
use lectern::session::{ActiveStream, CameraRole, UploadedVideoFiles};
use lectern::video::{
    build_pipeline_requests, construct_file_path, default_active_stream, interpret_start_result,
    UploadSelection,
};

fn start_result(name: &str, status: &str, stream: Option<&str>) -> PipelineStartResult {
    // Deserializing rather than constructing keeps the wire shape honest.
    serde_json::from_value(serde_json::json!({
        "pipeline_name": name,
        "status": status,
        "hls_stream": stream,
    }))
    .unwrap()
}

#[test]
fn test_blank_camera_sources_are_skipped() {
    let requests = build_pipeline_requests("rtsp://front", "  ", "");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].pipeline_name, "front");
    assert_eq!(requests[0].source, "rtsp://front");

    assert!(build_pipeline_requests("", " ", "").is_empty());
}

#[test]
fn test_board_camera_becomes_content_pipeline() {
    let requests = build_pipeline_requests("", "", "rtsp://board");
    assert_eq!(requests[0].pipeline_name, "content");
}

#[test]
fn test_start_results_require_success_and_a_stream_handle() {
    let started = interpret_start_result(&start_result(
        "front",
        "success",
        Some("http://hls/front.m3u8"),
    ));
    assert_eq!(started, Some((CameraRole::Front, "http://hls/front.m3u8".to_string())));

    for rejected in [
        start_result("back", "success", Some("")),
        start_result("back", "success", None),
        start_result("content", "error", Some("http://hls/content.m3u8")),
        start_result("mystery", "success", Some("http://hls/x.m3u8")),
    ] {
        assert_eq!(
            interpret_start_result(&rejected),
            None,
            "empty handles, errors, and unknown pipelines all fail the start ({})",
            rejected.pipeline_name
        );
    }
}

#[test]
fn test_default_active_stream_prefers_back_then_content_then_front() {
    let all = [CameraRole::Front, CameraRole::Back, CameraRole::Content];
    assert_eq!(default_active_stream(&all), Some(ActiveStream::Back));
    assert_eq!(
        default_active_stream(&[CameraRole::Front, CameraRole::Content]),
        Some(ActiveStream::Content)
    );
    assert_eq!(default_active_stream(&[CameraRole::Front]), Some(ActiveStream::Front));
    assert_eq!(default_active_stream(&[]), None);
}

#[test]
fn test_file_path_join_preserves_separator_style() {
    assert_eq!(
        construct_file_path("C:\\Users\\Default\\Videos\\", "a.mp4"),
        "C:\\Users\\Default\\Videos\\a.mp4"
    );
    assert_eq!(
        construct_file_path("C:\\Users\\Default\\Videos", "a.mp4"),
        "C:\\Users\\Default\\Videos\\a.mp4"
    );
    assert_eq!(construct_file_path("/srv/videos", "a.mp4"), "/srv/videos/a.mp4");
    assert_eq!(construct_file_path("/srv/videos/", "a.mp4"), "/srv/videos/a.mp4");
    assert_eq!(construct_file_path("", "a.mp4"), "a.mp4");
}

#[test]
fn test_upload_selection_builds_absolute_path_requests() {
    let selection = UploadSelection {
        audio: None,
        video: UploadedVideoFiles {
            back: Some("lecture-back.mp4".into()),
            board: Some("board.mp4".into()),
            ..Default::default()
        },
        base_dir: "D:\\Recordings".into(),
    };
    let requests = selection.video_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].pipeline_name, "back");
    assert_eq!(requests[0].source, "D:\\Recordings\\lecture-back.mp4");
    assert_eq!(requests[1].pipeline_name, "content");
    assert_eq!(requests[1].source, "D:\\Recordings\\board.mp4");
}

#[test]
fn test_empty_selection_is_detected() {
    assert!(UploadSelection::default().is_empty());
    let with_audio = UploadSelection {
        audio: Some(("talk.mp3".into(), vec![1, 2, 3])),
        ..Default::default()
    };
    assert!(!with_audio.is_empty());
}
