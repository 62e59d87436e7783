use super::state::{AudioStatus, VideoStatus};

/// Single recompute funnel for the reactive `no-config ⇄ ready` edge.
///
/// Terminal values (`completed`, `failed`) are sticky: only an explicit
/// reset action may leave them. While capability holds, every other
/// status passes through untouched; losing the last camera source and
/// uploaded file forces `no-config` even out of a progress state, since
/// nothing is left to stream.
pub fn derive_video_status(current: VideoStatus, has_video_capability: bool) -> VideoStatus {
    if current.is_terminal() {
        return current;
    }
    if has_video_capability && current == VideoStatus::NoConfig {
        VideoStatus::Ready
    } else if !has_video_capability && current != VideoStatus::NoConfig {
        VideoStatus::NoConfig
    } else {
        current
    }
}

/// Baseline audio status from the hardware capability flags alone.
/// Used by session reset, where in-flight pipeline state is discarded.
pub fn baseline_audio_status(has_devices: bool, devices_loading: bool) -> AudioStatus {
    if devices_loading {
        AudioStatus::Checking
    } else if has_devices {
        AudioStatus::Ready
    } else {
        AudioStatus::NoDevices
    }
}
