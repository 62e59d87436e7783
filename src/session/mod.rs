pub mod bus;
pub mod state;
pub mod status;
pub mod store;

pub use bus::{EventBus, MonitoringEventKind, UiEvent};
pub use state::{
    Action, ActiveStream, AudioStatus, CameraRole, ProcessingMode, SegmentationStatus,
    SessionState, Tab, UploadedVideoFiles, VideoStatus, MICROPHONE,
};
pub use store::SessionStore;
