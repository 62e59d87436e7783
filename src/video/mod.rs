pub mod controller;
pub mod monitor;

pub use controller::{
    build_pipeline_requests, construct_file_path, default_active_stream, interpret_start_result,
    UploadSelection, VideoController,
};
pub use monitor::{apply_verdict, MonitorVerdict, PipelineMonitor};
