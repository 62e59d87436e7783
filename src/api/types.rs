use serde::{Deserialize, Serialize};

/// One enumerated capture device on the backend host.
/// An empty device list means "no microphone"; presence is never assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// One video-analytics pipeline to start: canonical name + source URI
/// (camera string in live mode, absolute file path in upload mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRequest {
    pub pipeline_name: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStopRequest {
    pub pipeline_name: String,
}

/// Per-pipeline outcome of a bulk start call. `status == "success"` with
/// a non-empty stream handle is the only variant treated as started.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineStartResult {
    pub pipeline_name: String,
    pub status: String,
    #[serde(default)]
    pub hls_stream: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartAnalyticsResponse {
    #[serde(default)]
    pub results: Vec<PipelineStartResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRunStatus {
    Running,
    Stopped,
    StoppedError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineHealth {
    pub pipeline_name: String,
    pub status: PipelineRunStatus,
}

/// One update frame from the pipeline-health monitor stream.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorUpdate {
    #[serde(default)]
    pub pipelines: Vec<PipelineHealth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub path: String,
}

/// Read-only search hit; result sets are replaced wholesale per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f64,
    pub session_id: String,
    pub topic: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamingStatus {
    pub locked: bool,
    pub remaining_seconds: u64,
}

/// Health-suite workload start/stop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadTarget {
    Rppg,
    AiEcg,
    Mdpnp,
    Pose3d,
    All,
}

impl WorkloadTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadTarget::Rppg => "rppg",
            WorkloadTarget::AiEcg => "ai-ecg",
            WorkloadTarget::Mdpnp => "mdpnp",
            WorkloadTarget::Pose3d => "3d-pose",
            WorkloadTarget::All => "all",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartWorkloadsResponse {
    pub status: String,
    #[serde(default)]
    pub results: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub auto_stop_in_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopWorkloadsResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
