use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The four fixed analytics workloads behind the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadType {
    Rppg,
    AiEcg,
    Mdpnp,
    #[serde(rename = "3d-pose")]
    Pose3d,
}

impl WorkloadType {
    pub const ALL: [WorkloadType; 4] = [
        WorkloadType::Rppg,
        WorkloadType::AiEcg,
        WorkloadType::Mdpnp,
        WorkloadType::Pose3d,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::Rppg => "rppg",
            WorkloadType::AiEcg => "ai-ecg",
            WorkloadType::Mdpnp => "mdpnp",
            WorkloadType::Pose3d => "3d-pose",
        }
    }

    /// Events name their workload as `workload_type` or `workload`
    /// depending on the producer; both spellings map here.
    pub fn parse(s: &str) -> Option<WorkloadType> {
        match s {
            "rppg" => Some(WorkloadType::Rppg),
            "ai-ecg" => Some(WorkloadType::AiEcg),
            "mdpnp" => Some(WorkloadType::Mdpnp),
            "3d-pose" => Some(WorkloadType::Pose3d),
            _ => None,
        }
    }
}

/// One raw event as delivered on the stream, before normalization.
/// The aggregator envelope is `{workload_type, event_type, timestamp,
/// payload}`; older producers used `data` for the payload key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkloadEvent {
    #[serde(default)]
    pub uuid: Option<Uuid>,
    #[serde(rename = "workload_type", alias = "workload")]
    pub workload: WorkloadType,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default, alias = "data")]
    pub payload: Value,
}

/// Canonical vital-sign keys the views render by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VitalSign {
    Hr,
    Rr,
    SpO2,
    Co2Et,
    BpDia,
    BpSys,
}

impl VitalSign {
    pub fn as_key(&self) -> &'static str {
        match self {
            VitalSign::Hr => "HR",
            VitalSign::Rr => "RR",
            VitalSign::SpO2 => "SpO2",
            VitalSign::Co2Et => "CO2_ET",
            VitalSign::BpDia => "BP_DIA",
            VitalSign::BpSys => "BP_SYS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformKind {
    Ecg,
    Co2,
    Bp,
    Ppg,
}

impl WaveformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaveformKind::Ecg => "ECG",
            WaveformKind::Co2 => "CO2",
            WaveformKind::Bp => "BP",
            WaveformKind::Ppg => "PPG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Joint3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub joints_3d: Vec<Joint3d>,
    #[serde(default)]
    pub confidence: Vec<f64>,
}

/// Per-workload normalization output. One tagged union instead of
/// loose per-workload field soup; consumers match on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedUpdate {
    Vitals(Vec<(VitalSign, f64)>),
    Waveform {
        kind: WaveformKind,
        samples: Vec<f64>,
        frequency_hz: Option<f64>,
    },
    EcgInference {
        prediction: Option<String>,
        filename: Option<String>,
    },
    Pose {
        people: Vec<Person>,
        activity: Option<String>,
        frame_number: Option<u64>,
        frame_base64: Option<String>,
    },
}
