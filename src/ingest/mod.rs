pub mod buffer;
pub mod event;
pub mod ingestor;
pub mod normalize;
pub mod workloads;

pub use buffer::EventLog;
pub use event::{
    Joint3d, NormalizedUpdate, Person, VitalSign, WaveformKind, WorkloadEvent, WorkloadType,
};
pub use ingestor::{classify, EventIngestor, Ingested, SseFrame, SseParser};
pub use normalize::normalize;
pub use workloads::{AggregatorStatus, WorkloadState, WorkloadStatus, WorkloadStore};
