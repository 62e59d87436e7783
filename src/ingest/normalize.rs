use serde_json::Value;
use tracing::debug;

use super::event::{
    NormalizedUpdate, Person, VitalSign, WaveformKind, WorkloadEvent, WorkloadType,
};

/// Turns one raw event into zero or more normalized updates. Payloads
/// this code does not recognize are dropped with a debug log; ingestion
/// never fails on a single event.
pub fn normalize(event: &WorkloadEvent) -> Vec<NormalizedUpdate> {
    match event.workload {
        WorkloadType::Rppg => normalize_rppg(&event.payload),
        WorkloadType::AiEcg => normalize_ai_ecg(&event.payload),
        WorkloadType::Mdpnp => normalize_mdpnp(&event.payload),
        WorkloadType::Pose3d => normalize_pose(&event.payload),
    }
}

fn normalize_rppg(data: &Value) -> Vec<NormalizedUpdate> {
    let mut updates = Vec::new();

    if let Some(samples) = samples_from(data, &["waveform", "samples"]) {
        updates.push(NormalizedUpdate::Waveform {
            kind: WaveformKind::Ppg,
            samples,
            frequency_hz: None,
        });
    }

    // Single-metric form: {"metric": "HEART_RATE_BPM", "value": 72.0}
    if let (Some(metric), Some(value)) = (
        data.get("metric").and_then(Value::as_str),
        data.get("value").and_then(Value::as_f64),
    ) {
        if let Some(sign) = rppg_metric(metric) {
            updates.push(NormalizedUpdate::Vitals(vec![(sign, value)]));
            return updates;
        }
        debug!("unrecognized rppg metric {:?}", metric);
    }

    // Aggregate form: canonical keys first, producer spellings second.
    let mut vitals = Vec::new();
    if let Some(v) = first_f64(data, &["HR", "heart_rate"]) {
        vitals.push((VitalSign::Hr, v));
    }
    if let Some(v) = first_f64(data, &["RR", "respiratory_rate", "value"]) {
        vitals.push((VitalSign::Rr, v));
    }
    if let Some(v) = first_f64(data, &["SpO2", "spo2"]) {
        vitals.push((VitalSign::SpO2, v));
    }
    if !vitals.is_empty() {
        updates.push(NormalizedUpdate::Vitals(vitals));
    }
    updates
}

fn rppg_metric(metric: &str) -> Option<VitalSign> {
    if metric.starts_with("HEART_RATE") {
        Some(VitalSign::Hr)
    } else if metric.starts_with("RESP_RATE") {
        Some(VitalSign::Rr)
    } else if metric.starts_with("SPO2") {
        Some(VitalSign::SpO2)
    } else {
        None
    }
}

fn normalize_ai_ecg(data: &Value) -> Vec<NormalizedUpdate> {
    let mut updates = Vec::new();

    if let Some(samples) = samples_from(data, &["waveform"]) {
        updates.push(NormalizedUpdate::Waveform {
            kind: WaveformKind::Ecg,
            samples,
            frequency_hz: data.get("waveform_frequency_hz").and_then(Value::as_f64),
        });
    }

    let prediction = data.get("inference").and_then(Value::as_str).map(str::to_string);
    let filename = data.get("file").and_then(Value::as_str).map(str::to_string);
    if prediction.is_some() || filename.is_some() {
        updates.push(NormalizedUpdate::EcgInference { prediction, filename });
    }
    updates
}

fn normalize_mdpnp(data: &Value) -> Vec<NormalizedUpdate> {
    // Devices report the code under `metric`; `code` is the legacy key.
    let code = data
        .get("metric")
        .or_else(|| data.get("code"))
        .and_then(Value::as_str);
    let Some(code) = code else {
        debug!("mdpnp event without a metric field");
        return Vec::new();
    };

    if let Some(samples) = samples_from(data, &["samples", "values", "waveform"]) {
        let Some(kind) = mdpnp_waveform(code) else {
            debug!("unrecognized mdpnp waveform code {:?}", code);
            return Vec::new();
        };
        return vec![NormalizedUpdate::Waveform {
            kind,
            samples,
            frequency_hz: data.get("frequency_hz").and_then(Value::as_f64),
        }];
    }

    let Some(value) = data.get("value").and_then(Value::as_f64) else {
        return Vec::new();
    };
    match mdpnp_numeric(code) {
        Some(sign) => vec![NormalizedUpdate::Vitals(vec![(sign, value)])],
        None => {
            debug!("unrecognized mdpnp numeric code {:?}", code);
            Vec::new()
        }
    }
}

fn mdpnp_numeric(code: &str) -> Option<VitalSign> {
    match code {
        "MDC_ECG_HEART_RATE" => Some(VitalSign::Hr),
        "MDC_AWAY_CO2_ET" => Some(VitalSign::Co2Et),
        "MDC_PRESS_BLD_ART_ABP_DIA" => Some(VitalSign::BpDia),
        "MDC_PRESS_BLD_ART_ABP_SYS" => Some(VitalSign::BpSys),
        _ => None,
    }
}

fn mdpnp_waveform(code: &str) -> Option<WaveformKind> {
    if code.starts_with("MDC_ECG_LEAD_II") {
        Some(WaveformKind::Ecg)
    } else if code.starts_with("MDC_AWAY_CO2") {
        Some(WaveformKind::Co2)
    } else if code.starts_with("MDC_PRESS_BLD") {
        Some(WaveformKind::Bp)
    } else {
        None
    }
}

fn normalize_pose(data: &Value) -> Vec<NormalizedUpdate> {
    let people: Vec<Person> = data
        .get("people")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    vec![NormalizedUpdate::Pose {
        people,
        activity: data.get("activity").and_then(Value::as_str).map(str::to_string),
        frame_number: data.get("frame_number").and_then(Value::as_u64),
        frame_base64: data.get("frame_base64").and_then(Value::as_str).map(str::to_string),
    }]
}

fn first_f64(data: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| data.get(k).and_then(Value::as_f64))
}

fn samples_from(data: &Value, keys: &[&str]) -> Option<Vec<f64>> {
    let arr = keys.iter().find_map(|k| data.get(k).and_then(Value::as_array))?;
    Some(arr.iter().filter_map(Value::as_f64).collect())
}
