use crate::domain::value_objects::{EnvironmentKind, VitalKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One typed reading from the device telemetry stream. Carries no owner; the
/// ingestion buffer stamps the active session's owner key and a default
/// source tag when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TelemetryEvent {
    Vital(VitalReading),
    Environment(EnvironmentSample),
    Sleep(SleepRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalReading {
    pub kind: VitalKind,
    pub value: f64,
    pub unit: Option<String>,
    pub source: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentSample {
    pub kind: EnvironmentKind,
    pub value: f64,
    pub unit: Option<String>,
    pub source: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SleepRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub quality: Option<f64>,
    pub source: Option<String>,
}
