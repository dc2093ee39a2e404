use crate::domain::value_objects::{EnvironmentKind, OwnerKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only ambient-environment sample (room temperature, humidity, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentReading {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub kind: EnvironmentKind,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
    pub dirty: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEnvironmentReading {
    pub owner_key: OwnerKey,
    pub kind: EnvironmentKind,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}
