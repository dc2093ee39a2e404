use crate::domain::value_objects::{OwnerKey, VitalKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only vital-sign sample. Never updated remotely; inserted once and
/// later purged locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalSign {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub kind: VitalKind,
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
pub struct NewVitalSign {
    pub owner_key: OwnerKey,
    pub kind: VitalKind,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}
