use crate::domain::value_objects::OwnerKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Medical background for an owner. Keyed remotely by the owner's remote row
/// id, so uploading requires the identity bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalProfile {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub conditions: Vec<String>,
    pub dirty: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedicalProfile {
    pub owner_key: OwnerKey,
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub conditions: Vec<String>,
}
