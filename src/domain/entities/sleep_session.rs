use crate::domain::value_objects::OwnerKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only sleep session. Its event time is `ended_at`; the remote row
/// references the owner by remote id, resolved through the identity bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SleepSession {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub quality: Option<f64>,
    pub source: String,
    pub dirty: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSleepSession {
    pub owner_key: OwnerKey,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub quality: Option<f64>,
    pub source: String,
}
