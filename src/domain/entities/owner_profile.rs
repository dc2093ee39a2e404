use crate::domain::value_objects::{EmailAddress, OwnerKey};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Locally cached owner profile. Mutable; upserted remotely by its email
/// natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerProfile {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub email: EmailAddress,
    pub display_name: String,
    pub birth_date: Option<NaiveDate>,
    pub dirty: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOwnerProfile {
    pub owner_key: OwnerKey,
    pub email: EmailAddress,
    pub display_name: String,
    pub birth_date: Option<NaiveDate>,
}
