use crate::domain::value_objects::{OwnerKey, ProviderLogin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth login link for an owner; upserted remotely by its
/// (provider, subject) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalLogin {
    pub local_id: i64,
    pub owner_key: OwnerKey,
    pub login: ProviderLogin,
    pub dirty: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExternalLogin {
    pub owner_key: OwnerKey,
    pub login: ProviderLogin,
}
