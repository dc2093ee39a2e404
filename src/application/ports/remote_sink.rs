use crate::domain::value_objects::{EmailAddress, OwnerKey, ProviderLogin, RemoteId};
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Write surface of the durable remote store, consumed by the table drainers.
///
/// The sink is optional at wiring time: a deployment without one runs in
/// local-only mode and every drainer returns zero. All failures surface as
/// `SyncError::Remote`; batch inserts are single remote transactions.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    // Owner profiles, upserted by email.
    async fn find_profile_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RemoteProfile>, SyncError>;
    async fn insert_profile(&self, draft: RemoteProfileDraft) -> Result<RemoteId, SyncError>;
    async fn update_profile(&self, id: RemoteId, draft: RemoteProfileDraft)
        -> Result<(), SyncError>;
    async fn profile_exists(&self, email: &EmailAddress) -> Result<bool, SyncError>;

    // External logins, upserted by (provider, subject).
    async fn find_login(&self, login: &ProviderLogin) -> Result<Option<RemoteId>, SyncError>;
    async fn insert_login(&self, draft: RemoteLoginDraft) -> Result<RemoteId, SyncError>;
    async fn update_login(&self, id: RemoteId, draft: RemoteLoginDraft) -> Result<(), SyncError>;
    async fn login_exists(&self, login: &ProviderLogin) -> Result<bool, SyncError>;

    // Medical profiles, upserted by the owner's remote id.
    async fn find_medical_profile(&self, owner: RemoteId) -> Result<Option<RemoteId>, SyncError>;
    async fn insert_medical_profile(
        &self,
        owner: RemoteId,
        draft: RemoteMedicalProfileDraft,
    ) -> Result<RemoteId, SyncError>;
    async fn update_medical_profile(
        &self,
        id: RemoteId,
        draft: RemoteMedicalProfileDraft,
    ) -> Result<(), SyncError>;

    // Insert-only event entities; each batch is one remote transaction.
    async fn insert_vital_signs(&self, batch: &[RemoteVitalSign]) -> Result<(), SyncError>;
    async fn insert_environment_readings(
        &self,
        batch: &[RemoteEnvironmentReading],
    ) -> Result<(), SyncError>;
    async fn insert_sleep_sessions(&self, batch: &[RemoteSleepSession]) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteProfile {
    pub id: RemoteId,
    pub email: EmailAddress,
    pub display_name: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteProfileDraft {
    pub owner_key: OwnerKey,
    pub email: EmailAddress,
    pub display_name: String,
    pub birth_date: Option<NaiveDate>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteLoginDraft {
    pub owner_key: OwnerKey,
    pub login: ProviderLogin,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteMedicalProfileDraft {
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub conditions: Vec<String>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteVitalSign {
    pub owner_key: OwnerKey,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteEnvironmentReading {
    pub owner_key: OwnerKey,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteSleepSession {
    pub owner: RemoteId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub quality: Option<f64>,
    pub source: String,
}
