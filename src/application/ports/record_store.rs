use crate::domain::entities::{
    EnvironmentReading, ExternalLogin, MedicalProfile, NewEnvironmentReading, NewExternalLogin,
    NewMedicalProfile, NewOwnerProfile, NewSleepSession, NewVitalSign, OwnerProfile, SleepSession,
    VitalSign,
};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Local record-store contract, one trait per replicated entity type.
///
/// Shared rules across all implementations:
/// - `add*` inserts dirty by default; `as_synced` inserts with dirty=0 and
///   synced_at=now for seed/import paths.
/// - `dirty_*` queries return dirty rows *including* soft-deleted ones, since
///   deleted-but-undrained rows must still reach the remote store.
/// - `purge_synced_before` never removes a dirty row regardless of age.
/// - Live reads exclude soft-deleted rows.
/// - A batch insert is one transaction; there is no row-level partial success.

#[async_trait]
pub trait OwnerProfileStore: Send + Sync {
    async fn add(&self, draft: NewOwnerProfile, as_synced: bool)
        -> Result<OwnerProfile, SyncError>;
    async fn update(&self, profile: &OwnerProfile) -> Result<(), SyncError>;
    async fn find_by_owner_key(&self, key: &OwnerKey) -> Result<Option<OwnerProfile>, SyncError>;
    async fn dirty_profiles(&self) -> Result<Vec<OwnerProfile>, SyncError>;
    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError>;
    async fn recently_synced(&self, limit: u32) -> Result<Vec<OwnerProfile>, SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}

#[async_trait]
pub trait ExternalLoginStore: Send + Sync {
    async fn add(&self, draft: NewExternalLogin, as_synced: bool)
        -> Result<ExternalLogin, SyncError>;
    async fn logins_for_owner(&self, key: &OwnerKey) -> Result<Vec<ExternalLogin>, SyncError>;
    async fn dirty_logins(&self) -> Result<Vec<ExternalLogin>, SyncError>;
    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError>;
    async fn recently_synced(&self, limit: u32) -> Result<Vec<ExternalLogin>, SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}

#[async_trait]
pub trait MedicalProfileStore: Send + Sync {
    async fn add(
        &self,
        draft: NewMedicalProfile,
        as_synced: bool,
    ) -> Result<MedicalProfile, SyncError>;
    async fn update(&self, profile: &MedicalProfile) -> Result<(), SyncError>;
    async fn find_by_owner_key(&self, key: &OwnerKey) -> Result<Option<MedicalProfile>, SyncError>;
    async fn dirty_profiles(&self) -> Result<Vec<MedicalProfile>, SyncError>;
    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}

#[async_trait]
pub trait VitalSignStore: Send + Sync {
    async fn add_many(&self, drafts: Vec<NewVitalSign>, as_synced: bool) -> Result<(), SyncError>;
    /// Dirty rows across all owners, ordered by recorded_at ascending so that
    /// cutoff marking stays monotonic.
    async fn dirty_samples(&self) -> Result<Vec<VitalSign>, SyncError>;
    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError>;
    async fn recent_samples(&self, owner: &OwnerKey, limit: u32)
        -> Result<Vec<VitalSign>, SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}

#[async_trait]
pub trait EnvironmentReadingStore: Send + Sync {
    async fn add_many(
        &self,
        drafts: Vec<NewEnvironmentReading>,
        as_synced: bool,
    ) -> Result<(), SyncError>;
    async fn dirty_readings(&self) -> Result<Vec<EnvironmentReading>, SyncError>;
    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError>;
    async fn recent_readings(
        &self,
        owner: &OwnerKey,
        limit: u32,
    ) -> Result<Vec<EnvironmentReading>, SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}

#[async_trait]
pub trait SleepSessionStore: Send + Sync {
    async fn add_many(&self, drafts: Vec<NewSleepSession>, as_synced: bool)
        -> Result<(), SyncError>;
    /// Ordered by ended_at ascending; a session's event time is its end.
    async fn dirty_sessions(&self) -> Result<Vec<SleepSession>, SyncError>;
    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError>;
    async fn recent_sessions(
        &self,
        owner: &OwnerKey,
        limit: u32,
    ) -> Result<Vec<SleepSession>, SyncError>;
    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError>;
    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError>;
}
