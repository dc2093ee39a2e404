use crate::application::ports::record_store::SleepSessionStore;
use crate::application::ports::remote_sink::{RemoteSink, RemoteSleepSession};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const CHUNK_SIZE: usize = 50;
const RETENTION_DAYS: i64 = 30;

/// Chunked insert-only upload of sleep sessions. The remote row references
/// the owner by remote id, so every session goes through the identity bridge
/// first; sessions whose owner is not in the remote store yet are left dirty
/// for the next cycle without failing the drain.
pub struct SleepSessionDrainer {
    store: Arc<dyn SleepSessionStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl SleepSessionDrainer {
    pub fn new(store: Arc<dyn SleepSessionStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for SleepSessionDrainer {
    fn table_name(&self) -> &'static str {
        "sleep_sessions"
    }

    fn order(&self) -> u32 {
        60
    }

    async fn drain(&self, cycle: &DrainCycle) -> Result<u64, SyncError> {
        let Some(sink) = self.sink.as_ref() else {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                "no remote sink configured; local-only mode"
            );
            return Ok(0);
        };

        let dirty = self.store.dirty_sessions().await?;
        if dirty.is_empty() {
            return Ok(0);
        }

        let mut batch = Vec::with_capacity(dirty.len());
        let mut cutoffs: HashMap<OwnerKey, DateTime<Utc>> = HashMap::new();
        let mut warned: HashSet<OwnerKey> = HashSet::new();
        let mut unresolved = 0u64;

        for session in &dirty {
            let Some(owner_id) = cycle.bridge.resolve(&session.owner_key).await? else {
                unresolved += 1;
                if warned.insert(session.owner_key.clone()) {
                    tracing::warn!(
                        target: "sync::drain",
                        table = self.table_name(),
                        owner = %session.owner_key,
                        "owner not present in remote store yet; sessions stay dirty"
                    );
                }
                continue;
            };

            batch.push(RemoteSleepSession {
                owner: owner_id,
                started_at: session.started_at,
                ended_at: session.ended_at,
                quality: session.quality,
                source: session.source.clone(),
            });
            cutoffs
                .entry(session.owner_key.clone())
                .and_modify(|cutoff| {
                    if session.ended_at > *cutoff {
                        *cutoff = session.ended_at;
                    }
                })
                .or_insert(session.ended_at);
        }

        // Nothing uploaded this cycle means nothing to mark and no purge.
        if batch.is_empty() {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                unresolved,
                "sessions deferred to the next cycle"
            );
            return Ok(dirty.len() as u64);
        }

        for chunk in batch.chunks(CHUNK_SIZE) {
            cycle.cancel.ensure_active()?;
            sink.insert_sleep_sessions(chunk).await?;
        }

        let now = Utc::now();
        for (owner, cutoff) in &cutoffs {
            self.store.mark_synced_through(owner, *cutoff, now).await?;
        }
        self.store
            .purge_synced_before(now - Duration::days(RETENTION_DAYS))
            .await?;

        if unresolved > 0 {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                unresolved,
                "sessions deferred to the next cycle"
            );
        }

        Ok(dirty.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::record_store::OwnerProfileStore;
    use crate::application::ports::remote_sink::{
        RemoteEnvironmentReading, RemoteLoginDraft, RemoteMedicalProfileDraft, RemoteProfile,
        RemoteProfileDraft, RemoteVitalSign,
    };
    use crate::application::services::identity_bridge::IdentityBridge;
    use crate::domain::entities::{NewOwnerProfile, NewSleepSession, OwnerProfile, SleepSession};
    use crate::domain::value_objects::{EmailAddress, ProviderLogin, RemoteId};
    use crate::shared::cancel::CancelFlag;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct RecordingSleepStore {
        sessions: Vec<SleepSession>,
        marks: AtomicU64,
        purges: AtomicU64,
    }

    #[async_trait]
    impl SleepSessionStore for RecordingSleepStore {
        async fn add_many(
            &self,
            _drafts: Vec<NewSleepSession>,
            _as_synced: bool,
        ) -> Result<(), SyncError> {
            unreachable!("not used by drainer tests")
        }

        async fn dirty_sessions(&self) -> Result<Vec<SleepSession>, SyncError> {
            Ok(self.sessions.clone())
        }

        async fn mark_synced_through(
            &self,
            _owner: &OwnerKey,
            _cutoff: DateTime<Utc>,
            _synced_at: DateTime<Utc>,
        ) -> Result<u64, SyncError> {
            self.marks.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn recent_sessions(
            &self,
            _owner: &OwnerKey,
            _limit: u32,
        ) -> Result<Vec<SleepSession>, SyncError> {
            unreachable!("not used by drainer tests")
        }

        async fn soft_delete(&self, _local_id: i64) -> Result<(), SyncError> {
            unreachable!("not used by drainer tests")
        }

        async fn purge_synced_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
            self.purges.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    struct NoProfileStore;

    #[async_trait]
    impl OwnerProfileStore for NoProfileStore {
        async fn add(
            &self,
            _draft: NewOwnerProfile,
            _as_synced: bool,
        ) -> Result<OwnerProfile, SyncError> {
            unreachable!("not used by drainer tests")
        }

        async fn update(&self, _profile: &OwnerProfile) -> Result<(), SyncError> {
            unreachable!("not used by drainer tests")
        }

        async fn find_by_owner_key(
            &self,
            _key: &OwnerKey,
        ) -> Result<Option<OwnerProfile>, SyncError> {
            Ok(None)
        }

        async fn dirty_profiles(&self) -> Result<Vec<OwnerProfile>, SyncError> {
            Ok(Vec::new())
        }

        async fn mark_synced(
            &self,
            _ids: &[i64],
            _synced_at: DateTime<Utc>,
        ) -> Result<(), SyncError> {
            Ok(())
        }

        async fn recently_synced(&self, _limit: u32) -> Result<Vec<OwnerProfile>, SyncError> {
            Ok(Vec::new())
        }

        async fn soft_delete(&self, _local_id: i64) -> Result<(), SyncError> {
            Ok(())
        }

        async fn purge_synced_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
            Ok(0)
        }
    }

    struct UnusedSink;

    #[async_trait]
    impl RemoteSink for UnusedSink {
        async fn find_profile_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<RemoteProfile>, SyncError> {
            unreachable!()
        }

        async fn insert_profile(&self, _draft: RemoteProfileDraft) -> Result<RemoteId, SyncError> {
            unreachable!()
        }

        async fn update_profile(
            &self,
            _id: RemoteId,
            _draft: RemoteProfileDraft,
        ) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn profile_exists(&self, _email: &EmailAddress) -> Result<bool, SyncError> {
            unreachable!()
        }

        async fn find_login(&self, _login: &ProviderLogin) -> Result<Option<RemoteId>, SyncError> {
            unreachable!()
        }

        async fn insert_login(&self, _draft: RemoteLoginDraft) -> Result<RemoteId, SyncError> {
            unreachable!()
        }

        async fn update_login(
            &self,
            _id: RemoteId,
            _draft: RemoteLoginDraft,
        ) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn login_exists(&self, _login: &ProviderLogin) -> Result<bool, SyncError> {
            unreachable!()
        }

        async fn find_medical_profile(
            &self,
            _owner: RemoteId,
        ) -> Result<Option<RemoteId>, SyncError> {
            unreachable!()
        }

        async fn insert_medical_profile(
            &self,
            _owner: RemoteId,
            _draft: RemoteMedicalProfileDraft,
        ) -> Result<RemoteId, SyncError> {
            unreachable!()
        }

        async fn update_medical_profile(
            &self,
            _id: RemoteId,
            _draft: RemoteMedicalProfileDraft,
        ) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn insert_vital_signs(&self, _batch: &[RemoteVitalSign]) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn insert_environment_readings(
            &self,
            _batch: &[RemoteEnvironmentReading],
        ) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn insert_sleep_sessions(
            &self,
            _batch: &[RemoteSleepSession],
        ) -> Result<(), SyncError> {
            unreachable!()
        }
    }

    fn dirty_session(key: &str) -> SleepSession {
        let now = Utc::now();
        SleepSession {
            local_id: 1,
            owner_key: OwnerKey::new(key.to_string()).unwrap(),
            started_at: now - Duration::hours(8),
            ended_at: now,
            quality: Some(0.7),
            source: "watch".to_string(),
            dirty: true,
            synced_at: None,
            deleted: false,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn all_unresolved_sessions_skip_marking_and_purge() {
        let store = Arc::new(RecordingSleepStore {
            sessions: vec![dirty_session("ghost")],
            marks: AtomicU64::new(0),
            purges: AtomicU64::new(0),
        });
        let sink: Arc<dyn RemoteSink> = Arc::new(UnusedSink);
        let drainer = SleepSessionDrainer::new(store.clone(), Some(sink.clone()));

        let bridge = IdentityBridge::new(Arc::new(NoProfileStore), Some(sink));
        let cycle = DrainCycle::new(CancelFlag::new(), bridge);

        let drained = drainer.drain(&cycle).await.unwrap();

        // The backlog is still reported, but nothing was uploaded, so the
        // store is left completely untouched.
        assert_eq!(drained, 1);
        assert_eq!(store.marks.load(Ordering::SeqCst), 0);
        assert_eq!(store.purges.load(Ordering::SeqCst), 0);
    }
}
