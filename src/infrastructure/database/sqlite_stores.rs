use super::rows::{
    EnvironmentReadingRow, ExternalLoginRow, MedicalProfileRow, OwnerProfileRow, SleepSessionRow,
    VitalSignRow,
};
use crate::application::ports::record_store::{
    EnvironmentReadingStore, ExternalLoginStore, MedicalProfileStore, OwnerProfileStore,
    SleepSessionStore, VitalSignStore,
};
use crate::domain::entities::{
    EnvironmentReading, ExternalLogin, MedicalProfile, NewEnvironmentReading, NewExternalLogin,
    NewMedicalProfile, NewOwnerProfile, NewSleepSession, NewVitalSign, OwnerProfile, SleepSession,
    VitalSign,
};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// SQLite-backed implementation of every record-store trait. One struct over
/// one pool; all six tables share the dirty/synced_at/is_deleted columns.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn insert_flags(as_synced: bool, now_ms: i64) -> (i64, Option<i64>) {
    if as_synced {
        (0, Some(now_ms))
    } else {
        (1, None)
    }
}

#[async_trait]
impl OwnerProfileStore for SqliteRecordStore {
    async fn add(
        &self,
        draft: NewOwnerProfile,
        as_synced: bool,
    ) -> Result<OwnerProfile, SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);
        let birth_date = draft.birth_date.map(|d| d.format("%Y-%m-%d").to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO owner_profiles
                (owner_key, email, display_name, birth_date, is_dirty, synced_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.owner_key.as_str())
        .bind(draft.email.as_str())
        .bind(&draft.display_name)
        .bind(birth_date)
        .bind(dirty)
        .bind(synced_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, OwnerProfileRow>(
            "SELECT * FROM owner_profiles WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn update(&self, profile: &OwnerProfile) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        let birth_date = profile.birth_date.map(|d| d.format("%Y-%m-%d").to_string());

        sqlx::query(
            r#"
            UPDATE owner_profiles
            SET email = ?, display_name = ?, birth_date = ?,
                is_dirty = 1, synced_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(profile.email.as_str())
        .bind(&profile.display_name)
        .bind(birth_date)
        .bind(now)
        .bind(profile.local_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_owner_key(&self, key: &OwnerKey) -> Result<Option<OwnerProfile>, SyncError> {
        let row = sqlx::query_as::<_, OwnerProfileRow>(
            "SELECT * FROM owner_profiles WHERE owner_key = ? AND is_deleted = 0",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(OwnerProfileRow::into_domain).transpose()
    }

    async fn dirty_profiles(&self) -> Result<Vec<OwnerProfile>, SyncError> {
        let rows = sqlx::query_as::<_, OwnerProfileRow>(
            "SELECT * FROM owner_profiles WHERE is_dirty = 1 ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OwnerProfileRow::into_domain).collect()
    }

    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("UPDATE owner_profiles SET is_dirty = 0, synced_at = ? WHERE id = ?")
                .bind(synced_at.timestamp_millis())
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn recently_synced(&self, limit: u32) -> Result<Vec<OwnerProfile>, SyncError> {
        let rows = sqlx::query_as::<_, OwnerProfileRow>(
            r#"
            SELECT * FROM owner_profiles
            WHERE is_dirty = 0 AND synced_at IS NOT NULL AND is_deleted = 0
            ORDER BY synced_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OwnerProfileRow::into_domain).collect()
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            UPDATE owner_profiles
            SET is_deleted = 1, is_dirty = 1, synced_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM owner_profiles WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ExternalLoginStore for SqliteRecordStore {
    async fn add(
        &self,
        draft: NewExternalLogin,
        as_synced: bool,
    ) -> Result<ExternalLogin, SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);

        let result = sqlx::query(
            r#"
            INSERT INTO external_logins
                (owner_key, provider, subject, is_dirty, synced_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.owner_key.as_str())
        .bind(draft.login.provider())
        .bind(draft.login.subject())
        .bind(dirty)
        .bind(synced_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ExternalLoginRow>(
            "SELECT * FROM external_logins WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn logins_for_owner(&self, key: &OwnerKey) -> Result<Vec<ExternalLogin>, SyncError> {
        let rows = sqlx::query_as::<_, ExternalLoginRow>(
            "SELECT * FROM external_logins WHERE owner_key = ? AND is_deleted = 0 ORDER BY id ASC",
        )
        .bind(key.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExternalLoginRow::into_domain).collect()
    }

    async fn dirty_logins(&self) -> Result<Vec<ExternalLogin>, SyncError> {
        let rows = sqlx::query_as::<_, ExternalLoginRow>(
            "SELECT * FROM external_logins WHERE is_dirty = 1 ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExternalLoginRow::into_domain).collect()
    }

    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("UPDATE external_logins SET is_dirty = 0, synced_at = ? WHERE id = ?")
                .bind(synced_at.timestamp_millis())
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn recently_synced(&self, limit: u32) -> Result<Vec<ExternalLogin>, SyncError> {
        let rows = sqlx::query_as::<_, ExternalLoginRow>(
            r#"
            SELECT * FROM external_logins
            WHERE is_dirty = 0 AND synced_at IS NOT NULL AND is_deleted = 0
            ORDER BY synced_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExternalLoginRow::into_domain).collect()
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        sqlx::query(
            "UPDATE external_logins SET is_deleted = 1, is_dirty = 1, synced_at = NULL WHERE id = ?",
        )
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM external_logins WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MedicalProfileStore for SqliteRecordStore {
    async fn add(
        &self,
        draft: NewMedicalProfile,
        as_synced: bool,
    ) -> Result<MedicalProfile, SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);
        let conditions = serde_json::to_string(&draft.conditions)?;

        let result = sqlx::query(
            r#"
            INSERT INTO medical_profiles
                (owner_key, blood_type, height_cm, weight_kg, conditions,
                 is_dirty, synced_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.owner_key.as_str())
        .bind(&draft.blood_type)
        .bind(draft.height_cm)
        .bind(draft.weight_kg)
        .bind(conditions)
        .bind(dirty)
        .bind(synced_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, MedicalProfileRow>(
            "SELECT * FROM medical_profiles WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn update(&self, profile: &MedicalProfile) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        let conditions = serde_json::to_string(&profile.conditions)?;

        sqlx::query(
            r#"
            UPDATE medical_profiles
            SET blood_type = ?, height_cm = ?, weight_kg = ?, conditions = ?,
                is_dirty = 1, synced_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.blood_type)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(conditions)
        .bind(now)
        .bind(profile.local_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_owner_key(&self, key: &OwnerKey) -> Result<Option<MedicalProfile>, SyncError> {
        let row = sqlx::query_as::<_, MedicalProfileRow>(
            "SELECT * FROM medical_profiles WHERE owner_key = ? AND is_deleted = 0",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MedicalProfileRow::into_domain).transpose()
    }

    async fn dirty_profiles(&self) -> Result<Vec<MedicalProfile>, SyncError> {
        let rows = sqlx::query_as::<_, MedicalProfileRow>(
            "SELECT * FROM medical_profiles WHERE is_dirty = 1 ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(MedicalProfileRow::into_domain)
            .collect()
    }

    async fn mark_synced(&self, ids: &[i64], synced_at: DateTime<Utc>) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("UPDATE medical_profiles SET is_dirty = 0, synced_at = ? WHERE id = ?")
                .bind(synced_at.timestamp_millis())
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            UPDATE medical_profiles
            SET is_deleted = 1, is_dirty = 1, synced_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM medical_profiles WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl VitalSignStore for SqliteRecordStore {
    async fn add_many(&self, drafts: Vec<NewVitalSign>, as_synced: bool) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);

        let mut tx = self.pool.begin().await?;
        for draft in drafts {
            sqlx::query(
                r#"
                INSERT INTO vital_signs
                    (owner_key, kind, value, unit, source, recorded_at,
                     is_dirty, synced_at, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(draft.owner_key.as_str())
            .bind(draft.kind.as_str())
            .bind(draft.value)
            .bind(&draft.unit)
            .bind(&draft.source)
            .bind(draft.recorded_at.timestamp_millis())
            .bind(dirty)
            .bind(synced_at)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn dirty_samples(&self) -> Result<Vec<VitalSign>, SyncError> {
        let rows = sqlx::query_as::<_, VitalSignRow>(
            "SELECT * FROM vital_signs WHERE is_dirty = 1 ORDER BY recorded_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VitalSignRow::into_domain).collect()
    }

    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        let result = sqlx::query(
            r#"
            UPDATE vital_signs
            SET is_dirty = 0, synced_at = ?
            WHERE owner_key = ? AND is_dirty = 1 AND recorded_at <= ?
            "#,
        )
        .bind(synced_at.timestamp_millis())
        .bind(owner.as_str())
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn recent_samples(
        &self,
        owner: &OwnerKey,
        limit: u32,
    ) -> Result<Vec<VitalSign>, SyncError> {
        let rows = sqlx::query_as::<_, VitalSignRow>(
            r#"
            SELECT * FROM vital_signs
            WHERE owner_key = ? AND is_deleted = 0
            ORDER BY recorded_at DESC
            LIMIT ?
            "#,
        )
        .bind(owner.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VitalSignRow::into_domain).collect()
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        sqlx::query("UPDATE vital_signs SET is_deleted = 1 WHERE id = ?")
            .bind(local_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM vital_signs WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EnvironmentReadingStore for SqliteRecordStore {
    async fn add_many(
        &self,
        drafts: Vec<NewEnvironmentReading>,
        as_synced: bool,
    ) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);

        let mut tx = self.pool.begin().await?;
        for draft in drafts {
            sqlx::query(
                r#"
                INSERT INTO environment_readings
                    (owner_key, kind, value, unit, source, recorded_at,
                     is_dirty, synced_at, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(draft.owner_key.as_str())
            .bind(draft.kind.as_str())
            .bind(draft.value)
            .bind(&draft.unit)
            .bind(&draft.source)
            .bind(draft.recorded_at.timestamp_millis())
            .bind(dirty)
            .bind(synced_at)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn dirty_readings(&self) -> Result<Vec<EnvironmentReading>, SyncError> {
        let rows = sqlx::query_as::<_, EnvironmentReadingRow>(
            "SELECT * FROM environment_readings WHERE is_dirty = 1 ORDER BY recorded_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(EnvironmentReadingRow::into_domain)
            .collect()
    }

    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        let result = sqlx::query(
            r#"
            UPDATE environment_readings
            SET is_dirty = 0, synced_at = ?
            WHERE owner_key = ? AND is_dirty = 1 AND recorded_at <= ?
            "#,
        )
        .bind(synced_at.timestamp_millis())
        .bind(owner.as_str())
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn recent_readings(
        &self,
        owner: &OwnerKey,
        limit: u32,
    ) -> Result<Vec<EnvironmentReading>, SyncError> {
        let rows = sqlx::query_as::<_, EnvironmentReadingRow>(
            r#"
            SELECT * FROM environment_readings
            WHERE owner_key = ? AND is_deleted = 0
            ORDER BY recorded_at DESC
            LIMIT ?
            "#,
        )
        .bind(owner.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(EnvironmentReadingRow::into_domain)
            .collect()
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        sqlx::query("UPDATE environment_readings SET is_deleted = 1 WHERE id = ?")
            .bind(local_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM environment_readings WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SleepSessionStore for SqliteRecordStore {
    async fn add_many(
        &self,
        drafts: Vec<NewSleepSession>,
        as_synced: bool,
    ) -> Result<(), SyncError> {
        let now = Utc::now().timestamp_millis();
        let (dirty, synced_at) = insert_flags(as_synced, now);

        let mut tx = self.pool.begin().await?;
        for draft in drafts {
            sqlx::query(
                r#"
                INSERT INTO sleep_sessions
                    (owner_key, started_at, ended_at, quality, source,
                     is_dirty, synced_at, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(draft.owner_key.as_str())
            .bind(draft.started_at.timestamp_millis())
            .bind(draft.ended_at.timestamp_millis())
            .bind(draft.quality)
            .bind(&draft.source)
            .bind(dirty)
            .bind(synced_at)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn dirty_sessions(&self) -> Result<Vec<SleepSession>, SyncError> {
        let rows = sqlx::query_as::<_, SleepSessionRow>(
            "SELECT * FROM sleep_sessions WHERE is_dirty = 1 ORDER BY ended_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SleepSessionRow::into_domain).collect()
    }

    async fn mark_synced_through(
        &self,
        owner: &OwnerKey,
        cutoff: DateTime<Utc>,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        let result = sqlx::query(
            r#"
            UPDATE sleep_sessions
            SET is_dirty = 0, synced_at = ?
            WHERE owner_key = ? AND is_dirty = 1 AND ended_at <= ?
            "#,
        )
        .bind(synced_at.timestamp_millis())
        .bind(owner.as_str())
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn recent_sessions(
        &self,
        owner: &OwnerKey,
        limit: u32,
    ) -> Result<Vec<SleepSession>, SyncError> {
        let rows = sqlx::query_as::<_, SleepSessionRow>(
            r#"
            SELECT * FROM sleep_sessions
            WHERE owner_key = ? AND is_deleted = 0
            ORDER BY ended_at DESC
            LIMIT ?
            "#,
        )
        .bind(owner.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SleepSessionRow::into_domain).collect()
    }

    async fn soft_delete(&self, local_id: i64) -> Result<(), SyncError> {
        sqlx::query("UPDATE sleep_sessions SET is_deleted = 1 WHERE id = ?")
            .bind(local_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "DELETE FROM sleep_sessions WHERE is_dirty = 0 AND synced_at IS NOT NULL AND synced_at < ?",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EmailAddress, VitalKind};
    use crate::infrastructure::database::connection_pool::ConnectionPool;
    use chrono::Duration;

    async fn store() -> SqliteRecordStore {
        let pool = ConnectionPool::in_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteRecordStore::new(pool.pool().clone())
    }

    fn owner(key: &str) -> OwnerKey {
        OwnerKey::new(key.to_string()).unwrap()
    }

    fn profile_draft(key: &str, email: &str) -> NewOwnerProfile {
        NewOwnerProfile {
            owner_key: owner(key),
            email: EmailAddress::new(email.to_string()).unwrap(),
            display_name: "Test Owner".to_string(),
            birth_date: None,
        }
    }

    fn vital_draft(key: &str, value: f64, recorded_at: DateTime<Utc>) -> NewVitalSign {
        NewVitalSign {
            owner_key: owner(key),
            kind: VitalKind::HeartRate,
            value,
            unit: "bpm".to_string(),
            source: "test".to_string(),
            recorded_at,
        }
    }

    async fn add_profile(store: &SqliteRecordStore, key: &str, email: &str, as_synced: bool) -> OwnerProfile {
        OwnerProfileStore::add(store, profile_draft(key, email), as_synced)
            .await
            .unwrap()
    }

    async fn add_vitals(store: &SqliteRecordStore, drafts: Vec<NewVitalSign>) {
        VitalSignStore::add_many(store, drafts, false).await.unwrap();
    }

    #[tokio::test]
    async fn add_inserts_dirty_and_mark_synced_clears_it() {
        let store = store().await;
        let profile = add_profile(&store, "alice", "alice@example.com", false).await;
        assert!(profile.dirty);
        assert!(profile.synced_at.is_none());

        OwnerProfileStore::mark_synced(&store, &[profile.local_id], Utc::now())
            .await
            .unwrap();
        let dirty = OwnerProfileStore::dirty_profiles(&store).await.unwrap();
        assert!(dirty.is_empty());
    }

    #[tokio::test]
    async fn add_as_synced_skips_the_dirty_queue() {
        let store = store().await;
        let profile = add_profile(&store, "bob", "bob@example.com", true).await;
        assert!(!profile.dirty);
        assert!(profile.synced_at.is_some());
        assert!(OwnerProfileStore::dirty_profiles(&store)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_makes_a_synced_profile_dirty_again() {
        let store = store().await;
        let mut profile = add_profile(&store, "carol", "carol@example.com", true).await;

        profile.display_name = "Carol Renamed".to_string();
        OwnerProfileStore::update(&store, &profile).await.unwrap();

        let dirty = OwnerProfileStore::dirty_profiles(&store).await.unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].display_name, "Carol Renamed");
        assert!(dirty[0].synced_at.is_none());
    }

    #[tokio::test]
    async fn soft_deleted_profile_stays_in_dirty_queue_but_not_in_reads() {
        let store = store().await;
        let profile = add_profile(&store, "dave", "dave@example.com", false).await;

        OwnerProfileStore::soft_delete(&store, profile.local_id)
            .await
            .unwrap();

        let found = OwnerProfileStore::find_by_owner_key(&store, &owner("dave"))
            .await
            .unwrap();
        assert!(found.is_none());
        let dirty = OwnerProfileStore::dirty_profiles(&store).await.unwrap();
        assert_eq!(dirty.len(), 1);
        assert!(dirty[0].deleted);
    }

    #[tokio::test]
    async fn dirty_samples_come_back_in_event_time_order() {
        let store = store().await;
        let base = Utc::now();
        add_vitals(
            &store,
            vec![
                vital_draft("alice", 72.0, base + Duration::seconds(20)),
                vital_draft("alice", 70.0, base),
                vital_draft("alice", 71.0, base + Duration::seconds(10)),
            ],
        )
        .await;

        let dirty = store.dirty_samples().await.unwrap();
        let values: Vec<f64> = dirty.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![70.0, 71.0, 72.0]);
    }

    #[tokio::test]
    async fn cutoff_marking_leaves_rows_recorded_after_the_cutoff_dirty() {
        let store = store().await;
        let base = Utc::now();
        add_vitals(
            &store,
            vec![
                vital_draft("alice", 70.0, base),
                vital_draft("alice", 71.0, base + Duration::seconds(10)),
            ],
        )
        .await;

        // A sample arriving while the upload is in flight.
        add_vitals(
            &store,
            vec![vital_draft("alice", 99.0, base + Duration::seconds(60))],
        )
        .await;

        let marked = VitalSignStore::mark_synced_through(
            &store,
            &owner("alice"),
            base + Duration::seconds(10),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(marked, 2);

        let dirty = store.dirty_samples().await.unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].value, 99.0);
    }

    #[tokio::test]
    async fn cutoff_marking_is_scoped_to_one_owner() {
        let store = store().await;
        let base = Utc::now();
        add_vitals(
            &store,
            vec![vital_draft("alice", 70.0, base), vital_draft("bob", 80.0, base)],
        )
        .await;

        VitalSignStore::mark_synced_through(&store, &owner("alice"), base, Utc::now())
            .await
            .unwrap();

        let dirty = store.dirty_samples().await.unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].owner_key.as_str(), "bob");
    }

    #[tokio::test]
    async fn purge_removes_only_old_synced_rows() {
        let store = store().await;
        let base = Utc::now();
        add_vitals(
            &store,
            vec![
                vital_draft("alice", 70.0, base - Duration::seconds(10)),
                vital_draft("alice", 71.0, base),
            ],
        )
        .await;

        // Sync only the older row, stamping it with an old synced_at.
        let old = base - Duration::days(30);
        VitalSignStore::mark_synced_through(&store, &owner("alice"), base - Duration::seconds(10), old)
            .await
            .unwrap();

        let purged = VitalSignStore::purge_synced_before(&store, base - Duration::days(7))
            .await
            .unwrap();
        assert_eq!(purged, 1);

        // The dirty row survives no matter how old it is.
        let dirty = store.dirty_samples().await.unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].value, 71.0);
    }

    #[tokio::test]
    async fn recent_samples_exclude_soft_deleted_rows() {
        let store = store().await;
        let base = Utc::now();
        add_vitals(
            &store,
            vec![vital_draft("alice", 70.0, base), vital_draft("alice", 71.0, base)],
        )
        .await;

        let dirty = store.dirty_samples().await.unwrap();
        VitalSignStore::soft_delete(&store, dirty[0].local_id)
            .await
            .unwrap();

        let recent = VitalSignStore::recent_samples(&store, &owner("alice"), 10)
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        // Deleted row is still visible to the drain path.
        assert_eq!(store.dirty_samples().await.unwrap().len(), 2);
    }
}
