use crate::domain::entities::{
    EnvironmentReading, ExternalLogin, MedicalProfile, OwnerProfile, SleepSession, VitalSign,
};
use crate::domain::value_objects::{EmailAddress, OwnerKey, ProviderLogin};
use crate::shared::error::SyncError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

// Raw table shapes; all timestamps are unix milliseconds. Conversion into
// domain entities happens here so SQL code never touches value-object
// validation.

#[derive(Debug, Clone, FromRow)]
pub struct OwnerProfileRow {
    pub id: i64,
    pub owner_key: String,
    pub email: String,
    pub display_name: String,
    pub birth_date: Option<String>,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OwnerProfileRow {
    pub fn into_domain(self) -> Result<OwnerProfile, SyncError> {
        Ok(OwnerProfile {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            email: EmailAddress::new(self.email).map_err(SyncError::Storage)?,
            display_name: self.display_name,
            birth_date: self.birth_date.map(|date| parse_date(&date)).transpose()?,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
            updated_at: datetime_from_ms(self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ExternalLoginRow {
    pub id: i64,
    pub owner_key: String,
    pub provider: String,
    pub subject: String,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
}

impl ExternalLoginRow {
    pub fn into_domain(self) -> Result<ExternalLogin, SyncError> {
        Ok(ExternalLogin {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            login: ProviderLogin::new(self.provider, self.subject).map_err(SyncError::Storage)?,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MedicalProfileRow {
    pub id: i64,
    pub owner_key: String,
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub conditions: String,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MedicalProfileRow {
    pub fn into_domain(self) -> Result<MedicalProfile, SyncError> {
        Ok(MedicalProfile {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            blood_type: self.blood_type,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            conditions: serde_json::from_str(&self.conditions)?,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
            updated_at: datetime_from_ms(self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct VitalSignRow {
    pub id: i64,
    pub owner_key: String,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: i64,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
}

impl VitalSignRow {
    pub fn into_domain(self) -> Result<VitalSign, SyncError> {
        Ok(VitalSign {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            kind: self.kind.parse().map_err(SyncError::Storage)?,
            value: self.value,
            unit: self.unit,
            source: self.source,
            recorded_at: datetime_from_ms(self.recorded_at)?,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EnvironmentReadingRow {
    pub id: i64,
    pub owner_key: String,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub recorded_at: i64,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
}

impl EnvironmentReadingRow {
    pub fn into_domain(self) -> Result<EnvironmentReading, SyncError> {
        Ok(EnvironmentReading {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            kind: self.kind.parse().map_err(SyncError::Storage)?,
            value: self.value,
            unit: self.unit,
            source: self.source,
            recorded_at: datetime_from_ms(self.recorded_at)?,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SleepSessionRow {
    pub id: i64,
    pub owner_key: String,
    pub started_at: i64,
    pub ended_at: i64,
    pub quality: Option<f64>,
    pub source: String,
    pub is_dirty: bool,
    pub synced_at: Option<i64>,
    pub is_deleted: bool,
    pub created_at: i64,
}

impl SleepSessionRow {
    pub fn into_domain(self) -> Result<SleepSession, SyncError> {
        Ok(SleepSession {
            local_id: self.id,
            owner_key: owner_key(self.owner_key)?,
            started_at: datetime_from_ms(self.started_at)?,
            ended_at: datetime_from_ms(self.ended_at)?,
            quality: self.quality,
            source: self.source,
            dirty: self.is_dirty,
            synced_at: self.synced_at.map(datetime_from_ms).transpose()?,
            deleted: self.is_deleted,
            created_at: datetime_from_ms(self.created_at)?,
        })
    }
}

fn owner_key(value: String) -> Result<OwnerKey, SyncError> {
    OwnerKey::new(value).map_err(SyncError::Storage)
}

pub fn datetime_from_ms(ms: i64) -> Result<DateTime<Utc>, SyncError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| SyncError::Storage(format!("Timestamp out of range: {ms}")))
}

fn parse_date(value: &str) -> Result<NaiveDate, SyncError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| SyncError::Storage(format!("Invalid date {value}: {err}")))
}
