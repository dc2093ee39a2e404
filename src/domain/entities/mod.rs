pub mod environment_reading;
pub mod external_login;
pub mod medical_profile;
pub mod owner_profile;
pub mod sleep_session;
pub mod telemetry;
pub mod vital_sign;

pub use environment_reading::{EnvironmentReading, NewEnvironmentReading};
pub use external_login::{ExternalLogin, NewExternalLogin};
pub use medical_profile::{MedicalProfile, NewMedicalProfile};
pub use owner_profile::{NewOwnerProfile, OwnerProfile};
pub use sleep_session::{NewSleepSession, SleepSession};
pub use telemetry::{EnvironmentSample, SleepRecord, TelemetryEvent, VitalReading};
pub use vital_sign::{NewVitalSign, VitalSign};
