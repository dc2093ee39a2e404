pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod shared;

pub use application::ports::remote_sink::{
    RemoteEnvironmentReading, RemoteLoginDraft, RemoteMedicalProfileDraft, RemoteProfile,
    RemoteProfileDraft, RemoteSink, RemoteSleepSession, RemoteVitalSign,
};
pub use application::services::{ActiveSession, CycleOutcome, CycleReport, DrainStatus};
pub use domain::entities::TelemetryEvent;
pub use engine::SyncEngine;
pub use shared::config::EngineConfig;
pub use shared::error::{Result, SyncError};

/// Install the process-wide tracing subscriber. Call once from the host
/// before `SyncEngine::initialize`.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitalsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
