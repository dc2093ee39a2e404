pub mod email;
pub mod measurement;
pub mod owner_key;
pub mod provider_login;
pub mod remote_id;

pub use email::EmailAddress;
pub use measurement::{EnvironmentKind, VitalKind};
pub use owner_key::OwnerKey;
pub use provider_login::ProviderLogin;
pub use remote_id::RemoteId;
