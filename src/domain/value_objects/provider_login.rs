use serde::{Deserialize, Serialize};
use std::fmt;

/// (provider, provider-subject) pair identifying an external-login link
/// across the local and remote identity spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderLogin {
    provider: String,
    subject: String,
}

impl ProviderLogin {
    pub fn new(provider: String, subject: String) -> Result<Self, String> {
        if provider.trim().is_empty() {
            return Err("Login provider cannot be empty".to_string());
        }
        if subject.trim().is_empty() {
            return Err("Login subject cannot be empty".to_string());
        }
        Ok(Self { provider, subject })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Display for ProviderLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.subject)
    }
}
