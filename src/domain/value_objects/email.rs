use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique business email, the natural key locating an owner profile in the
/// remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("Email address cannot be empty".to_string());
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(format!("Invalid email address: {trimmed}"));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(format!("Invalid email address: {trimmed}"));
        }
        Ok(())
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_address() {
        assert!(EmailAddress::new("a@x.com".into()).is_ok());
    }

    #[test]
    fn test_rejects_missing_parts() {
        assert!(EmailAddress::new("".into()).is_err());
        assert!(EmailAddress::new("no-at-sign".into()).is_err());
        assert!(EmailAddress::new("@x.com".into()).is_err());
        assert!(EmailAddress::new("a@".into()).is_err());
    }
}
