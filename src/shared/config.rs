use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
    pub ingestion: IngestionConfig,
    pub drain: DrainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub flush_interval_secs: u64,
    pub default_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrainConfig {
    pub auto_drain: bool,
    pub interval_secs: u64,
    pub verify_after_drain: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/vitalsync.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            ingestion: IngestionConfig {
                flush_interval_secs: 30,
                default_source: "device".to_string(),
            },
            drain: DrainConfig {
                auto_drain: true,
                interval_secs: 300, // 5 minutes
                verify_after_drain: false,
            },
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("VITALSYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("VITALSYNC_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VITALSYNC_FLUSH_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.ingestion.flush_interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VITALSYNC_DEFAULT_SOURCE") {
            if !v.trim().is_empty() {
                cfg.ingestion.default_source = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("VITALSYNC_AUTO_DRAIN") {
            cfg.drain.auto_drain = parse_bool(&v, cfg.drain.auto_drain);
        }
        if let Ok(v) = std::env::var("VITALSYNC_DRAIN_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.drain.interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VITALSYNC_VERIFY_AFTER_DRAIN") {
            cfg.drain.verify_after_drain = parse_bool(&v, cfg.drain.verify_after_drain);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.ingestion.flush_interval_secs == 0 {
            return Err("Ingestion flush_interval_secs must be greater than 0".to_string());
        }
        if self.drain.auto_drain && self.drain.interval_secs == 0 {
            return Err("Drain interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_flush_interval() {
        let mut cfg = EngineConfig::default();
        cfg.ingestion.flush_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_drain_interval_when_auto() {
        let mut cfg = EngineConfig::default();
        cfg.drain.auto_drain = true;
        cfg.drain.interval_secs = 0;
        assert!(cfg.validate().is_err());

        cfg.drain.auto_drain = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE", false));
        assert!(parse_bool("on", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }
}
