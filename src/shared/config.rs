//! Application configuration. Storage location and fee defaults.

use crate::domain::FeeSettings;
use crate::domain::entities::BASELINE_FEE_PER_SESSION;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_DATA_DIR: &str = "./data";

/// Which store backs the ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding registry.db. Read from CLASS_REGISTRY_DATA_DIR or DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// "sqlite" (default) or "memory". Read from CLASS_REGISTRY_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    /// Fee per session used until an administrator saves one. Decimal string,
    /// e.g. "50.00". Read from CLASS_REGISTRY_DEFAULT_FEE_PER_SESSION.
    #[serde(default)]
    pub default_fee_per_session: Option<String>,

    /// Year fees are quoted for. Defaults to the current UTC year. Read from
    /// CLASS_REGISTRY_REFERENCE_YEAR.
    #[serde(default)]
    pub reference_year: Option<i32>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CLASS_REGISTRY"));
        if let Ok(path) = std::env::var("CLASS_REGISTRY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // DATA_DIR is read directly (no prefix) so a shared .env can set it once.
        if cfg.data_dir.is_none() {
            if let Ok(dir) = std::env::var("DATA_DIR") {
                cfg.data_dir = Some(dir);
            }
        }
        Ok(cfg)
    }

    pub fn data_dir_or_default(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    /// Storage backend. Unknown values fall back to sqlite.
    pub fn storage_kind(&self) -> StorageKind {
        match self.storage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("sqlite") => StorageKind::Sqlite,
            Some("memory") => StorageKind::Memory,
            Some(other) => {
                warn!(storage = other, "unknown storage kind, using sqlite");
                StorageKind::Sqlite
            }
        }
    }

    /// Baseline fee per session. Defaults to 50.00 if unset, unparsable or negative.
    pub fn default_fee_or_default(&self) -> Decimal {
        let Some(raw) = self.default_fee_per_session.as_deref() else {
            return BASELINE_FEE_PER_SESSION;
        };
        match Decimal::from_str(raw.trim()) {
            Ok(fee) if fee >= Decimal::ZERO => fee,
            _ => {
                warn!(value = raw, "invalid default fee per session, using baseline");
                BASELINE_FEE_PER_SESSION
            }
        }
    }

    /// Reference year. Defaults to the current UTC year if unset or below 1.
    pub fn reference_year_or_default(&self) -> i32 {
        self.reference_year
            .filter(|y| *y >= 1)
            .unwrap_or_else(|| Utc::now().year())
    }

    /// Settings reported by the store until an administrator saves new ones.
    pub fn baseline_settings(&self) -> FeeSettings {
        FeeSettings {
            year: self.reference_year_or_default(),
            fee_per_session: self.default_fee_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), DEFAULT_DATA_DIR);
        assert_eq!(cfg.storage_kind(), StorageKind::Sqlite);
        assert_eq!(cfg.default_fee_or_default(), dec!(50.00));
        assert_eq!(cfg.reference_year_or_default(), Utc::now().year());
    }

    #[test]
    fn parses_configured_values() {
        let cfg = AppConfig {
            data_dir: Some("/tmp/reg".into()),
            storage: Some("Memory".into()),
            default_fee_per_session: Some(" 72.5 ".into()),
            reference_year: Some(2026),
        };
        assert_eq!(cfg.storage_kind(), StorageKind::Memory);
        assert_eq!(
            cfg.baseline_settings(),
            FeeSettings {
                year: 2026,
                fee_per_session: dec!(72.5)
            }
        );
    }

    #[test]
    fn bad_fee_falls_back_to_baseline() {
        for raw in ["abc", "-3"] {
            let cfg = AppConfig {
                default_fee_per_session: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(cfg.default_fee_or_default(), BASELINE_FEE_PER_SESSION);
        }
    }
}
