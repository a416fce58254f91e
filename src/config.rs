// ⚙️ Store Configuration - Defaults passed in explicitly
//
// Every default the store may materialise (the starter service, tag set,
// time grid) lives on this value. The starter service id is generated once
// per config so every default schedule points at the same service.

use crate::models::{AppSettings, Service};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_KEY_PREFIX: &str = "pilaris_control";
pub const DEFAULT_SETTINGS_KEY: &str = "pilaris_control_settings";
pub const DEFAULT_STUDENTS_PER_SLOT: usize = 3;
pub const DEFAULT_SERVICE_NAME: &str = "Pilates";
pub const DEFAULT_SERVICE_PRICE: f64 = 25.0;
pub const NEW_SERVICE_NAME: &str = "Novo Atendimento";
pub const NEW_SERVICE_PRICE: f64 = 20.0;

/// Flat placeholder rate applied to gross revenue. Not a tax computation.
pub const ESTIMATED_TAX_RATE: f64 = 0.06;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix of every per-date key (must not end with '_')
    pub key_prefix: String,

    /// Fixed literal key holding AppSettings
    pub settings_key: String,

    /// Time labels of a day, in display order
    pub time_slots: Vec<String>,

    /// Blank students prefilled in each slot of a new day
    pub students_per_slot: usize,

    /// Catalog entry used when no settings are stored yet
    pub default_service: Service,

    pub default_tags: Vec<String>,

    pub new_service_name: String,
    pub new_service_price: f64,

    pub tax_rate: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            time_slots: default_time_slots(),
            students_per_slot: DEFAULT_STUDENTS_PER_SLOT,
            default_service: Service::new(DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_PRICE),
            default_tags: vec![
                "Estúdio".to_string(),
                "Wellhub".to_string(),
                "Gympass".to_string(),
            ],
            new_service_name: NEW_SERVICE_NAME.to_string(),
            new_service_price: NEW_SERVICE_PRICE,
            tax_rate: ESTIMATED_TAX_RATE,
        }
    }
}

/// Hourly grid 06:00..=20:00
fn default_time_slots() -> Vec<String> {
    (6..=20).map(|hour| format!("{:02}:00", hour)).collect()
}

impl StoreConfig {
    /// Load config from a JSON file; absent fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: StoreConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    pub fn default_settings(&self) -> AppSettings {
        AppSettings {
            services: vec![self.default_service.clone()],
            student_tags: self.default_tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();

        assert_eq!(config.time_slots.first().map(String::as_str), Some("06:00"));
        assert_eq!(config.time_slots.last().map(String::as_str), Some("20:00"));
        assert!(config.time_slots.contains(&"08:00".to_string()));
        assert_eq!(config.default_service.name, "Pilates");
        assert_eq!(config.default_service.price, 25.0);
    }

    #[test]
    fn test_default_settings_reuse_service_id() {
        let config = StoreConfig::default();

        let a = config.default_settings();
        let b = config.default_settings();

        assert_eq!(a.services[0].id, b.services[0].id);
        assert_eq!(a.student_tags.len(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"students_per_slot": 5, "tax_rate": 0.1}"#).unwrap();

        assert_eq!(config.students_per_slot, 5);
        assert_eq!(config.tax_rate, 0.1);
        assert_eq!(config.key_prefix, DEFAULT_KEY_PREFIX);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(StoreConfig::from_file("/nonexistent/pilaris.json").is_err());
    }
}
