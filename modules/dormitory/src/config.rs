use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration of the dormitory module (`dormitory:` section of the app config).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DormitoryConfig {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_max_username_length")]
    pub max_username_length: usize,
    /// Populate an empty database with demo users, rooms and assignments on startup.
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for DormitoryConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            max_username_length: default_max_username_length(),
            seed_demo_data: false,
        }
    }
}

impl From<&DormitoryConfig> for ServiceConfig {
    fn from(cfg: &DormitoryConfig) -> Self {
        Self {
            max_username_length: cfg.max_username_length,
            min_password_length: cfg.min_password_length,
        }
    }
}

fn default_min_password_length() -> usize {
    6
}

fn default_max_username_length() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: DormitoryConfig = serde_json::from_value(serde_json::json!({
            "seed_demo_data": true
        }))
        .unwrap();
        assert_eq!(cfg.min_password_length, 6);
        assert_eq!(cfg.max_username_length, 50);
        assert!(cfg.seed_demo_data);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<DormitoryConfig, _> =
            serde_json::from_value(serde_json::json!({ "min_pasword_length": 8 }));
        assert!(res.is_err());
    }
}
