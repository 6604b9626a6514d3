use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::tracker::ServoBounds;

/// Pulse widths the servo driver accepts at all.
pub const SERVO_US_MIN: i32 = 500;
pub const SERVO_US_MAX: i32 = 2500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    IngestFix,
    ReadStatus,
}

/// Options the tracking core reads. Never modified after startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Satellites a fix needs before it may become home
    pub satellite_home_min: u8,
    /// Dead-reckon azimuth between fixes
    pub project: bool,
    /// 0 moves straight to target, higher values settle more slowly
    pub servo_smooth: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub first_update_delay: Duration,
    pub servo: ServoConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            satellite_home_min: 5,
            project: true,
            servo_smooth: 5,
            first_update_delay: Duration::from_secs(5),
            servo: ServoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    pub azimuth: ServoBounds,
    pub elevation: ServoBounds,
}

pub(crate) fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let servo = &self.tracker.servo;
        for (name, bounds) in [("azimuth", servo.azimuth), ("elevation", servo.elevation)] {
            for (edge, us) in [("low", bounds.low), ("high", bounds.high)] {
                if !(SERVO_US_MIN..=SERVO_US_MAX).contains(&us) {
                    return Err(ConfigError::Invalid {
                        field: format!("tracker.servo.{name}.{edge}"),
                        message: format!(
                            "{us}us outside {SERVO_US_MIN}..={SERVO_US_MAX}us"
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.tracker.satellite_home_min, 5);
        assert!(config.tracker.project);
        assert_eq!(config.tracker.servo_smooth, 5);
        assert_eq!(config.tracker.first_update_delay, Duration::from_secs(5));
        assert_eq!(config.tracker.servo.azimuth, ServoBounds::default());
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn full_file() {
        let yaml = r#"
tracker:
  satellite_home_min: 7
  project: false
  servo_smooth: 0
  first_update_delay: 1500ms
  servo:
    azimuth: { low: 600, high: 2400 }
    elevation: { low: 2000, high: 1000 }
web:
  bind: 127.0.0.1:9000
api_keys:
  - key: secret
    name: ground
    permissions: [ingest_fix, read_status]
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.tracker.satellite_home_min, 7);
        assert!(!config.tracker.project);
        assert_eq!(config.tracker.first_update_delay, Duration::from_millis(1500));
        assert_eq!(config.tracker.servo.azimuth, ServoBounds { low: 600, high: 2400 });
        assert_eq!(config.tracker.servo.elevation.low, 2000);
        let key = config.find_api_key("secret").unwrap();
        assert!(key.permissions.contains(&Permission::IngestFix));
        assert!(config.find_api_key("nope").is_none());
    }

    #[test]
    fn rejects_out_of_range_pulse_width() {
        let yaml = "tracker:\n  servo:\n    elevation: { low: 100, high: 2000 }\n";
        match Config::from_str(yaml) {
            Err(ConfigError::Invalid { field, .. }) => {
                assert_eq!(field, "tracker.servo.elevation.low")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_duration() {
        let yaml = "tracker:\n  first_update_delay: soon\n";
        assert!(matches!(Config::from_str(yaml), Err(ConfigError::Yaml(_))));
    }
}
