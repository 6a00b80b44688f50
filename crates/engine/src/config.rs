use std::path::Path;

use serde::{Deserialize, Serialize};

use metronome_core::{MetronomeError, Timestamp};

use crate::interval::{FixedInterval, SuspensionWindow};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Declared suspension window, as configured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuspensionConfig {
    /// Window start on the logical timeline, in milliseconds.
    pub start_ms: u64,
    /// Window end (inclusive), in milliseconds.
    pub end_ms: u64,
}

/// Schedule configuration, typically parsed from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Recurrence interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Suspension windows during which the task must not run.
    #[serde(default)]
    pub suspensions: Vec<SuspensionConfig>,
}

fn default_interval_ms() -> u64 {
    300_000
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            suspensions: Vec::new(),
        }
    }
}

impl ScheduleConfig {
    /// Parse a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MetronomeError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| MetronomeError::Config(e.to_string()))
    }

    /// Build the interval source this config describes.
    pub fn build(&self) -> FixedInterval {
        let source = FixedInterval::new(std::time::Duration::from_millis(self.interval_ms));
        for window in &self.suspensions {
            source.add_suspension(SuspensionWindow::new(
                Timestamp::from_millis(window.start_ms),
                Timestamp::from_millis(window.end_ms),
            ));
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalSource;
    use std::time::Duration;

    #[test]
    fn config_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.interval_ms, 300_000);
        assert!(config.suspensions.is_empty());
    }

    #[test]
    fn parse_toml_with_defaults() {
        let config: ScheduleConfig = toml::from_str("").unwrap();
        assert_eq!(config.interval_ms, 300_000);
    }

    #[test]
    fn parse_toml_full() {
        let config: ScheduleConfig = toml::from_str(
            r#"
            interval_ms = 1000

            [[suspensions]]
            start_ms = 1500
            end_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.suspensions.len(), 1);
        assert_eq!(config.suspensions[0].start_ms, 1500);
    }

    #[test]
    fn build_wires_suspensions() {
        let config: ScheduleConfig = toml::from_str(
            r#"
            interval_ms = 1000

            [[suspensions]]
            start_ms = 1500
            end_ms = 2500
            "#,
        )
        .unwrap();

        let source = config.build();
        assert_eq!(source.interval(), Duration::from_millis(1000));
        assert_eq!(
            source.scheduled_suspension(Timestamp::from_millis(2000)),
            Duration::from_millis(500)
        );
        assert_eq!(
            source.scheduled_suspension(Timestamp::from_millis(3000)),
            Duration::ZERO
        );
    }
}
