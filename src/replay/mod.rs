//! Offline replay of a recorded fix sequence on a simulated clock.

use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use crate::config::{deserialize_duration, TrackerConfig};
use crate::telemetry::GpsRecord;
use crate::tracker::{format_active, AatTracker, FixSlot, Millis, NoopActuator};
use crate::tracker::{ActiveView, Display, IdleView};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("fix {0}: out of order")]
    OutOfOrder(usize),
    #[error("tick must be at least 1ms")]
    ZeroTick,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFile {
    /// Control loop cadence
    #[serde(default = "default_tick", deserialize_with = "deserialize_duration")]
    pub tick: Duration,
    /// How long to keep ticking after the last fix
    #[serde(default = "default_tail", deserialize_with = "deserialize_duration")]
    pub tail: Duration,
    pub fixes: Vec<ReplayFix>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFix {
    #[serde(deserialize_with = "deserialize_duration")]
    pub at: Duration,
    #[serde(flatten)]
    pub record: GpsRecord,
}

#[derive(Debug, Clone)]
pub struct ReplayLine {
    pub at: Millis,
    pub view: ActiveView,
}

impl std::fmt::Display for ReplayLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={:>4}.{:03}s {}",
            self.at.0 / 1000,
            self.at.0 % 1000,
            format_active(&self.view)
        )
    }
}

fn default_tick() -> Duration {
    Duration::from_millis(20)
}

fn default_tail() -> Duration {
    Duration::from_secs(2)
}

/// Collects every active view together with the simulated time it was shown.
#[derive(Clone, Default)]
struct CollectingDisplay {
    now: Arc<Mutex<Millis>>,
    lines: Arc<Mutex<Vec<ReplayLine>>>,
}

impl Display for CollectingDisplay {
    fn show_idle(&mut self, _view: &IdleView) {}

    fn show_active(&mut self, view: &ActiveView) {
        let at = *self.now.lock().unwrap_or_else(|e| e.into_inner());
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ReplayLine {
                at,
                view: view.clone(),
            });
    }
}

impl ReplayFile {
    pub fn from_file(path: &str) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ReplayError> {
        let file: ReplayFile = serde_yaml::from_str(yaml)?;
        if file.tick.as_millis() == 0 {
            return Err(ReplayError::ZeroTick);
        }
        if let Some(i) = file
            .fixes
            .windows(2)
            .position(|pair| pair[1].at < pair[0].at)
        {
            return Err(ReplayError::OutOfOrder(i + 1));
        }
        Ok(file)
    }

    /// Drives a fresh tracker through the recording and returns every
    /// servo update it produced.
    pub fn run(&self, config: &TrackerConfig) -> Vec<ReplayLine> {
        let display = CollectingDisplay::default();
        let mut tracker = AatTracker::new(
            config,
            Box::new(NoopActuator),
            Box::new(display.clone()),
            Millis(0),
        );
        let slot = FixSlot::new();

        let tick_ms = u32::try_from(self.tick.as_millis()).unwrap_or(u32::MAX);
        let end_ms = self.fixes.last().map(|f| f.at).unwrap_or_default() + self.tail;
        let end_ms = end_ms.as_millis() as u64;

        let mut pending = self.fixes.iter().peekable();
        // elapsed_ms drives the schedule, now is what the tracker sees
        let mut elapsed_ms = 0u64;
        let mut now = Millis(0);
        while elapsed_ms <= end_ms {
            while let Some(fix) = pending.next_if(|f| f.at.as_millis() as u64 <= elapsed_ms) {
                slot.publish(fix.record.into());
            }
            *display.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
            tracker.tick(now, &slot);
            now = now.wrapping_add(tick_ms);
            elapsed_ms += tick_ms as u64;
        }

        let lines = display.lines.lock().unwrap_or_else(|e| e.into_inner());
        log::info!("Replayed {} fixes, {} servo updates", self.fixes.len(), lines.len());
        lines.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"
tick: 20ms
tail: 1s
fixes:
  - { at: 0s, lat: 0, lon: 0, altitude: 1000, satellites: 8 }
  - { at: 1s, lat: 10000, lon: 0, altitude: 1100, satellites: 8 }
  - { at: 2s, lat: 10000, lon: 10000, altitude: 1100, satellites: 8 }
"#;

    fn config() -> TrackerConfig {
        TrackerConfig {
            project: false,
            first_update_delay: Duration::from_millis(0),
            ..Default::default()
        }
    }

    #[test]
    fn parses_recording() {
        let replay = ReplayFile::from_str(RECORDING).unwrap();
        assert_eq!(replay.tick, Duration::from_millis(20));
        assert_eq!(replay.fixes.len(), 3);
        assert_eq!(replay.fixes[1].at, Duration::from_secs(1));
        assert_eq!(replay.fixes[1].record.altitude_m(), 100);
    }

    #[test]
    fn rejects_out_of_order_fixes() {
        let yaml = "fixes:\n  - { at: 2s, lat: 0, lon: 0, altitude: 1000, satellites: 8 }\n  - { at: 1s, lat: 0, lon: 0, altitude: 1000, satellites: 8 }\n";
        assert!(matches!(
            ReplayFile::from_str(yaml),
            Err(ReplayError::OutOfOrder(1))
        ));
    }

    #[test]
    fn replay_settles_on_last_fix() {
        let replay = ReplayFile::from_str(RECORDING).unwrap();
        let lines = replay.run(&config());

        // one update per tick after the home latch through the end of the tail
        assert_eq!(lines.len(), 150);
        let last = &lines.last().unwrap().view;
        assert!((last.azimuth_deg - 45.0).abs() < 0.5, "{}", last.azimuth_deg);
        assert_eq!(last.altitude_delta_m, 100);
        assert!(last.distance_m > 150.0 && last.distance_m < 160.0);
        assert_eq!(lines.last().unwrap().at, Millis(3000));
        assert!(lines[0].to_string().starts_with("t=   0.020s El:"));
    }
}
