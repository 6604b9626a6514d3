use serde::{Deserialize, Serialize};

use super::types::Axis;
use super::units::{Centi, Millis};

/// Minimum spacing between servo updates.
pub const SERVO_UPDATE_INTERVAL_MS: u32 = 20;
/// Changes larger than this share of total travel snap instead of smoothing.
pub const JUMP_THRESHOLD_PCT: i64 = 80;

/// Sink for actuator positions. Fire-and-forget, one channel per axis.
pub trait Actuator: Send {
    fn write_microseconds(&mut self, axis: Axis, us: i32);
}

/// Actuator for setups without a mount attached.
#[derive(Debug, Default)]
pub struct NoopActuator;

impl Actuator for NoopActuator {
    fn write_microseconds(&mut self, _axis: Axis, _us: i32) {}
}

#[derive(Debug, Default)]
pub struct LogActuator;

impl Actuator for LogActuator {
    fn write_microseconds(&mut self, axis: Axis, us: i32) {
        log::trace!("servo {} -> {}us", axis, us);
    }
}

/// Pulse width bounds of one axis, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServoBounds {
    pub low: i32,
    pub high: i32,
}

impl Default for ServoBounds {
    fn default() -> Self {
        Self {
            low: 1000,
            high: 2000,
        }
    }
}

impl ServoBounds {
    pub fn center(&self) -> Centi {
        Centi::from_whole((self.low + self.high) / 2)
    }

    /// Total travel in µs × 100. Reversed bounds still have positive travel.
    pub fn range(&self) -> Centi {
        Centi::from_whole(self.high - self.low).abs()
    }

    /// Linear map of `value` from `[0, domain]` onto `[low, high]`.
    fn map(&self, value: f64, domain: f64) -> Centi {
        let us = self.low as f64 + value * (self.high - self.low) as f64 / domain;
        Centi::from_f64(us)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AxisState {
    pub bounds: ServoBounds,
    pub position: Centi,
}

impl AxisState {
    fn new(bounds: ServoBounds) -> Self {
        Self {
            bounds,
            position: bounds.center(),
        }
    }

    /// Snaps on large jumps, otherwise approaches `target` exponentially.
    fn step_towards(&mut self, target: Centi, smoothing: u32) {
        let range = self.bounds.range().raw() as i64;
        let delta = (target - self.position).raw() as i64;
        if range == 0 || delta.abs() * 100 / range > JUMP_THRESHOLD_PCT {
            self.position = target;
        } else {
            self.position += Centi((delta / (smoothing as i64 + 1)) as i32);
        }
    }
}

/// Geared azimuth/elevation mapping with jump-or-smooth update policy.
pub struct ServoPositionController {
    azimuth: AxisState,
    elevation: AxisState,
    smoothing: u32,
    last_update: Option<Millis>,
    actuator: Box<dyn Actuator>,
}

impl ServoPositionController {
    pub fn new(
        azimuth: ServoBounds,
        elevation: ServoBounds,
        smoothing: u32,
        actuator: Box<dyn Actuator>,
    ) -> Self {
        let mut controller = Self {
            azimuth: AxisState::new(azimuth),
            elevation: AxisState::new(elevation),
            smoothing,
            last_update: None,
            actuator,
        };
        controller.emit();
        controller
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Azimuth => &self.azimuth,
            Axis::Elevation => &self.elevation,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Azimuth => &mut self.azimuth,
            Axis::Elevation => &mut self.elevation,
        }
    }

    /// Current position in whole microseconds.
    pub fn position_us(&self, axis: Axis) -> i32 {
        self.axis(axis).position.whole()
    }

    /// Target positions for a pointing direction, before smoothing.
    ///
    /// The azimuth servo is geared 2:1 so its half-circle of travel covers
    /// the full compass; azimuth 0 lands on the centre of travel.
    pub fn transform(&self, azimuth_deg: f64, elevation_deg: f64) -> (Centi, Centi) {
        let geared = (azimuth_deg + 180.0).rem_euclid(360.0);
        let elevation = elevation_deg.clamp(0.0, 90.0);
        (
            self.azimuth.bounds.map(geared, 360.0),
            self.elevation.bounds.map(elevation, 90.0),
        )
    }

    /// Whether enough time has passed since the last update at `now`.
    pub fn is_due(&self, now: Millis) -> bool {
        self.last_update
            .map(|last| now.since(last) >= SERVO_UPDATE_INTERVAL_MS)
            .unwrap_or(true)
    }

    /// Runs one update at `now`. Returns false when rate limited.
    pub fn update(&mut self, now: Millis, azimuth_deg: f64, elevation_deg: f64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_update = Some(now);

        let (azimuth, elevation) = self.transform(azimuth_deg, elevation_deg);
        let smoothing = self.smoothing;
        for (axis, target) in [(Axis::Azimuth, azimuth), (Axis::Elevation, elevation)] {
            self.axis_mut(axis).step_towards(target, smoothing);
        }
        self.emit();
        true
    }

    fn emit(&mut self) {
        for axis in Axis::ALL {
            let us = self.position_us(axis);
            self.actuator.write_microseconds(axis, us);
        }
    }
}
