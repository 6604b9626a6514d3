use chrono::Utc;
use serde::Serialize;

use super::display::{ActiveView, Display, IdleView};
use super::geodesy::{distance_and_bearing, elevation_angle};
use super::home::HomePosition;
use super::interval::GpsUpdateTracker;
use super::projector::AzimuthProjector;
use super::sample::TrackerStatus;
use super::servo::{Actuator, ServoPositionController};
use super::slot::FixSlot;
use super::types::{Axis, GeoPosition, GpsFix, TargetVector};
use super::units::Millis;
use crate::config::TrackerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TrackerMode {
    /// Home not latched yet, or still inside the first-update delay
    Idle,
    Tracking,
}

/// The tracking core: turns GPS fixes into smoothed two-axis servo output.
pub struct AatTracker {
    started_at: Millis,
    first_update_delay_ms: u32,
    warmed_up: bool,
    home: HomePosition,
    rate: GpsUpdateTracker,
    projector: AzimuthProjector,
    servos: ServoPositionController,
    display: Box<dyn Display>,
    last_fix: Option<GpsFix>,
    last_update: Millis,
    target: TargetVector,
    projected_azimuth: f64,
}

impl AatTracker {
    pub fn new(
        config: &TrackerConfig,
        actuator: Box<dyn Actuator>,
        display: Box<dyn Display>,
        now: Millis,
    ) -> Self {
        let first_update_delay_ms =
            u32::try_from(config.first_update_delay.as_millis()).unwrap_or(u32::MAX);
        Self {
            started_at: now,
            first_update_delay_ms,
            warmed_up: false,
            home: HomePosition::new(config.satellite_home_min),
            rate: GpsUpdateTracker::new(),
            projector: AzimuthProjector::new(config.project),
            servos: ServoPositionController::new(
                config.servo.azimuth,
                config.servo.elevation,
                config.servo_smooth,
                actuator,
            ),
            display,
            last_fix: None,
            last_update: now,
            target: TargetVector::default(),
            projected_azimuth: 0.0,
        }
    }

    pub fn home(&self) -> Option<&GeoPosition> {
        self.home.get()
    }

    pub fn target(&self) -> Option<&TargetVector> {
        self.home.is_set().then_some(&self.target)
    }

    pub fn projected_azimuth(&self) -> f64 {
        self.projected_azimuth
    }

    pub fn rate(&self) -> &GpsUpdateTracker {
        &self.rate
    }

    pub fn staleness_pct(&self, now: Millis) -> u8 {
        self.rate.staleness_pct(now, self.last_update)
    }

    pub fn mode(&self) -> TrackerMode {
        if self.home.is_set() && self.warmed_up {
            TrackerMode::Tracking
        } else {
            TrackerMode::Idle
        }
    }

    /// One pass of the control loop: consume a pending fix, then either
    /// drive the servos or refresh the idle display.
    pub fn tick(&mut self, now: Millis, slot: &FixSlot) -> TrackerMode {
        if let Some(fix) = slot.take() {
            self.process_fix(fix, now);
        }

        if !self.warmed_up && now.since(self.started_at) > self.first_update_delay_ms {
            self.warmed_up = true;
        }

        match self.mode() {
            TrackerMode::Tracking => self.update_servos(now),
            TrackerMode::Idle => {
                if let Some(fix) = self.last_fix {
                    let view = IdleView {
                        satellites: fix.satellites,
                        lat: fix.position.lat,
                        lon: fix.position.lon,
                        staleness_pct: self.staleness(now),
                    };
                    self.display.show_idle(&view);
                }
            }
        }
        self.mode()
    }

    /// Folds a new fix into home, target vector and rate estimate.
    pub fn process_fix(&mut self, fix: GpsFix, now: Millis) {
        // Interval between processing fixes, not between their arrival
        let interval = now.since(self.last_update);
        self.last_update = now;
        self.last_fix = Some(fix);

        let did_set_home = self.home.offer(&fix);
        let Some(home) = self.home.get().copied() else {
            return;
        };

        let (distance, azimuth) = distance_and_bearing(&home, &fix.position);
        let altitude_delta = (fix.position.altitude_m - home.altitude_m) as f64;
        let elevation = elevation_angle(distance, altitude_delta).clamp(0.0, 90.0);
        log::debug!(
            "Azimuth: {:.1}deg Elevation: {:.1}deg Distance: {:.1}m",
            azimuth,
            elevation,
            distance
        );

        // The home fix has no previous azimuth to difference against
        if !did_set_home {
            self.rate.update_interval(interval);
            self.rate.update_rate(interval, self.target.azimuth_deg, azimuth);
        }

        self.target = TargetVector {
            azimuth_deg: azimuth,
            elevation_deg: elevation,
            distance_m: distance,
        };
        self.projected_azimuth = azimuth;
    }

    fn update_servos(&mut self, now: Millis) {
        if !self.servos.is_due(now) {
            return;
        }
        let projected =
            self.projector
                .project(now, self.last_update, &self.target, &self.rate.estimate());
        self.projected_azimuth = projected;
        self.servos.update(now, projected, self.target.elevation_deg);

        let view = ActiveView {
            elevation_deg: self.target.elevation_deg,
            altitude_delta_m: self.altitude_delta().clamp(-99, 999),
            azimuth_deg: projected,
            distance_m: self.target.distance_m,
            servo_azimuth_us: self.servos.position_us(Axis::Azimuth),
            servo_elevation_us: self.servos.position_us(Axis::Elevation),
            staleness_pct: self.staleness(now),
        };
        self.display.show_active(&view);
    }

    fn altitude_delta(&self) -> i32 {
        match (self.last_fix, self.home.get()) {
            (Some(fix), Some(home)) => fix.position.altitude_m - home.altitude_m,
            _ => 0,
        }
    }

    fn staleness(&self, now: Millis) -> Option<u8> {
        (self.rate.estimate().avg_interval.raw() != 0).then(|| self.staleness_pct(now))
    }

    /// Snapshot of everything a display or API consumer may want.
    pub fn status(&self, now: Millis) -> TrackerStatus {
        TrackerStatus {
            updated_at: Utc::now(),
            mode: self.mode(),
            home: self.home().copied(),
            satellites: self.last_fix.map(|f| f.satellites),
            last_fix: self.last_fix.map(|f| f.position),
            target: self.target().copied(),
            projected_azimuth_deg: self.target().map(|_| self.projected_azimuth()),
            altitude_delta_m: self.target().map(|_| self.altitude_delta()),
            rate: self.rate().estimate(),
            staleness_pct: self.staleness(now),
            servo_azimuth_us: self.servos.position_us(Axis::Azimuth),
            servo_elevation_us: self.servos.position_us(Axis::Elevation),
        }
    }
}
