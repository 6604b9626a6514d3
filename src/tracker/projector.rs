use super::geodesy::normalize_azimuth;
use super::interval::RateEstimate;
use super::types::TargetVector;
use super::units::Millis;

/// Rate magnitude floor in ms/degree, capping projection at 100 deg/s.
pub const MIN_MS_PER_DEGREE: f64 = 10.0;
/// Below this distance the bearing is too noisy to extrapolate.
pub const MIN_PROJECTION_DISTANCE_M: f64 = 3.0;

/// Dead-reckons azimuth between GPS fixes.
#[derive(Debug, Clone, Copy)]
pub struct AzimuthProjector {
    enabled: bool,
}

impl AzimuthProjector {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Linear projection of the last azimuth to `now`.
    ///
    /// Falls back to the last computed azimuth unless projection is
    /// enabled, the rate is known and the target is further than a few
    /// metres out.
    pub fn project(
        &self,
        now: Millis,
        last_update: Millis,
        target: &TargetVector,
        rate: &RateEstimate,
    ) -> f64 {
        if !self.enabled || !rate.is_known() || target.distance_m <= MIN_PROJECTION_DISTANCE_M {
            return target.azimuth_deg;
        }

        // Never extrapolate further than one average interval
        let horizon_ms = (rate.avg_interval.raw() / 100) as u32;
        let elapsed = now.since(last_update).min(horizon_ms);

        let ms_per_degree = if rate.ms_per_degree.abs() < MIN_MS_PER_DEGREE {
            MIN_MS_PER_DEGREE.copysign(rate.ms_per_degree)
        } else {
            rate.ms_per_degree
        };

        normalize_azimuth(elapsed as f64 / ms_per_degree + target.azimuth_deg)
    }
}
