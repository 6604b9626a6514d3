use serde::Serialize;

use super::geodesy::normalize_delta;
use super::units::{Centi, Millis};

/// Ceiling for the averaged update interval: 10 s, in ms × 100.
pub const MAX_AVG_INTERVAL: Centi = Centi(10 * 1000 * 100);

/// Smoothed GPS update interval and azimuth angular rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RateEstimate {
    /// Average interval between processed fixes, ms × 100. Zero until the
    /// first non-home fix arrives.
    #[schema(value_type = i32)]
    pub avg_interval: Centi,
    /// Signed ms per degree of azimuth; 0 means no angular motion.
    pub ms_per_degree: f64,
}

impl RateEstimate {
    pub fn is_known(&self) -> bool {
        self.avg_interval != Centi::ZERO && self.ms_per_degree != 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct GpsUpdateTracker {
    estimate: RateEstimate,
}

impl GpsUpdateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&self) -> RateEstimate {
        self.estimate
    }

    /// Folds one interval sample into the running average.
    ///
    /// There is no fast initialisation, so the average climbs from zero
    /// over several fixes, which avoids overprojecting right after home is
    /// latched.
    pub fn update_interval(&mut self, interval_ms: u32) {
        let sample = (interval_ms as i64) * Centi::SCALE as i64;
        let avg = self.estimate.avg_interval.raw() as i64;
        let next = (avg + (sample - avg) / 4).clamp(0, MAX_AVG_INTERVAL.raw() as i64);
        self.estimate.avg_interval = Centi(next as i32);
    }

    /// Derives the angular rate from the azimuth change over `interval_ms`.
    pub fn update_rate(&mut self, interval_ms: u32, previous_azimuth: f64, azimuth: f64) {
        let azim_delta = normalize_delta(azimuth - previous_azimuth);
        self.estimate.ms_per_degree = if azim_delta == 0.0 {
            0.0
        } else {
            interval_ms as f64 / azim_delta
        };
        log::debug!(
            "{:.2} deg delta in {}ms, {:.1}ms/deg, {} avg",
            azim_delta,
            interval_ms,
            self.estimate.ms_per_degree,
            self.estimate.avg_interval.raw()
        );
    }

    /// How far through the expected update interval we are, 0..=100.
    ///
    /// Zero while there is no interval estimate yet.
    pub fn staleness_pct(&self, now: Millis, last_update: Millis) -> u8 {
        let avg = self.estimate.avg_interval.raw();
        if avg <= 0 {
            return 0;
        }
        let elapsed = now.since(last_update) as u64;
        (elapsed * 100 * 100 / avg as u64).min(100) as u8
    }
}
