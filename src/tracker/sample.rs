use chrono::DateTime;
use serde::Serialize;

use super::interval::RateEstimate;
use super::tracker::TrackerMode;
use super::types::{GeoPosition, TargetVector};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackerStatus {
    pub updated_at: DateTime<chrono::Utc>,
    pub mode: TrackerMode,
    pub home: Option<GeoPosition>,
    pub satellites: Option<u8>,
    pub last_fix: Option<GeoPosition>,
    pub target: Option<TargetVector>,
    pub projected_azimuth_deg: Option<f64>,
    pub altitude_delta_m: Option<i32>,
    pub rate: RateEstimate,
    pub staleness_pct: Option<u8>,
    pub servo_azimuth_us: i32,
    pub servo_elevation_us: i32,
}
