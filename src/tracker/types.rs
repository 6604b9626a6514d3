use serde::Serialize;

/// Degrees × 10^7, the resolution GPS telemetry carries coordinates in.
pub const COORD_SCALE: f64 = 1e7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct GeoPosition {
    /// Latitude, degrees × 10^7
    pub lat: i32,
    /// Longitude, degrees × 10^7
    pub lon: i32,
    pub altitude_m: i32,
}

impl GeoPosition {
    pub fn new(lat: i32, lon: i32, altitude_m: i32) -> Self {
        Self {
            lat,
            lon,
            altitude_m,
        }
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat as f64 / COORD_SCALE
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon as f64 / COORD_SCALE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct GpsFix {
    pub position: GeoPosition,
    pub speed: u16,
    pub heading: u16,
    pub satellites: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TargetVector {
    /// [0, 360), 0 = north
    pub azimuth_deg: f64,
    /// [0, 90]
    pub elevation_deg: f64,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    Azimuth,
    Elevation,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Azimuth, Axis::Elevation];
}
