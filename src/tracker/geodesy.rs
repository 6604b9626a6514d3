use super::types::GeoPosition;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Wraps any angle into [0, 360).
pub fn normalize_azimuth(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angular difference into [-180, 180).
pub fn normalize_delta(deg: f64) -> f64 {
    (deg + 540.0).rem_euclid(360.0) - 180.0
}

/// Great-circle distance (metres) and initial bearing (degrees) from `src` to `dst`.
///
/// All trigonometry stays in f64: in f32, cos of the longitude delta rounds
/// to exactly 1.0 for separations below about 2 km.
pub fn distance_and_bearing(src: &GeoPosition, dst: &GeoPosition) -> (f64, f64) {
    let delta_lon = (dst.lon_deg() - src.lon_deg()).to_radians();
    let theta_a = src.lat_deg().to_radians();
    let theta_b = dst.lat_deg().to_radians();

    let (sin_a, cos_a) = theta_a.sin_cos();
    let (sin_b, cos_b) = theta_b.sin_cos();
    let (sin_dlon, cos_dlon) = delta_lon.sin_cos();

    // Spherical law of cosines; coincident points can land a hair above 1.0
    let cos_angle = (sin_a * sin_b + cos_a * cos_b * cos_dlon).clamp(-1.0, 1.0);
    let distance = cos_angle.acos() * EARTH_RADIUS_M;

    let x = cos_b * sin_dlon;
    let y = cos_a * sin_b - sin_a * cos_b * cos_dlon;
    let azimuth = normalize_azimuth(x.atan2(y).to_degrees());

    (distance, azimuth)
}

/// Elevation angle in degrees. Not clamped: callers bound it to [0, 90].
pub fn elevation_angle(distance_m: f64, altitude_delta_m: f64) -> f64 {
    altitude_delta_m.atan2(distance_m).to_degrees()
}
