use serde::Serialize;

use super::types::COORD_SCALE;

/// Values shown while waiting for home or for the first-update delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleView {
    pub satellites: u8,
    pub lat: i32,
    pub lon: i32,
    /// None until an update interval has been estimated
    pub staleness_pct: Option<u8>,
}

/// Values shown on every servo update while tracking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveView {
    pub elevation_deg: f64,
    /// Target altitude above home, clamped to [-99, 999] m
    pub altitude_delta_m: i32,
    pub azimuth_deg: f64,
    pub distance_m: f64,
    pub servo_azimuth_us: i32,
    pub servo_elevation_us: i32,
    pub staleness_pct: Option<u8>,
}

/// Rendering sink. Implementations own all layout decisions.
pub trait Display: Send {
    fn show_idle(&mut self, view: &IdleView);
    fn show_active(&mut self, view: &ActiveView);
}

/// Writes each view as a compact text line at debug level.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl Display for LogDisplay {
    fn show_idle(&mut self, view: &IdleView) {
        log::debug!(
            "Sats: {} Lat: {} Lon: {}{}",
            view.satellites,
            format_coordinate(view.lat),
            format_coordinate(view.lon),
            format_staleness(view.staleness_pct)
        );
    }

    fn show_active(&mut self, view: &ActiveView) {
        log::debug!("{}", format_active(view));
    }
}

/// One-line summary of an active view, e.g. `El:12 35m Az:087 1.204km Se:1133us Sa:1741us`.
pub fn format_active(view: &ActiveView) -> String {
    format!(
        "El:{:02.0} {}m Az:{:03.0} {} Se:{:4}us Sa:{:4}us{}",
        view.elevation_deg.floor(),
        view.altitude_delta_m,
        view.azimuth_deg.floor(),
        format_distance(view.distance_m),
        view.servo_elevation_us,
        view.servo_azimuth_us,
        format_staleness(view.staleness_pct)
    )
}

/// Signed `D.DDDDDDD` rendering of a degrees × 10^7 coordinate.
pub fn format_coordinate(raw: i32) -> String {
    let scale = COORD_SCALE as i64;
    let value = raw as i64;
    let sign = if value < 0 { "-" } else { "" };
    format!(
        "{}{}.{:07}",
        sign,
        value.abs() / scale,
        value.abs() % scale
    )
}

/// Distance in the widths a small display has room for.
pub fn format_distance(distance_m: f64) -> String {
    let m = distance_m.max(0.0) as u64;
    if m > 999 {
        format!("{}.{:03}km", m / 1000, m % 1000)
    } else if m > 99 {
        format!("{}", m)
    } else {
        format!("{}m", m)
    }
}

/// Height in pixels of a freshness bar that drains as the next fix comes due.
pub fn staleness_bar_height(staleness_pct: u8, screen_height: u32) -> u32 {
    screen_height * (100 - staleness_pct.min(100) as u32) / 100
}

const TEXT_BAR_WIDTH: u32 = 10;

fn format_staleness(pct: Option<u8>) -> String {
    pct.map(|p| {
        let fresh = staleness_bar_height(p, TEXT_BAR_WIDTH) as usize;
        format!(
            " [{}{}]",
            "#".repeat(fresh),
            " ".repeat(TEXT_BAR_WIDTH as usize - fresh)
        )
    })
    .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct RecordingDisplay {
        pub idle: Arc<Mutex<Vec<IdleView>>>,
        pub active: Arc<Mutex<Vec<ActiveView>>>,
    }

    impl Display for RecordingDisplay {
        fn show_idle(&mut self, view: &IdleView) {
            self.idle.lock().unwrap().push(view.clone());
        }

        fn show_active(&mut self, view: &ActiveView) {
            self.active.lock().unwrap().push(view.clone());
        }
    }

    #[test]
    fn coordinates_keep_sign_below_one_degree() {
        assert_eq!(format_coordinate(473_977_420), "47.3977420");
        assert_eq!(format_coordinate(-5_000_000), "-0.5000000");
        assert_eq!(format_coordinate(-1_225_000_001), "-122.5000001");
        assert_eq!(format_coordinate(i32::MIN), "-214.7483648");
    }

    #[test]
    fn distance_widths() {
        assert_eq!(format_distance(42.9), "42m");
        assert_eq!(format_distance(512.0), "512");
        assert_eq!(format_distance(12_345.6), "12.345km");
        assert_eq!(format_distance(1000.0), "1.000km");
    }

    #[test]
    fn bar_drains_with_staleness() {
        assert_eq!(staleness_bar_height(0, 64), 64);
        assert_eq!(staleness_bar_height(50, 64), 32);
        assert_eq!(staleness_bar_height(100, 64), 0);
    }

    #[test]
    fn active_line() {
        let view = ActiveView {
            elevation_deg: 12.7,
            altitude_delta_m: 35,
            azimuth_deg: 87.2,
            distance_m: 1204.9,
            servo_azimuth_us: 1741,
            servo_elevation_us: 1133,
            staleness_pct: None,
        };
        assert_eq!(
            format_active(&view),
            "El:12 35m Az:087 1.204km Se:1133us Sa:1741us"
        );

        let stale = ActiveView {
            staleness_pct: Some(70),
            ..view
        };
        assert!(format_active(&stale).ends_with(" [###       ]"));
    }
}
