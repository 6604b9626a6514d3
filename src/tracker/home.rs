use super::types::{GeoPosition, GpsFix};

/// Reference origin for all bearing/elevation/distance calculations.
///
/// Latches the first fix with enough satellites and never moves again for
/// the lifetime of the session.
#[derive(Debug, Clone, Default)]
pub struct HomePosition {
    min_satellites: u8,
    home: Option<GeoPosition>,
}

impl HomePosition {
    pub fn new(min_satellites: u8) -> Self {
        Self {
            min_satellites,
            home: None,
        }
    }

    pub fn get(&self) -> Option<&GeoPosition> {
        self.home.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.home.is_some()
    }

    /// Offers a fix as the home candidate. Returns true only on the call
    /// that latched it.
    pub fn offer(&mut self, fix: &GpsFix) -> bool {
        if self.home.is_some() || fix.satellites < self.min_satellites {
            return false;
        }
        self.home = Some(fix.position);
        log::info!(
            "GPS home set to ({}, {}) {}m with {} sats",
            fix.position.lat,
            fix.position.lon,
            fix.position.altitude_m,
            fix.satellites
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: i32, satellites: u8) -> GpsFix {
        GpsFix {
            position: GeoPosition::new(lat, 0, 0),
            satellites,
            ..Default::default()
        }
    }

    #[test]
    fn waits_for_enough_satellites() {
        let mut home = HomePosition::new(6);
        for (i, sats) in [3, 4, 5].into_iter().enumerate() {
            assert!(!home.offer(&fix(i as i32, sats)));
            assert!(!home.is_set());
        }
        assert!(home.offer(&fix(42, 7)));
        assert_eq!(home.get().map(|p| p.lat), Some(42));
    }

    #[test]
    fn never_moves_once_latched() {
        let mut home = HomePosition::new(4);
        assert!(home.offer(&fix(1, 4)));
        assert!(!home.offer(&fix(2, 12)));
        assert_eq!(home.get().map(|p| p.lat), Some(1));
    }
}
