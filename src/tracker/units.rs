use serde::Serialize;
use std::ops::{Add, AddAssign, Sub};

/// Millisecond timestamp from a free-running u32 counter.
///
/// The counter wraps roughly every 49.7 days, so elapsed time is always
/// computed with modular subtraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Millis(pub u32);

impl Millis {
    /// Milliseconds elapsed from `earlier` to `self`, correct across a wrap.
    pub fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub fn wrapping_add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

/// Fixed-point value carried at a scale of 100 (two decimal places).
///
/// Used for actuator positions (µs × 100) and the averaged GPS update
/// interval (ms × 100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Centi(pub i32);

impl Centi {
    pub const SCALE: i32 = 100;
    pub const ZERO: Centi = Centi(0);

    pub fn from_whole(value: i32) -> Self {
        Centi(value * Self::SCALE)
    }

    /// Rounds a floating point whole-unit value to the nearest hundredth.
    pub fn from_f64(value: f64) -> Self {
        Centi((value * Self::SCALE as f64).round() as i32)
    }

    /// Truncates to whole units.
    pub fn whole(self) -> i32 {
        self.0 / Self::SCALE
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn abs(self) -> Self {
        Centi(self.0.abs())
    }
}

impl Add for Centi {
    type Output = Centi;

    fn add(self, rhs: Centi) -> Centi {
        Centi(self.0 + rhs.0)
    }
}

impl AddAssign for Centi {
    fn add_assign(&mut self, rhs: Centi) {
        self.0 += rhs.0;
    }
}

impl Sub for Centi {
    type Output = Centi;

    fn sub(self, rhs: Centi) -> Centi {
        Centi(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_wrap() {
        let before = Millis(u32::MAX - 9);
        let after = before.wrapping_add(30);
        assert_eq!(after, Millis(20));
        assert_eq!(after.since(before), 30);
    }

    #[test]
    fn centi_keeps_two_decimals() {
        assert_eq!(Centi::from_whole(1500), Centi(150_000));
        assert_eq!(Centi::from_f64(1234.567), Centi(123_457));
        assert_eq!(Centi(150_099).whole(), 1500);
        assert_eq!((Centi(10) - Centi(25)).abs(), Centi(15));
    }
}
