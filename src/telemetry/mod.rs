//! Decoded GPS telemetry as handed over by the link's protocol decoder.
//!
//! Framing, sync bytes and CRC checking happen upstream. Records arriving
//! here are trusted as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::tracker::{GeoPosition, GpsFix};

/// Altitude is sent as an unsigned value offset by this many metres.
pub const ALTITUDE_OFFSET_M: i32 = 1000;
/// lat(4) lon(4) speed(2) heading(2) altitude(2) satellites(1)
pub const GPS_PAYLOAD_LEN: usize = 15;

#[derive(Debug, Error, PartialEq)]
pub enum TelemetryError {
    #[error("GPS payload is {0} bytes, expected 15")]
    PayloadLength(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GpsRecord {
    /// Degrees × 10^7
    pub lat: i32,
    /// Degrees × 10^7
    pub lon: i32,
    #[serde(default)]
    pub speed: u16,
    #[serde(default)]
    pub heading: u16,
    /// Metres + 1000
    pub altitude: u16,
    pub satellites: u8,
}

impl GpsRecord {
    /// Parses the big-endian GPS payload that follows the frame header.
    pub fn from_be_bytes(payload: &[u8]) -> Result<Self, TelemetryError> {
        let bytes: &[u8; GPS_PAYLOAD_LEN] = payload
            .try_into()
            .map_err(|_| TelemetryError::PayloadLength(payload.len()))?;

        let i32_at = |at: usize| {
            i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let u16_at = |at: usize| u16::from_be_bytes([bytes[at], bytes[at + 1]]);

        Ok(Self {
            lat: i32_at(0),
            lon: i32_at(4),
            speed: u16_at(8),
            heading: u16_at(10),
            altitude: u16_at(12),
            satellites: bytes[14],
        })
    }

    pub fn altitude_m(&self) -> i32 {
        self.altitude as i32 - ALTITUDE_OFFSET_M
    }

    pub fn into_fix(self) -> GpsFix {
        GpsFix {
            position: GeoPosition::new(self.lat, self.lon, self.altitude_m()),
            speed: self.speed,
            heading: self.heading,
            satellites: self.satellites,
        }
    }
}

impl From<GpsRecord> for GpsFix {
    fn from(record: GpsRecord) -> Self {
        record.into_fix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_offset() {
        let record = GpsRecord {
            lat: 1,
            lon: 2,
            speed: 0,
            heading: 0,
            altitude: 950,
            satellites: 9,
        };
        let fix = record.into_fix();
        assert_eq!(fix.position.altitude_m, -50);
        assert_eq!(fix.satellites, 9);
    }

    #[test]
    fn big_endian_payload() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-473_977_420i32).to_be_bytes());
        payload.extend_from_slice(&85_455_940i32.to_be_bytes());
        payload.extend_from_slice(&1234u16.to_be_bytes());
        payload.extend_from_slice(&27_000u16.to_be_bytes());
        payload.extend_from_slice(&1420u16.to_be_bytes());
        payload.push(11);

        let record = GpsRecord::from_be_bytes(&payload).unwrap();
        assert_eq!(record.lat, -473_977_420);
        assert_eq!(record.lon, 85_455_940);
        assert_eq!(record.speed, 1234);
        assert_eq!(record.heading, 27_000);
        assert_eq!(record.altitude_m(), 420);
        assert_eq!(record.satellites, 11);
    }

    #[test]
    fn short_payload() {
        assert_eq!(
            GpsRecord::from_be_bytes(&[0u8; 14]),
            Err(TelemetryError::PayloadLength(14))
        );
    }

    #[test]
    fn json_record() {
        let record: GpsRecord =
            serde_json::from_str(r#"{"lat":10,"lon":-20,"altitude":1100,"satellites":6}"#).unwrap();
        assert_eq!(record.into_fix().position, GeoPosition::new(10, -20, 100));
    }
}
