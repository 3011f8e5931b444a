//! Decoded vehicle and charging status models
//!
//! The wire protocol stands in for "absent" with sentinel values rather than
//! optional fields: an out-of-range temperature magic value and non-positive
//! odometer/range readings. A zero GPS fix likewise arrives as
//! legitimate-looking zero coordinates. The predicates here give those
//! sentinels one name each so consumers never compare magic numbers inline.

use serde::{Deserialize, Serialize};

/// Exterior temperature reading meaning "unknown"
pub const TEMPERATURE_UNKNOWN: i16 = -128;

/// Engine status value while the engine is running
const ENGINE_RUNNING: i16 = 1;

/// Basic vehicle telemetry block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicVehicleStatus {
    pub engine_status: i16,
    pub hand_brake: bool,
    /// Degrees Celsius; [`TEMPERATURE_UNKNOWN`] when the sensor has no value
    pub exterior_temperature: i16,
    /// Odometer in 0.1 km units; non-positive when unknown
    pub mileage: i32,
    /// Remaining electric range in 0.1 km units; non-positive when unknown
    pub fuel_range_elec: i32,
    /// Charging indicator on BEV models; `>= 1` while charging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_state: Option<i32>,
}

impl BasicVehicleStatus {
    /// Exterior temperature with the unknown sentinel mapped to `None`.
    ///
    /// Zero is a legitimate reading and is preserved.
    pub fn exterior_temperature_celsius(&self) -> Option<i16> {
        if self.exterior_temperature == TEMPERATURE_UNKNOWN {
            None
        } else {
            Some(self.exterior_temperature)
        }
    }

    /// Odometer in km, `None` when the reading is sentineled as unknown
    pub fn odometer_km(&self) -> Option<f64> {
        if self.mileage > 0 {
            Some(f64::from(self.mileage) / 10.0)
        } else {
            None
        }
    }

    /// Estimated electric range in km, `None` when unknown
    pub fn electric_range_km(&self) -> Option<f64> {
        if self.fuel_range_elec > 0 {
            Some(f64::from(self.fuel_range_elec) / 10.0)
        } else {
            None
        }
    }
}

/// Geographic position in protocol units (degrees * 1e6, altitude in m)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: i64,
    pub longitude: i64,
    pub altitude: i32,
}

impl Position {
    /// Whether the coordinates describe a usable fix.
    ///
    /// A null/zero-fix GPS state arrives as zero (or negative) coordinates,
    /// not as an absent position.
    pub fn has_fix(&self) -> bool {
        self.latitude > 0 && self.longitude > 0
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude as f64 / 1_000_000.0
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude as f64 / 1_000_000.0
    }
}

/// Position sample with motion data (speed in 0.1 km/h, heading in degrees)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WayPoint {
    pub position: Position,
    pub speed: i32,
    pub heading: i32,
}

impl WayPoint {
    pub fn speed_kmh(&self) -> f64 {
        f64::from(self.speed) / 10.0
    }
}

/// GPS block of a vehicle status response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GpsPosition {
    /// Sample time, UTC seconds
    pub timestamp: i64,
    pub way_point: WayPoint,
}

/// Decoded vehicle status payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub basic: BasicVehicleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_position: Option<GpsPosition>,
}

impl VehicleStatus {
    pub fn is_charging(&self) -> bool {
        self.basic.charging_state.is_some_and(|v| v >= 1)
    }

    pub fn is_parked(&self) -> bool {
        self.basic.engine_status != ENGINE_RUNNING || self.basic.hand_brake
    }

    /// GPS position with a usable fix, if any
    pub fn gps_fix(&self) -> Option<&GpsPosition> {
        self.gps_position
            .as_ref()
            .filter(|gps| gps.way_point.position.has_fix())
    }
}

/// Decoded charging status payload.
///
/// Raw battery-management readings are kept in protocol units; the helpers
/// apply the protocol scaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargingStatus {
    /// State of charge in 0.1 % units
    pub pack_soc: i32,
    /// Pack current, raw units (0.05 A steps offset by -1000 A)
    pub pack_current: i32,
    /// Pack voltage, raw units (0.25 V steps)
    pub pack_voltage: i32,
}

impl ChargingStatus {
    pub fn soc_percent(&self) -> f64 {
        f64::from(self.pack_soc) / 10.0
    }

    pub fn voltage(&self) -> f64 {
        f64::from(self.pack_voltage) * 0.25
    }

    pub fn current(&self) -> f64 {
        f64::from(self.pack_current) * 0.05 - 1000.0
    }

    pub fn power_kw(&self) -> f64 {
        self.current() * self.voltage() / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_sentinel_maps_to_none() {
        let mut basic = BasicVehicleStatus {
            exterior_temperature: TEMPERATURE_UNKNOWN,
            ..Default::default()
        };
        assert_eq!(basic.exterior_temperature_celsius(), None);

        // zero is a real reading, not an absence
        basic.exterior_temperature = 0;
        assert_eq!(basic.exterior_temperature_celsius(), Some(0));

        basic.exterior_temperature = -20;
        assert_eq!(basic.exterior_temperature_celsius(), Some(-20));
    }

    #[test]
    fn non_positive_odometer_and_range_are_unknown() {
        let basic = BasicVehicleStatus {
            mileage: 0,
            fuel_range_elec: -1,
            ..Default::default()
        };
        assert_eq!(basic.odometer_km(), None);
        assert_eq!(basic.electric_range_km(), None);

        let basic = BasicVehicleStatus {
            mileage: 123_456,
            fuel_range_elec: 2_050,
            ..Default::default()
        };
        assert_eq!(basic.odometer_km(), Some(12_345.6));
        assert_eq!(basic.electric_range_km(), Some(205.0));
    }

    #[test]
    fn zero_coordinates_are_not_a_fix() {
        let zero = Position::default();
        assert!(!zero.has_fix());

        let southern = Position {
            latitude: -33_868_800,
            longitude: 151_209_300,
            altitude: 0,
        };
        // the protocol reports no usable fix for non-positive coordinates
        assert!(!southern.has_fix());

        let munich = Position {
            latitude: 48_137_100,
            longitude: 11_575_400,
            altitude: 519,
        };
        assert!(munich.has_fix());
        assert!((munich.latitude_deg() - 48.1371).abs() < 1e-9);
    }

    #[test]
    fn gps_fix_requires_present_and_valid_position() {
        let mut status = VehicleStatus::default();
        assert!(status.gps_fix().is_none());

        status.gps_position = Some(GpsPosition::default());
        assert!(status.gps_fix().is_none());

        status.gps_position = Some(GpsPosition {
            timestamp: 1_700_000_000,
            way_point: WayPoint {
                position: Position {
                    latitude: 48_137_100,
                    longitude: 11_575_400,
                    altitude: 519,
                },
                speed: 125,
                heading: 90,
            },
        });
        assert!(status.gps_fix().is_some());
    }

    #[test]
    fn charging_helpers_apply_protocol_scaling() {
        let charging = ChargingStatus {
            pack_soc: 755,
            pack_current: 19_800,
            pack_voltage: 1_600,
        };
        assert_eq!(charging.soc_percent(), 75.5);
        assert_eq!(charging.voltage(), 400.0);
        assert_eq!(charging.current(), -10.0);
        assert_eq!(charging.power_kw(), -4.0);
    }

    #[test]
    fn parked_and_charging_flags() {
        let mut status = VehicleStatus::default();
        assert!(status.is_parked());
        assert!(!status.is_charging());

        status.basic.engine_status = 1;
        status.basic.hand_brake = false;
        assert!(!status.is_parked());

        status.basic.charging_state = Some(1);
        assert!(status.is_charging());
    }
}
