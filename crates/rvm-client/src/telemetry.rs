//! Best-effort telemetry forwarding to a range-prediction service
//!
//! Maps a decoded vehicle status and charging status into the service's
//! metrics record and uploads it as a GET side call. The upload is outside
//! the transactional command path: it is never retried and a failure never
//! propagates to the caller.

use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use rvm_core::{ChargingStatus, VehicleStatus};

use crate::config::TelemetryConfig;
use crate::error::Result;

/// Derived metrics record uploaded to the range-prediction service
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub utc: i64,
    pub soc: f64,
    pub power: f64,
    pub speed: f64,
    pub lat: f64,
    pub lon: f64,
    pub is_charging: bool,
    pub is_parked: bool,
    pub heading: i32,
    pub elevation: i32,
    pub voltage: f64,
    pub current: f64,
    /// Omitted when the sensor reports the unknown sentinel
    pub ext_temp: Option<i16>,
    /// Omitted when the odometer reading is sentineled as unknown
    pub odometer: Option<f64>,
    /// Omitted when the range estimate is sentineled as unknown
    pub est_battery_range: Option<f64>,
}

impl TelemetryRecord {
    /// Build the record when the inputs qualify for forwarding.
    ///
    /// Requires a GPS position with a usable fix (present, latitude and
    /// longitude strictly positive); returns `None` otherwise. Optional
    /// fields go through the named sentinel predicates, so a legitimate
    /// zero temperature is included while the unknown magic value is not.
    pub fn derive(vehicle: &VehicleStatus, charging: &ChargingStatus) -> Option<Self> {
        let gps = vehicle.gps_fix()?;
        let way_point = &gps.way_point;

        Some(Self {
            utc: gps.timestamp,
            soc: charging.soc_percent(),
            power: charging.power_kw(),
            speed: way_point.speed_kmh(),
            lat: way_point.position.latitude_deg(),
            lon: way_point.position.longitude_deg(),
            is_charging: vehicle.is_charging(),
            is_parked: vehicle.is_parked(),
            heading: way_point.heading,
            elevation: way_point.position.altitude,
            voltage: charging.voltage(),
            current: charging.current(),
            ext_temp: vehicle.basic.exterior_temperature_celsius(),
            odometer: vehicle.basic.odometer_km(),
            est_battery_range: vehicle.basic.electric_range_km(),
        })
    }

    /// URL-encoded metrics blob carried in the `tlm` query parameter
    pub fn query_blob(&self) -> String {
        let mut pairs = form_urlencoded::Serializer::new(String::new());
        pairs.append_pair("utc", &self.utc.to_string());
        pairs.append_pair("soc", &self.soc.to_string());
        pairs.append_pair("power", &self.power.to_string());
        pairs.append_pair("speed", &self.speed.to_string());
        pairs.append_pair("lat", &self.lat.to_string());
        pairs.append_pair("lon", &self.lon.to_string());
        pairs.append_pair("is_charging", &self.is_charging.to_string());
        pairs.append_pair("is_parked", &self.is_parked.to_string());
        pairs.append_pair("heading", &self.heading.to_string());
        pairs.append_pair("elevation", &self.elevation.to_string());
        pairs.append_pair("voltage", &self.voltage.to_string());
        pairs.append_pair("current", &self.current.to_string());
        if let Some(ext_temp) = self.ext_temp {
            pairs.append_pair("ext_temp", &ext_temp.to_string());
        }
        if let Some(odometer) = self.odometer {
            pairs.append_pair("odometer", &odometer.to_string());
        }
        if let Some(range) = self.est_battery_range {
            pairs.append_pair("est_battery_range", &range.to_string());
        }
        pairs.finish()
    }
}

/// Stateless forwarder to the range-prediction endpoint
#[derive(Debug, Clone)]
pub struct TelemetryForwarder {
    client: Client,
    api_key: String,
    user_token: String,
    endpoint: String,
}

impl TelemetryForwarder {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            user_token: config.user_token.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Forward a derived record when the inputs qualify.
    ///
    /// Skipped without a network call when either status is absent or the
    /// GPS fix is unusable. Upload failures are logged and swallowed.
    #[instrument(skip_all)]
    pub async fn update(&self, vehicle: Option<&VehicleStatus>, charging: Option<&ChargingStatus>) {
        let (Some(vehicle), Some(charging)) = (vehicle, charging) else {
            debug!("telemetry skipped: incomplete status");
            return;
        };
        let Some(record) = TelemetryRecord::derive(vehicle, charging) else {
            debug!("telemetry skipped: no usable GPS fix");
            return;
        };

        if let Err(error) = self.send(&record).await {
            warn!(%error, "telemetry upload failed");
        }
    }

    async fn send(&self, record: &TelemetryRecord) -> Result<()> {
        let blob = record.query_blob();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("token", self.user_token.as_str()),
                ("tlm", blob.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        // informational only, never parsed for control flow
        let body = response.text().await?;
        debug!(response = %body, "telemetry upload acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rvm_core::status::TEMPERATURE_UNKNOWN;
    use rvm_core::{BasicVehicleStatus, GpsPosition, Position, WayPoint};

    use super::*;

    fn vehicle_with_fix() -> VehicleStatus {
        VehicleStatus {
            basic: BasicVehicleStatus {
                engine_status: 0,
                hand_brake: true,
                exterior_temperature: 21,
                mileage: 123_456,
                fuel_range_elec: 2_050,
                charging_state: Some(1),
            },
            gps_position: Some(GpsPosition {
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
            }),
        }
    }

    fn charging() -> ChargingStatus {
        ChargingStatus {
            pack_soc: 755,
            pack_current: 19_800,
            pack_voltage: 1_600,
        }
    }

    #[test]
    fn derive_requires_a_usable_fix() {
        let mut vehicle = vehicle_with_fix();
        assert!(TelemetryRecord::derive(&vehicle, &charging()).is_some());

        vehicle.gps_position.as_mut().unwrap().way_point.position.latitude = 0;
        assert!(TelemetryRecord::derive(&vehicle, &charging()).is_none());

        vehicle.gps_position = None;
        assert!(TelemetryRecord::derive(&vehicle, &charging()).is_none());
    }

    #[test]
    fn record_maps_protocol_units() {
        let record = TelemetryRecord::derive(&vehicle_with_fix(), &charging()).unwrap();
        assert_eq!(record.utc, 1_700_000_000);
        assert_eq!(record.soc, 75.5);
        assert_eq!(record.speed, 12.5);
        assert!((record.lat - 48.1371).abs() < 1e-9);
        assert!((record.lon - 11.5754).abs() < 1e-9);
        assert!(record.is_charging);
        assert!(record.is_parked);
        assert_eq!(record.odometer, Some(12_345.6));
        assert_eq!(record.est_battery_range, Some(205.0));
    }

    #[test]
    fn sentinel_temperature_is_omitted_but_zero_is_kept() {
        let mut vehicle = vehicle_with_fix();
        vehicle.basic.exterior_temperature = TEMPERATURE_UNKNOWN;
        let record = TelemetryRecord::derive(&vehicle, &charging()).unwrap();
        assert_eq!(record.ext_temp, None);
        assert!(!record.query_blob().contains("ext_temp"));

        vehicle.basic.exterior_temperature = 0;
        let record = TelemetryRecord::derive(&vehicle, &charging()).unwrap();
        assert_eq!(record.ext_temp, Some(0));
        assert!(record.query_blob().contains("ext_temp=0"));
    }

    #[test]
    fn unknown_odometer_and_range_are_omitted_from_the_blob() {
        let mut vehicle = vehicle_with_fix();
        vehicle.basic.mileage = 0;
        vehicle.basic.fuel_range_elec = -1;
        let blob = TelemetryRecord::derive(&vehicle, &charging())
            .unwrap()
            .query_blob();
        assert!(!blob.contains("odometer"));
        assert!(!blob.contains("est_battery_range"));
        assert!(blob.contains("soc=75.5"));
    }
}
