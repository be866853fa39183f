use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One AIS position observation as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub mmsi: u32,
    pub lat: f64,
    pub lon: f64,
    /// Speed over ground in knots; `None` means "derive from the track".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sog: Option<f64>,
    /// Course over ground in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cog: Option<f64>,
    pub ts: DateTime<Utc>,
}

impl PositionReport {
    pub fn new(mmsi: u32, lat: f64, lon: f64, ts: DateTime<Utc>) -> Self {
        Self {
            mmsi,
            lat,
            lon,
            sog: None,
            cog: None,
            ts,
        }
    }

    pub fn with_sog(mut self, sog: f64) -> Self {
        self.sog = Some(sog);
        self
    }

    pub fn with_cog(mut self, cog: f64) -> Self {
        self.cog = Some(cog);
        self
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Checks the coordinate ranges and that optional values are finite.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude {} outside [-90, 90]", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("longitude {} outside [-180, 180]", self.lon));
        }
        if let Some(sog) = self.sog {
            if !sog.is_finite() || sog < 0.0 {
                return Err(format!("speed over ground {} is not a valid speed", sog));
            }
        }
        if let Some(cog) = self.cog {
            if !cog.is_finite() {
                return Err(format!("course over ground {} is not finite", cog));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn validate_accepts_boundary_coordinates() {
        assert!(PositionReport::new(1, 90.0, -180.0, ts()).validate().is_ok());
        assert!(PositionReport::new(1, -90.0, 180.0, ts()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(PositionReport::new(1, 91.0, 0.0, ts()).validate().is_err());
        assert!(PositionReport::new(1, 0.0, 181.0, ts()).validate().is_err());
        assert!(PositionReport::new(1, f64::NAN, 0.0, ts()).validate().is_err());
        assert!(PositionReport::new(1, 0.0, 0.0, ts())
            .with_sog(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn absent_speed_and_course_are_not_serialized() {
        let json = serde_json::to_value(PositionReport::new(7, 1.0, 2.0, ts())).unwrap();
        assert!(json.get("sog").is_none());
        assert!(json.get("cog").is_none());
        assert_eq!(json["ts"], "2024-03-01T12:00:00Z");
    }
}
