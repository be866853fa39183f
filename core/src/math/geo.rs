use crate::model::GeoPoint;
use chrono::{DateTime, Utc};

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
pub const KM_PER_NM: f64 = 1.852;

/// Great-circle helpers over WGS84 degrees.
pub struct GeoKinematics;

impl GeoKinematics {
    /// Haversine distance in nautical miles.
    pub fn distance_nm(from: GeoPoint, to: GeoPoint) -> f64 {
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (to.lon - from.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // rounding can push `a` a hair past 1 for antipodal points
        let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
        EARTH_RADIUS_KM * c / KM_PER_NM
    }

    /// Initial bearing from `from` towards `to`, in [0, 360).
    pub fn bearing_deg(from: GeoPoint, to: GeoPoint) -> f64 {
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlon = (to.lon - from.lon).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
        if bearing >= 360.0 {
            0.0
        } else {
            bearing
        }
    }

    /// Distance over elapsed hours, or `None` when `t2` is not after `t1`.
    pub fn implied_speed_kn(
        from: GeoPoint,
        t1: DateTime<Utc>,
        to: GeoPoint,
        t2: DateTime<Utc>,
    ) -> Option<f64> {
        let elapsed = Self::elapsed_seconds(t1, t2);
        if elapsed <= 0.0 {
            return None;
        }
        Some(Self::distance_nm(from, to) / (elapsed / 3600.0))
    }

    /// Signed seconds from `t1` to `t2`, with sub-second precision.
    pub fn elapsed_seconds(t1: DateTime<Utc>, t2: DateTime<Utc>) -> f64 {
        let delta = t2 - t1;
        match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1000.0,
        }
    }

    /// Smallest absolute angle between two headings, in [0, 180].
    pub fn heading_delta_deg(a: f64, b: f64) -> f64 {
        let diff = (b - a).rem_euclid(360.0);
        if diff > 180.0 {
            360.0 - diff
        } else {
            diff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn coincident_points_are_zero_apart() {
        for p in [pt(0.0, 0.0), pt(59.9, 10.7), pt(-33.9, 151.2), pt(90.0, 0.0)] {
            assert!(GeoKinematics::distance_nm(p, p).abs() < 1e-6);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = pt(51.5, -0.12);
        let b = pt(40.7, -74.0);
        let ab = GeoKinematics::distance_nm(a, b);
        let ba = GeoKinematics::distance_nm(b, a);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 3000.0 && ab < 3050.0);
    }

    #[test]
    fn one_degree_of_longitude_on_equator_is_about_sixty_miles() {
        let d = GeoKinematics::distance_nm(pt(0.0, 0.0), pt(0.0, 1.0));
        assert!((d - 60.04).abs() < 0.05, "got {d}");
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = pt(0.0, 0.0);
        assert!((GeoKinematics::bearing_deg(origin, pt(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((GeoKinematics::bearing_deg(origin, pt(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((GeoKinematics::bearing_deg(origin, pt(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((GeoKinematics::bearing_deg(origin, pt(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn implied_speed_undefined_without_forward_time() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let a = pt(0.0, 0.0);
        let b = pt(0.0, 1.0);
        assert!(GeoKinematics::implied_speed_kn(a, t, b, t).is_none());
        assert!(GeoKinematics::implied_speed_kn(a, t, b, t - Duration::minutes(1)).is_none());

        let speed = GeoKinematics::implied_speed_kn(a, t, b, t + Duration::hours(1)).unwrap();
        assert!((speed - 60.04).abs() < 0.05);
    }

    #[test]
    fn heading_delta_wraps_through_north() {
        assert_eq!(GeoKinematics::heading_delta_deg(350.0, 10.0), 20.0);
        assert_eq!(GeoKinematics::heading_delta_deg(10.0, 350.0), 20.0);
        assert_eq!(GeoKinematics::heading_delta_deg(0.0, 180.0), 180.0);
    }
}
