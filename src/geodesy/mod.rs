//! Spherical-earth distance and bearing
//!
//! Pure functions over `LatLng` in decimal degrees. All math uses a spherical
//! earth of mean radius 6,371 km, which is what arrival radii are tuned for.

use geo::HaversineDestination;
use std::f64::consts::PI;

use crate::core::types::LatLng;

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine)
///
/// Symmetric, and zero for identical points. Non-finite input produces a
/// non-finite result, which never compares `<=` to an acceptance radius.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from `from` to `to`, in [-π, π]
///
/// Identical points give `atan2(0, 0) == 0`.
pub fn bearing_radians(from: LatLng, to: LatLng) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    y.atan2(x)
}

/// Initial bearing in compass degrees, [0, 360)
pub fn bearing_degrees(from: LatLng, to: LatLng) -> f64 {
    normalize_degrees(bearing_radians(from, to) * 180.0 / PI)
}

/// Map any finite angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Direction to the target relative to where the device is pointing
pub fn relative_bearing(bearing_deg: f64, heading_deg: f64) -> f64 {
    normalize_degrees(bearing_deg - heading_deg)
}

/// Move from `from` toward `to` by up to `meters` along the great circle
///
/// Never overshoots: if the target is closer than `meters`, returns `to`.
pub fn step_toward(from: LatLng, to: LatLng, meters: f64) -> LatLng {
    let remaining = distance_meters(from, to);
    if !(meters > 0.0) {
        return from;
    }
    if remaining <= meters {
        return to;
    }

    let origin: geo::Point<f64> = from.into();
    origin
        .haversine_destination(bearing_degrees(from, to), meters)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_identical_points() {
        let p = LatLng::new(49.1246, 8.5981);
        assert_eq!(distance_meters(p, p), 0.0);
        assert_eq!(bearing_radians(p, p), 0.0);
        assert_eq!(bearing_degrees(p, p), 0.0);
    }

    #[test]
    fn test_thousandth_degree_at_equator() {
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(0.001, 0.0));
        assert!(approx(d, 111.19, 111.19 * 0.01), "got {d}");
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = LatLng::new(0.0, 0.0);
        assert!(approx(bearing_degrees(origin, LatLng::new(0.0, 1.0)), 90.0, 1e-9));
        assert!(approx(bearing_degrees(origin, LatLng::new(1.0, 0.0)), 0.0, 1e-9));
        assert!(approx(bearing_degrees(origin, LatLng::new(0.0, -1.0)), 270.0, 1e-9));
        assert!(approx(bearing_degrees(origin, LatLng::new(-1.0, 0.0)), 180.0, 1e-9));
    }

    #[test]
    fn test_bearing_radians_range() {
        let west = bearing_radians(LatLng::new(0.0, 0.0), LatLng::new(0.0, -1.0));
        assert!(approx(west, -PI / 2.0, 1e-9));
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
    }

    #[test]
    fn test_relative_bearing_wraps() {
        assert_eq!(relative_bearing(10.0, 350.0), 20.0);
        assert_eq!(relative_bearing(350.0, 10.0), 340.0);
        assert_eq!(relative_bearing(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_nan_propagates_without_panic() {
        let d = distance_meters(LatLng::new(f64::NAN, 0.0), LatLng::new(0.0, 0.0));
        assert!(d.is_nan());
        assert!(!(d <= 15.0));
    }

    #[test]
    fn test_step_toward_closes_distance() {
        let from = LatLng::new(50.1106, 8.6821);
        let to = LatLng::new(50.1180, 8.6512);
        let start = distance_meters(from, to);

        let next = step_toward(from, to, 100.0);
        let after = distance_meters(next, to);
        assert!(approx(start - after, 100.0, 1.0), "moved {}", start - after);
    }

    #[test]
    fn test_step_toward_does_not_overshoot() {
        let from = LatLng::new(50.0, 8.0);
        let to = LatLng::new(50.0001, 8.0);
        assert_eq!(step_toward(from, to, 500.0), to);
        assert_eq!(step_toward(from, to, 0.0), from);
    }
}
