//! Distance-to-target reporting for the presentation layer

use serde::{Deserialize, Serialize};

use crate::core::config::{ArrivalPolicy, ProximityConfig};
use crate::core::types::LatLng;
use crate::geodesy;

/// Coarse distance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    Reached,
    VeryClose,
    Closer,
    OnTrack,
    Far,
}

impl Proximity {
    pub fn classify(distance_m: f64, acceptance_radius_m: f64, bands: &ProximityConfig) -> Self {
        if distance_m <= acceptance_radius_m {
            Proximity::Reached
        } else if distance_m <= bands.very_close_m {
            Proximity::VeryClose
        } else if distance_m <= bands.closer_m {
            Proximity::Closer
        } else if distance_m <= bands.on_track_m {
            Proximity::OnTrack
        } else {
            Proximity::Far
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Proximity::Reached => "You reached the target location!",
            Proximity::VeryClose => "Very close! Almost there!",
            Proximity::Closer => "Getting closer! Keep walking!",
            Proximity::OnTrack => "You're on the right track!",
            Proximity::Far => "Start walking towards the target location",
        }
    }
}

/// Everything the presentation layer needs for one fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityReport {
    pub distance_m: f64,
    pub accuracy_m: Option<f64>,
    pub acceptance_radius_m: f64,
    /// 0 at `max_distance_m` or beyond, 100 on the target
    pub progress_pct: f64,
    pub proximity: Proximity,
    /// Compass bearing to the target
    pub bearing_deg: f64,
    /// Bearing relative to where the device points
    pub relative_bearing_deg: f64,
}

impl ProximityReport {
    pub fn compute(
        position: LatLng,
        accuracy_m: Option<f64>,
        target: LatLng,
        heading_deg: f64,
        policy: &ArrivalPolicy,
        bands: &ProximityConfig,
    ) -> Self {
        let distance_m = geodesy::distance_meters(position, target);
        let acceptance_radius_m = policy.acceptance_radius(accuracy_m);
        let bearing_deg = geodesy::bearing_degrees(position, target);

        Self {
            distance_m,
            accuracy_m,
            acceptance_radius_m,
            progress_pct: progress_pct(distance_m, bands.max_distance_m),
            proximity: Proximity::classify(distance_m, acceptance_radius_m, bands),
            bearing_deg,
            relative_bearing_deg: geodesy::relative_bearing(bearing_deg, heading_deg),
        }
    }

    pub fn is_within_radius(&self) -> bool {
        self.distance_m <= self.acceptance_radius_m
    }
}

pub fn progress_pct(distance_m: f64, max_distance_m: f64) -> f64 {
    ((max_distance_m - distance_m) / max_distance_m * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped() {
        assert_eq!(progress_pct(0.0, 1000.0), 100.0);
        assert_eq!(progress_pct(250.0, 1000.0), 75.0);
        assert_eq!(progress_pct(5000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_bands() {
        let bands = ProximityConfig::default();
        assert_eq!(Proximity::classify(10.0, 15.0, &bands), Proximity::Reached);
        assert_eq!(Proximity::classify(40.0, 15.0, &bands), Proximity::VeryClose);
        assert_eq!(Proximity::classify(40.0, 45.0, &bands), Proximity::Reached);
        assert_eq!(Proximity::classify(100.0, 15.0, &bands), Proximity::Closer);
        assert_eq!(Proximity::classify(299.0, 15.0, &bands), Proximity::OnTrack);
        assert_eq!(Proximity::classify(301.0, 15.0, &bands), Proximity::Far);
    }

    #[test]
    fn test_report_relative_bearing() {
        let report = ProximityReport::compute(
            LatLng::new(0.0, 0.0),
            None,
            LatLng::new(0.0, 0.01),
            90.0,
            &ArrivalPolicy::default(),
            &ProximityConfig::default(),
        );
        assert!((report.bearing_deg - 90.0).abs() < 1e-6);
        assert!(report.relative_bearing_deg < 1e-6 || report.relative_bearing_deg > 360.0 - 1e-6);
        assert_eq!(report.proximity, Proximity::Far);
        assert!(!report.is_within_radius());
    }
}
