//! Accuracy-adaptive acceptance radius

use crate::core::config::ArrivalPolicy;

impl ArrivalPolicy {
    /// Distance within which a fix counts as arrival
    ///
    /// Poor fixes (accuracy worse than the threshold) widen the radius in
    /// proportion to their reported error; good or unknown accuracy uses
    /// the base radius.
    pub fn acceptance_radius(&self, accuracy_m: Option<f64>) -> f64 {
        match accuracy_m {
            Some(accuracy) if accuracy > self.accuracy_threshold_m => {
                self.base_radius_m.max(accuracy * self.accuracy_multiplier)
            }
            _ => self.base_radius_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_policy_table() {
        let policy = ArrivalPolicy::default();
        assert_eq!(policy.acceptance_radius(None), 15.0);
        assert_eq!(policy.acceptance_radius(Some(10.0)), 15.0);
        assert_eq!(policy.acceptance_radius(Some(20.0)), 15.0);
        assert!(approx(policy.acceptance_radius(Some(25.0)), 30.0));
        assert!(approx(policy.acceptance_radius(Some(100.0)), 120.0));
    }

    #[test]
    fn test_nan_accuracy_uses_base() {
        let policy = ArrivalPolicy::default();
        assert_eq!(policy.acceptance_radius(Some(f64::NAN)), 15.0);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ArrivalPolicy {
            base_radius_m: 40.0,
            accuracy_threshold_m: 10.0,
            accuracy_multiplier: 1.5,
        };
        assert_eq!(policy.acceptance_radius(Some(12.0)), 40.0);
        assert!(approx(policy.acceptance_radius(Some(30.0)), 45.0));
    }
}
