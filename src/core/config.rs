//! Quest configuration with documented constants
//!
//! Every tunable number the quest uses lives here. Defaults reproduce the
//! field-tested values; `data/quest.toml` can override any subset of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::error::{QuestError, Result};

/// Top-level configuration for a quest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    pub scoring: ScoringConfig,
    pub timing: TimingConfig,
    pub arrival: ArrivalPolicy,
    pub proximity: ProximityConfig,
    pub sensor: SensorConfig,
    pub rewards: RewardConfig,
    /// Seed for the play-order RNG; `None` draws from entropy
    pub seed: Option<u64>,
}

/// Points awarded by the quest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Awarded for any correct answer, regardless of puzzle type
    pub correct_answer: u32,
    /// Awarded on physical arrival (never on skip)
    pub arrival_bonus: u32,
    /// Awarded once when a discount is claimed at a commercial location
    pub discount_claim: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correct_answer: 100,
            arrival_bonus: 50,
            discount_claim: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause between showing a verdict and acting on it. 0 = immediate.
    pub feedback_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 1500,
        }
    }
}

impl TimingConfig {
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

/// Acceptance-radius policy for deciding arrival
///
/// A fix with reported accuracy above `accuracy_threshold_m` widens the
/// radius to `accuracy * accuracy_multiplier`, never below `base_radius_m`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalPolicy {
    pub base_radius_m: f64,
    pub accuracy_threshold_m: f64,
    pub accuracy_multiplier: f64,
}

impl Default for ArrivalPolicy {
    fn default() -> Self {
        Self {
            base_radius_m: 15.0,
            accuracy_threshold_m: 20.0,
            accuracy_multiplier: 1.2,
        }
    }
}

/// Distance bands for the progress display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Distance that maps to 0% progress
    pub max_distance_m: f64,
    pub very_close_m: f64,
    pub closer_m: f64,
    pub on_track_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            max_distance_m: 1000.0,
            very_close_m: 50.0,
            closer_m: 150.0,
            on_track_m: 300.0,
        }
    }
}

/// Options passed to the location sensor on `watch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 15_000,
            maximum_age_ms: 30_000,
        }
    }
}

/// A discount shown at a commercial location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTemplate {
    pub description: String,
    pub code: String,
}

/// Offer chosen when the location name contains `matches`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRule {
    pub matches: String,
    #[serde(flatten)]
    pub offer: OfferTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub default: OfferTemplate,
    pub offers: Vec<OfferRule>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            default: OfferTemplate {
                description: "15% off your purchase!".into(),
                code: "QUEST15".into(),
            },
            offers: vec![OfferRule {
                matches: "Billiard-Sportpark".into(),
                offer: OfferTemplate {
                    description: "20% off your next game session!".into(),
                    code: "BRUCHSAL20".into(),
                },
            }],
        }
    }
}

impl QuestConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QuestConfig = toml::from_str(content)?;
        config.validate().map_err(QuestError::Config)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let arrival = &self.arrival;
        if !(arrival.base_radius_m > 0.0) {
            return Err(format!(
                "arrival.base_radius_m ({}) must be positive",
                arrival.base_radius_m
            ));
        }
        if arrival.accuracy_multiplier < 1.0 {
            return Err(format!(
                "arrival.accuracy_multiplier ({}) must be >= 1.0",
                arrival.accuracy_multiplier
            ));
        }
        if arrival.accuracy_threshold_m < 0.0 {
            return Err("arrival.accuracy_threshold_m must not be negative".into());
        }

        let p = &self.proximity;
        let ordered = p.very_close_m < p.closer_m
            && p.closer_m < p.on_track_m
            && p.on_track_m <= p.max_distance_m;
        if !ordered {
            return Err(format!(
                "proximity bands must be ordered: \
                 very_close ({}) < closer ({}) < on_track ({}) <= max ({})",
                p.very_close_m, p.closer_m, p.on_track_m, p.max_distance_m
            ));
        }

        Ok(())
    }
}
