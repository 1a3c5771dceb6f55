//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Unique identifier for a play session (one per `start`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordinal index of a question in the bank (load order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub usize);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl From<LatLng> for geo::Point<f64> {
    fn from(p: LatLng) -> Self {
        geo::Point::new(p.lng, p.lat)
    }
}

impl From<geo::Point<f64>> for LatLng {
    fn from(p: geo::Point<f64>) -> Self {
        Self::new(p.y(), p.x())
    }
}

/// One reading from the location sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub position: LatLng,
    /// Horizontal accuracy radius reported by the sensor, if any
    pub accuracy_m: Option<f64>,
    pub timestamp: SystemTime,
}

impl PositionFix {
    pub fn new(lat: f64, lng: f64, accuracy_m: Option<f64>) -> Self {
        Self {
            position: LatLng::new(lat, lng),
            accuracy_m,
            timestamp: SystemTime::now(),
        }
    }

    pub fn at(position: LatLng, accuracy_m: Option<f64>) -> Self {
        Self {
            position,
            accuracy_m,
            timestamp: SystemTime::now(),
        }
    }
}

/// Device compass heading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadingSample {
    pub degrees_from_north: f64,
}

impl HeadingSample {
    pub fn new(degrees_from_north: f64) -> Self {
        Self { degrees_from_north }
    }
}
