//! Location and heading sensor collaborators
//!
//! Sensors deliver readings over channels. `watch` hands back a
//! [`Subscription`] that owns the receiving end; dropping it closes the
//! channel so the sensor can tell nobody is listening any more.

pub mod simulated;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::core::config::SensorConfig;
use crate::core::types::{HeadingSample, PositionFix};

pub use simulated::{SimulatedHeadingSensor, SimulatedLocationSensor, SensorFeed};

/// Why a sensor cannot deliver readings
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("not supported on this device")]
    Unsupported,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a fix")]
    Timeout,
}

/// What the location sensor pushes down a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum LocationReading {
    Fix(PositionFix),
    Error(SensorError),
}

/// Options for a location watch
pub type WatchOptions = SensorConfig;

/// Receiving end of a sensor watch
///
/// Owned exclusively by whoever armed the watch. Dropping it releases the
/// channel; the sender observes `is_closed()`.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx }
    }

    /// Create a connected sender/subscription pair
    pub fn channel() -> (mpsc::UnboundedSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Take the next pending reading without blocking
    pub fn try_next(&mut self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Source of position fixes
pub trait LocationSensor {
    /// Start watching the position
    fn watch(
        &mut self,
        options: WatchOptions,
    ) -> Result<Subscription<LocationReading>, SensorError>;

    /// Release any platform watch. Must be safe to call when not watching.
    fn clear_watch(&mut self);
}

/// Source of compass headings. Optional on many devices.
pub trait HeadingSensor {
    fn watch(&mut self) -> Result<Subscription<HeadingSample>, SensorError>;

    fn clear_watch(&mut self);
}
