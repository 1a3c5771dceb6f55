//! Geo-challenge tracker
//!
//! Armed with a target coordinate, the tracker watches the location and
//! heading sensors, reports proximity on every fix and signals arrival
//! exactly once. It is the only owner of sensor subscriptions: they are
//! opened in [`GeoChallengeTracker::start`] and released in
//! [`GeoChallengeTracker::stop`], which also runs on drop.

pub mod proximity;
pub mod radius;

use serde::{Deserialize, Serialize};

use crate::core::config::{ArrivalPolicy, ProximityConfig, QuestConfig};
use crate::core::types::{HeadingSample, LatLng, PositionFix};
use crate::geodesy;
use crate::sensors::{
    HeadingSensor, LocationReading, LocationSensor, SensorError, Subscription, WatchOptions,
};

pub use proximity::{Proximity, ProximityReport};

/// What the tracker tells its owner
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerSignal {
    Progress(ProximityReport),
    /// Raised once per armed challenge; the tracker is already stopped
    Arrived(ProximityReport),
    Heading { relative_bearing_deg: f64 },
    /// Location sensor cannot deliver; the challenge stays armed for skip
    Unavailable(SensorError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerStatus {
    Idle,
    Tracking,
    Unavailable(SensorError),
    Arrived,
}

pub struct GeoChallengeTracker {
    location: Box<dyn LocationSensor>,
    heading: Option<Box<dyn HeadingSensor>>,
    policy: ArrivalPolicy,
    bands: ProximityConfig,
    options: WatchOptions,

    target: Option<LatLng>,
    last_fix: Option<PositionFix>,
    last_heading: f64,
    active: bool,
    status: TrackerStatus,

    location_sub: Option<Subscription<LocationReading>>,
    heading_sub: Option<Subscription<HeadingSample>>,
}

impl GeoChallengeTracker {
    pub fn new(
        location: Box<dyn LocationSensor>,
        heading: Option<Box<dyn HeadingSensor>>,
        config: &QuestConfig,
    ) -> Self {
        Self {
            location,
            heading,
            policy: config.arrival,
            bands: config.proximity,
            options: config.sensor,
            target: None,
            last_fix: None,
            last_heading: 0.0,
            active: false,
            status: TrackerStatus::Idle,
            location_sub: None,
            heading_sub: None,
        }
    }

    /// Arm the tracker for `target` and open sensor watches
    ///
    /// Re-arming an active tracker releases the previous watches first.
    pub fn start(&mut self, target: LatLng) -> &TrackerStatus {
        self.stop();

        self.target = Some(target);
        self.last_fix = None;
        self.last_heading = 0.0;
        self.active = true;

        self.status = match self.location.watch(self.options) {
            Ok(sub) => {
                self.location_sub = Some(sub);
                TrackerStatus::Tracking
            }
            Err(e) => {
                tracing::warn!("Location sensor unavailable: {}", e);
                TrackerStatus::Unavailable(e)
            }
        };

        if let Some(heading) = self.heading.as_mut() {
            match heading.watch() {
                Ok(sub) => self.heading_sub = Some(sub),
                Err(e) => tracing::debug!("Heading sensor unavailable: {}", e),
            }
        }

        tracing::debug!("Tracker armed for {}", target);
        &self.status
    }

    /// Process one position fix
    ///
    /// Returns `None` when inactive or when the fix is unusable.
    pub fn on_fix(&mut self, fix: PositionFix) -> Option<TrackerSignal> {
        if !self.active {
            return None;
        }
        let target = self.target?;
        if !fix.position.is_finite() {
            tracing::warn!("Dropping non-finite fix {:?}", fix.position);
            return None;
        }

        self.last_fix = Some(fix);
        if matches!(self.status, TrackerStatus::Unavailable(_)) {
            self.status = TrackerStatus::Tracking;
        }

        let report = ProximityReport::compute(
            fix.position,
            fix.accuracy_m,
            target,
            self.last_heading,
            &self.policy,
            &self.bands,
        );
        tracing::trace!(
            "distance {:.1}m (radius {:.1}m, accuracy {:?})",
            report.distance_m,
            report.acceptance_radius_m,
            fix.accuracy_m
        );

        if report.is_within_radius() {
            // release sensors before anyone hears about the arrival
            self.stop();
            self.status = TrackerStatus::Arrived;
            tracing::info!("Arrived within {:.1}m of {}", report.distance_m, target);
            Some(TrackerSignal::Arrived(report))
        } else {
            Some(TrackerSignal::Progress(report))
        }
    }

    /// Store a heading; returns the relative bearing when a fix is known
    pub fn on_heading(&mut self, sample: HeadingSample) -> Option<f64> {
        if !self.active || !sample.degrees_from_north.is_finite() {
            return None;
        }
        self.last_heading = sample.degrees_from_north;

        let fix = self.last_fix?;
        let target = self.target?;
        let bearing = geodesy::bearing_degrees(fix.position, target);
        Some(geodesy::relative_bearing(bearing, self.last_heading))
    }

    /// Drain pending sensor readings
    ///
    /// Stops draining the moment arrival is signalled.
    pub fn poll(&mut self) -> Vec<TrackerSignal> {
        let mut signals = Vec::new();

        while self.active {
            let reading = match self.location_sub.as_mut().and_then(|sub| sub.try_next()) {
                Some(reading) => reading,
                None => break,
            };
            match reading {
                LocationReading::Fix(fix) => {
                    if let Some(signal) = self.on_fix(fix) {
                        let arrived = matches!(signal, TrackerSignal::Arrived(_));
                        signals.push(signal);
                        if arrived {
                            return signals;
                        }
                    }
                }
                LocationReading::Error(e) => {
                    tracing::warn!("Location error: {}", e);
                    self.status = TrackerStatus::Unavailable(e.clone());
                    signals.push(TrackerSignal::Unavailable(e));
                }
            }
        }

        while self.active {
            let sample = match self.heading_sub.as_mut().and_then(|sub| sub.try_next()) {
                Some(sample) => sample,
                None => break,
            };
            if let Some(relative_bearing_deg) = self.on_heading(sample) {
                signals.push(TrackerSignal::Heading { relative_bearing_deg });
            }
        }

        signals
    }

    /// Release both sensor watches. Idempotent.
    pub fn stop(&mut self) {
        if self.active {
            tracing::debug!("Tracker stopped");
        }
        self.active = false;
        self.location_sub = None;
        self.heading_sub = None;
        self.location.clear_watch();
        if let Some(heading) = self.heading.as_mut() {
            heading.clear_watch();
        }
        if !matches!(self.status, TrackerStatus::Arrived) {
            self.status = TrackerStatus::Idle;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> &TrackerStatus {
        &self.status
    }

    pub fn target(&self) -> Option<LatLng> {
        self.target
    }

    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }

    pub fn last_heading(&self) -> f64 {
        self.last_heading
    }
}

impl Drop for GeoChallengeTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for GeoChallengeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoChallengeTracker")
            .field("target", &self.target)
            .field("active", &self.active)
            .field("status", &self.status)
            .field("last_fix", &self.last_fix)
            .field("last_heading", &self.last_heading)
            .finish()
    }
}
