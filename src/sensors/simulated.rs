//! In-process sensors driven by a feed handle
//!
//! Used by the binaries and tests in place of real GPS/compass hardware.
//! The sensor half is handed to the tracker; the [`SensorFeed`] half stays
//! with the caller to push readings and to check for leaked watches.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;

use super::{
    HeadingSensor, LocationReading, LocationSensor, SensorError, Subscription, WatchOptions,
};
use crate::core::types::{HeadingSample, LatLng, PositionFix};

#[derive(Debug)]
struct FeedState<T> {
    sender: Option<UnboundedSender<T>>,
    failure: Option<SensorError>,
    watches_opened: usize,
    last_options: Option<WatchOptions>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            sender: None,
            failure: None,
            watches_opened: 0,
            last_options: None,
        }
    }
}

/// Caller-side handle for a simulated sensor
#[derive(Debug)]
pub struct SensorFeed<T> {
    state: Rc<RefCell<FeedState<T>>>,
}

impl<T> Clone for SensorFeed<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> SensorFeed<T> {
    /// Push a reading to the live watch. Returns false if nobody is watching.
    pub fn push(&self, reading: T) -> bool {
        let state = self.state.borrow();
        match &state.sender {
            Some(tx) => tx.send(reading).is_ok(),
            None => false,
        }
    }

    /// True while a subscription is open and its receiver alive
    pub fn is_watched(&self) -> bool {
        self.state
            .borrow()
            .sender
            .as_ref()
            .map_or(false, |tx| !tx.is_closed())
    }

    /// Number of watches opened over the sensor's lifetime
    pub fn watches_opened(&self) -> usize {
        self.state.borrow().watches_opened
    }

    /// Make subsequent `watch` calls fail with `error`
    pub fn fail_with(&self, error: SensorError) {
        self.state.borrow_mut().failure = Some(error);
    }

    pub fn restore(&self) {
        self.state.borrow_mut().failure = None;
    }

    fn open(&self, options: Option<WatchOptions>) -> Result<Subscription<T>, SensorError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.failure.clone() {
            return Err(error);
        }
        let (tx, sub) = Subscription::channel();
        state.sender = Some(tx);
        state.watches_opened += 1;
        state.last_options = options;
        Ok(sub)
    }

    fn close(&self) {
        self.state.borrow_mut().sender = None;
    }
}

impl SensorFeed<LocationReading> {
    pub fn push_fix(&self, fix: PositionFix) -> bool {
        self.push(LocationReading::Fix(fix))
    }

    pub fn push_position(&self, position: LatLng, accuracy_m: Option<f64>) -> bool {
        self.push_fix(PositionFix::at(position, accuracy_m))
    }

    pub fn push_error(&self, error: SensorError) -> bool {
        self.push(LocationReading::Error(error))
    }

    /// Options passed to the most recent watch
    pub fn last_options(&self) -> Option<WatchOptions> {
        self.state.borrow().last_options
    }
}

impl SensorFeed<HeadingSample> {
    pub fn push_heading(&self, degrees_from_north: f64) -> bool {
        self.push(HeadingSample::new(degrees_from_north))
    }
}

/// Location sensor fed by a [`SensorFeed`]
#[derive(Debug)]
pub struct SimulatedLocationSensor {
    feed: SensorFeed<LocationReading>,
}

impl SimulatedLocationSensor {
    pub fn new() -> (Self, SensorFeed<LocationReading>) {
        let feed = SensorFeed {
            state: Rc::new(RefCell::new(FeedState::default())),
        };
        (Self { feed: feed.clone() }, feed)
    }
}

impl LocationSensor for SimulatedLocationSensor {
    fn watch(
        &mut self,
        options: WatchOptions,
    ) -> Result<Subscription<LocationReading>, SensorError> {
        self.feed.open(Some(options))
    }

    fn clear_watch(&mut self) {
        self.feed.close();
    }
}

/// Heading sensor fed by a [`SensorFeed`]
#[derive(Debug)]
pub struct SimulatedHeadingSensor {
    feed: SensorFeed<HeadingSample>,
}

impl SimulatedHeadingSensor {
    pub fn new() -> (Self, SensorFeed<HeadingSample>) {
        let feed = SensorFeed {
            state: Rc::new(RefCell::new(FeedState::default())),
        };
        (Self { feed: feed.clone() }, feed)
    }
}

impl HeadingSensor for SimulatedHeadingSensor {
    fn watch(&mut self) -> Result<Subscription<HeadingSample>, SensorError> {
        self.feed.open(None)
    }

    fn clear_watch(&mut self) {
        self.feed.close();
    }
}
