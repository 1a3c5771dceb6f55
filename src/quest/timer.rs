//! One-shot, cancellable deadline over the machine's logical clock

use std::time::Duration;

/// What happens when the feedback pause ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTransition {
    BeginChallenge,
    Defeat,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackTimer {
    pending: Option<(Duration, PendingTransition)>,
}

impl FeedbackTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `transition` at `now + delay`, replacing anything pending
    pub fn arm(&mut self, now: Duration, delay: Duration, transition: PendingTransition) {
        self.pending = Some((now + delay, transition));
    }

    /// Returns true if something was pending
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Take the transition if its deadline has passed
    pub fn poll(&mut self, now: Duration) -> Option<PendingTransition> {
        match self.pending {
            Some((due, transition)) if now >= due => {
                self.pending = None;
                Some(transition)
            }
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Duration> {
        self.pending.map(|(due, _)| due)
    }
}
