use std::time::{Duration, Instant};

use crate::Protocol;

/// A named periodic tick source. Aggregators run their tick step once each
/// time the clock fires.
pub trait NetworkClock: Send {
    fn name(&self) -> &str;

    /// Returns true, once, each time the clock has fired since the last call
    fn take_tick(&mut self) -> bool;
}

/// Wall-clock `NetworkClock` firing every `interval`
pub struct FixedClock {
    name: String,
    interval: Duration,
    last: Instant,
}

impl FixedClock {
    pub fn new(name: &str, interval: Duration) -> Self {
        Self {
            name: name.to_string(),
            interval,
            last: Instant::now(),
        }
    }

    /// A clock ticking at the protocol's `tick_interval`, so every peer built
    /// from the same protocol runs at the same rate
    pub fn from_protocol(name: &str, protocol: &Protocol) -> Self {
        Self::new(name, protocol.tick_interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl NetworkClock for FixedClock {
    fn name(&self) -> &str {
        &self.name
    }

    fn take_tick(&mut self) -> bool {
        if self.last.elapsed() < self.interval {
            return false;
        }

        // don't try to catch up on ticks missed while nobody was polling
        self.last = Instant::now();
        true
    }
}
