use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source the sequencer paces against.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
    /// Block for `d`.
    fn sleep(&self, d: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Deterministic clock for tests. Sleeping advances time instantly.
///
/// Every `now()` reading also advances time by `cost_per_read`, which models frames that take
/// that long to produce.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    cost_per_read: Duration,
    slept: Cell<Duration>,
    sleeps: Cell<u64>,
}

impl ManualClock {
    /// Clock at zero where reading the time is free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock where every reading costs `cost`.
    pub fn with_cost_per_read(cost: Duration) -> Self {
        Self {
            cost_per_read: cost,
            ..Self::default()
        }
    }

    /// Move time forward without sleeping.
    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d);
    }

    /// Total time spent in `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }

    /// Number of `sleep` calls.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.advance(self.cost_per_read);
        self.now.get()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
        self.slept.set(self.slept.get() + d);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}
