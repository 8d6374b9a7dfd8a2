use instant::{Duration, Instant};

/// Frame clock of an [`Experience`](super::Experience).
#[derive(Clone, Copy, Debug)]
pub struct Time {
    pub start: Instant,
    pub current: Instant,
    /// Since `start`.
    pub elapsed: Duration,
    /// Between the last two ticks. A frame at 60 Hz before the first tick.
    pub delta: Duration,
}

impl Time {
    pub const FIRST_DELTA: Duration = Duration::from_millis(16);

    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            current: start,
            elapsed: Duration::ZERO,
            delta: Self::FIRST_DELTA,
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advances the clock to `now`. A `now` before the last tick counts as no time passing.
    pub fn tick_at(&mut self, now: Instant) {
        let now = now.max(self.current);
        self.delta = now.duration_since(self.current);
        self.current = now;
        self.elapsed = now.duration_since(self.start);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
