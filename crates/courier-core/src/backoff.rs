use std::time::Duration;

/// Default lower bound for the idle polling delay.
pub const DEFAULT_FLOOR_MS: u64 = 5_000;
/// Default upper bound for the idle polling delay.
pub const DEFAULT_CEILING_MS: u64 = 60_000;

/// Controls how long a runner waits between idle lease polls.
///
/// The delay starts at the floor and doubles on each consecutive empty or
/// failed lease attempt until it reaches the ceiling. An explicit server
/// hint (`backoffMs` in the lease response) is used verbatim for that wait
/// and does not reset the curve. Any granted work snaps the delay back to
/// the floor.
#[derive(Debug, Clone)]
pub struct IdleBackoff {
    floor: Duration,
    ceiling: Duration,
    next: Duration,
}

impl IdleBackoff {
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self {
            floor,
            ceiling,
            next: floor,
        }
    }

    /// Delay to wait after an empty or failed lease attempt.
    pub fn on_idle(&mut self, server_hint_ms: Option<u64>) -> Duration {
        let computed = self.next;
        self.next = (self.next * 2).min(self.ceiling);

        match server_hint_ms {
            Some(ms) => Duration::from_millis(ms),
            None => computed,
        }
    }

    /// Work was granted; the next idle wait starts over at the floor.
    pub fn on_work(&mut self) {
        self.next = self.floor;
    }
}

impl Default for IdleBackoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_FLOOR_MS),
            Duration::from_millis(DEFAULT_CEILING_MS),
        )
    }
}
