use rand::Rng;
use std::time::Duration;

/// Simulated listening time before a work is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    min_secs: u64,
    max_secs: u64,
}

impl PacingPolicy {
    /// Inclusive range in whole seconds. Callers validate `min_secs <= max_secs`.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::from_secs(self.min_secs);
        }
        Duration::from_secs(rng.gen_range(self.min_secs..=self.max_secs))
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (Duration::from_secs(self.min_secs), Duration::from_secs(self.max_secs))
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(15, 24)
    }
}
