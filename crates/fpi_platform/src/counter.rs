use std::time::Instant;

use fpi_core::CounterSource;

/// Nanosecond counter over the monotonic system clock.
pub struct InstantCounter {
    origin: Instant,
}

impl InstantCounter {
    pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for InstantCounter {
    fn frequency(&self) -> u64 {
        Self::TICKS_PER_SECOND
    }

    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_monotonic() {
        let counter = InstantCounter::new();
        let a = counter.now();
        let b = counter.now();
        assert!(b >= a);
        assert_eq!(counter.frequency(), 1_000_000_000);
    }
}
