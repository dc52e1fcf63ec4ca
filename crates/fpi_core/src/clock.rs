//! Frame clock derived from a monotonic hardware counter.
//!
//! `ticks` is measured relative to the counter value captured at `initialize`,
//! every other unit is a pure function of `ticks`/`delta_ticks` and
//! `ticks_per_second`.

/// Monotonic counter provider: a frequency that never changes and a current count.
pub trait CounterSource {
    fn frequency(&self) -> u64;
    fn now(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub delta_seconds: f32,
    pub delta_ticks: u64,
    pub delta_nanoseconds: u64,
    pub delta_microseconds: u64,
    pub delta_milliseconds: u64,

    pub seconds: f64,
    pub ticks: u64,
    pub nanoseconds: u64,
    pub microseconds: u64,
    pub milliseconds: u64,

    pub initial_ticks: u64,
    pub ticks_per_second: u64,
}

impl FrameClock {
    pub fn initialize(&mut self, counter: &dyn CounterSource) {
        self.ticks_per_second = counter.frequency().max(1);
        self.initial_ticks = counter.now();
        self.ticks = 0;
        log::debug!(
            "Clock initialized: {} ticks/s, reference {}",
            self.ticks_per_second,
            self.initial_ticks
        );
    }

    pub fn pull(&mut self, counter: &dyn CounterSource) {
        self.advance_to(counter.now());
    }

    /// Recomputes every unit for an absolute counter reading.
    pub fn advance_to(&mut self, current_ticks: u64) {
        let ticks = current_ticks.saturating_sub(self.initial_ticks);
        // `ticks` is already relative to `initial_ticks`; subtracting the reference a
        // second time here would underflow the delta on every frame after the first.
        self.delta_ticks = ticks.saturating_sub(self.ticks);
        self.ticks = ticks;

        self.delta_nanoseconds = ticks_to_nanoseconds(self.delta_ticks, self.ticks_per_second);
        self.delta_microseconds = self.delta_nanoseconds / 1000;
        self.delta_milliseconds = self.delta_microseconds / 1000;
        self.delta_seconds = self.delta_ticks as f32 / self.ticks_per_second as f32;

        self.nanoseconds = ticks_to_nanoseconds(self.ticks, self.ticks_per_second);
        self.microseconds = self.nanoseconds / 1000;
        self.milliseconds = self.microseconds / 1000;
        self.seconds = self.ticks as f64 / self.ticks_per_second as f64;
    }
}

fn ticks_to_nanoseconds(ticks: u64, ticks_per_second: u64) -> u64 {
    let nanos = (ticks as u128 * 1_000_000_000) / ticks_per_second as u128;
    u64::try_from(nanos).unwrap_or(u64::MAX)
}
