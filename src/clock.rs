use crate::constants::MAX_CATCH_UP_TICKS;

#[derive(Clone, Debug)]
pub struct TickClock {
    ticks_per_second: f32,
    accumulator: f32,
}

impl TickClock {
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(0.0),
            accumulator: 0.0,
        }
    }

    // At most MAX_CATCH_UP_TICKS per call; the rest of the backlog is dropped.
    pub fn advance(&mut self, dt_ms: u64) -> u32 {
        self.accumulator += dt_ms as f32 / 1000.0 * self.ticks_per_second;
        let due = self.accumulator.floor();
        if due < 1.0 {
            return 0;
        }
        self.accumulator -= due;
        (due as u32).min(MAX_CATCH_UP_TICKS)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
