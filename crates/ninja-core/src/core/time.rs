/// Default number of simulation ticks per second.
pub const TICK_RATE: f32 = 60.0;
/// Most ticks run for a single host frame; the rest of a long stall is dropped.
pub const MAX_STEPS: u32 = 10;

/// Converts variable host frame times into a whole number of fixed ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt: if dt > 0.0 { dt } else { 1.0 / TICK_RATE },
            accumulator: 0.0,
            max_steps: MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add elapsed host time and return how many ticks are due.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a tick left over, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop leftover time, e.g. after a level reload or unpause.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / TICK_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_frame_is_one_tick() {
        let mut ts = FixedTimestep::default();
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn short_frames_carry_over() {
        let mut ts = FixedTimestep::default();
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
        let a = ts.alpha();
        assert!((0.0..1.0).contains(&a), "alpha was {}", a);
    }

    #[test]
    fn stalls_are_capped() {
        let mut ts = FixedTimestep::default();
        assert_eq!(ts.accumulate(1.0), MAX_STEPS);
        let mut slow = FixedTimestep::default().with_max_steps(3);
        assert_eq!(slow.accumulate(1.0), 3);
    }

    #[test]
    fn invalid_dt_and_negative_time() {
        let mut ts = FixedTimestep::new(0.0);
        assert!((ts.dt() - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(ts.accumulate(-1.0), 0);
        ts.accumulate(0.01);
        ts.reset();
        assert_eq!(ts.alpha(), 0.0);
    }
}
