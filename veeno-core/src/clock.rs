/// Frame timing fed by the front end's timestamps
/// Elapsed and per-frame time, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    start: Option<f64>,
    last: f64,
    elapsed: f32,
    delta: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the timestamp `now`. The first tick starts the clock.
    /// Timestamps that go backwards count as a zero-length frame.
    pub fn tick(&mut self, now: f64) -> f32 {
        let start = *self.start.get_or_insert(now);
        let now = now.max(self.last).max(start);
        self.delta = if self.frames == 0 { 0.0 } else { (now - self.last) as f32 };
        self.elapsed = (now - start) as f32;
        self.last = now;
        self.frames += 1;
        self.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_starts_at_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(100.0), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn test_delta_and_elapsed() {
        let mut clock = FrameClock::new();
        clock.tick(10.0);
        assert_relative_eq!(clock.tick(10.5), 0.5);
        clock.tick(11.25);
        assert_relative_eq!(clock.delta(), 0.75);
        assert_relative_eq!(clock.elapsed(), 1.25);
    }

    #[test]
    fn test_backwards_timestamp_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(5.0);
        clock.tick(6.0);
        assert_eq!(clock.tick(4.0), 0.0);
        assert_relative_eq!(clock.elapsed(), 1.0);
    }
}
