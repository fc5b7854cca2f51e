//! Frame timing.

use std::time::Instant;

/// Tracks elapsed time and per-frame deltas.
pub struct Timer {
    start: Instant,
    last_tick: Instant,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the previous tick, advancing the tick point.
    pub fn delta_secs(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_tick = now;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_advances_tick_point() {
        let mut timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let first = timer.delta_secs();
        assert!(first > 0.0);
        let second = timer.delta_secs();
        assert!(second < first);
    }

    #[test]
    fn reset_restarts_elapsed() {
        let mut timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        timer.reset();
        assert!(timer.elapsed_secs() < 0.005);
    }
}
