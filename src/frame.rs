use std::thread;
use std::time::{Duration, Instant};

/// Sleep-based frame pacing at a fixed rate.
#[derive(Debug)]
pub struct FrameLimiter {
    budget: Duration,
    prev: Instant,
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        let budget = Duration::from_millis(1000 / u64::from(fps.max(1)));
        Self {
            budget,
            prev: Instant::now(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left in the frame after `elapsed`, `None` when already over budget.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.budget.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Sleeps out the rest of the current frame and starts the next one.
    pub fn wait(&mut self) {
        if let Some(rest) = self.remaining(self.prev.elapsed()) {
            thread::sleep(rest);
        }
        self.prev = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_fps_is_twenty_ms() {
        assert_eq!(FrameLimiter::new(50).budget(), Duration::from_millis(20));
    }

    #[test]
    fn over_budget_frames_do_not_sleep() {
        let limiter = FrameLimiter::new(50);
        assert_eq!(limiter.remaining(Duration::from_millis(25)), None);
        assert_eq!(limiter.remaining(Duration::from_millis(20)), None);
        assert_eq!(
            limiter.remaining(Duration::from_millis(5)),
            Some(Duration::from_millis(15))
        );
    }

    #[test]
    fn wait_paces_iterations() {
        let mut limiter = FrameLimiter::new(100);
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
