use std::time::Instant;

/// Monotonic elapsed-time source, started on construction and never reset.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
    elapsed: f64,
}

impl Clock {
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            elapsed: 0.0,
        }
    }

    pub fn started(&self) -> Instant {
        self.start
    }

    /// Seconds since start. Never decreases between calls.
    pub fn elapsed_time(&mut self) -> f64 {
        self.elapsed_at(Instant::now())
    }

    /// Seconds since the previous read.
    pub fn delta(&mut self) -> f64 {
        self.delta_at(Instant::now())
    }

    pub fn elapsed_at(&mut self, now: Instant) -> f64 {
        self.delta_at(now);
        self.elapsed
    }

    fn delta_at(&mut self, now: Instant) -> f64 {
        let now = now.max(self.last);
        let delta = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.elapsed = now.duration_since(self.start).as_secs_f64();
        delta
    }
}
