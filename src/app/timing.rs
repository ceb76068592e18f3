use std::time::Duration;

/// Leading-edge throttle over event timestamps in milliseconds.
///
/// The first event passes; further events pass once `interval` has elapsed
/// since the last one that passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    interval_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_secs_f64() * 1000.0,
            last: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.interval_ms && now_ms >= last => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_leading_edge_then_waits() {
        let mut throttle = Throttle::new(Duration::from_millis(200));
        assert!(throttle.ready(1000.0));
        assert!(!throttle.ready(1050.0));
        assert!(!throttle.ready(1199.0));
        assert!(throttle.ready(1200.0));
        assert!(!throttle.ready(1300.0));
    }

    #[test]
    fn clock_going_backwards_does_not_block() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert!(throttle.ready(500.0));
        assert!(throttle.ready(10.0));
        throttle.reset();
        assert!(throttle.ready(15.0));
    }
}
