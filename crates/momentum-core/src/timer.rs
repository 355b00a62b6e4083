//! Countdown timers for gameplay state machines

/// A countdown that fires once when it crosses zero.
///
/// Remaining time never goes negative; after firing the timer is inactive
/// until started again.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    remaining: f32,
    active: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer with `duration` seconds, replacing any running countdown
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
        self.active = true;
    }

    /// Disarm without firing
    pub fn stop(&mut self) {
        self.active = false;
        self.remaining = 0.0;
    }

    /// Set the remaining time without changing whether the timer is armed
    pub fn set_remaining(&mut self, remaining: f32) {
        self.remaining = remaining.max(0.0);
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the countdown
    /// reaches zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_exactly_once() {
        let mut timer = Countdown::new();
        timer.start(0.05);

        let fired: Vec<bool> = (0..5).map(|_| timer.tick(0.02)).collect();
        assert_eq!(fired, vec![false, false, true, false, false]);
        assert_eq!(timer.remaining(), 0.0);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_stop_never_fires() {
        let mut timer = Countdown::new();
        timer.start(0.01);
        timer.stop();
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn test_restart_replaces_remaining() {
        let mut timer = Countdown::new();
        timer.start(1.0);
        timer.tick(0.5);
        timer.start(2.0);
        assert_eq!(timer.remaining(), 2.0);
    }
}
