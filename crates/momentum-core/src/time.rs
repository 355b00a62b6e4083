//! Fixed-step game time
//!
//! The simulation advances in fixed ticks; rendering-rate deltas are fed in and
//! converted to a whole number of ticks through an accumulator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Length of one simulation tick in seconds
    pub fixed_timestep: f32,
    /// Longest frame delta accepted; anything above is clipped so a stall
    /// does not turn into a burst of catch-up ticks
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 50.0,
            max_delta_time: 0.25,
        }
    }
}

/// Frame clock feeding a fixed-tick simulation
#[derive(Debug, Clone)]
pub struct GameTime {
    pub config: TimeConfig,
    /// Scaled seconds since start
    pub total_time: f64,
    /// Scaled, clipped delta of the last frame
    pub delta_time: f32,
    pub frame_count: u64,
    /// Fixed ticks handed out so far
    pub tick_count: u64,
    pub paused: bool,
    pending: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            tick_count: 0,
            paused: false,
            pending: 0.0,
        }
    }

    /// Feed the real time elapsed since the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.frame_count += 1;
        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        let clipped = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.delta_time = clipped * self.config.time_scale.max(0.0);
        self.total_time += f64::from(self.delta_time);
        self.pending += self.delta_time;
    }

    /// Number of whole ticks owed this frame. The remainder carries over.
    pub fn fixed_steps(&mut self) -> u32 {
        let step = self.config.fixed_timestep;
        let mut steps = 0;
        while self.pending >= step {
            self.pending -= step;
            steps += 1;
        }
        self.tick_count += u64::from(steps);
        steps
    }

    /// Fraction of a tick left over after [`GameTime::fixed_steps`]
    pub fn fixed_interpolation(&self) -> f32 {
        self.pending / self.config.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_clock_owes_nothing() {
        let mut time = GameTime::default();
        time.update(0.016);
        assert!(time.delta_time > 0.0);

        time.paused = true;
        time.update(0.5);
        assert_eq!(time.delta_time, 0.0);
        assert_eq!(time.frame_count, 2);
        assert_eq!(time.fixed_steps(), 0);
    }

    #[test]
    fn test_fixed_steps_carry_remainder() {
        let mut time = GameTime::new(TimeConfig {
            fixed_timestep: 0.02,
            ..Default::default()
        });

        time.update(0.05);
        assert_eq!(time.fixed_steps(), 2);
        assert!((time.fixed_interpolation() - 0.5).abs() < 1e-3);

        time.update(0.011);
        assert_eq!(time.fixed_steps(), 1);
        assert_eq!(time.tick_count, 3);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut time = GameTime::default();
        time.update(5.0);
        assert_eq!(time.delta_time, time.config.max_delta_time);
    }
}
