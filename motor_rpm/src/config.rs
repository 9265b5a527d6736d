// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sampling and motor constants.
//!
//! Everything the speed formulas depend on is fixed here at initialization. Start from
//! [`SamplerConfig::DEFAULT`] and override with the `with_*` setters:
//!
//! ```
//! use motor_rpm::SamplerConfig;
//!
//! let cfg = SamplerConfig::DEFAULT
//!     .with_interval_ms(250)
//!     .with_counts_per_revolution(1200);
//! assert!(cfg.validate().is_ok());
//! ```

use crate::delay::{DelayRequest, DelayState};
use crate::error::{Error, Result};

/// Sampling interval used by `init`.
pub const SAMPLE_INTERVAL_MS: u32 = 500;

/// Sampling timer clock after the prescaler (1 tick = 1 µs).
pub const SAMPLE_TIMER_HZ: u32 = 1_000_000;

/// Quadrature counts per output shaft revolution.
pub const QUADRATURE_COUNTS_PER_REV: u32 = 800;

/// Largest encoder delta that can be genuine motion within one interval at rated top speed.
pub const WRAP_THRESHOLD_COUNTS: u32 = 10_000;

/// Stepper microsteps per revolution.
pub const STEPPER_MICROSTEPS_PER_REV: u32 = 1600;

/// Step timer autoreload at the fastest allowed speed.
pub const STEPPER_FASTEST_PERIOD: u16 = 20_000 - 1;

/// Step timer autoreload at the slowest allowed speed.
pub const STEPPER_SLOWEST_PERIOD: u16 = u16::MAX - 1;

/// Step timer clock (1 tick = 10 ns).
pub const STEPPER_TIMER_HZ: u32 = 100_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Sampling interval in milliseconds.
    pub interval_ms: u32,
    /// Sampling timer tick rate.
    pub sample_timer_hz: u32,
    /// Largest number of ticks the sampling timer can count in one cycle.
    pub max_ticks_per_cycle: u32,

    /// Encoder counts per revolution.
    pub counts_per_revolution: u32,
    /// Deltas above this are treated as counter wrap.
    pub wrap_threshold: u32,

    /// Stepper microsteps per revolution.
    pub microsteps_per_revolution: u32,
    /// Step timer clock.
    pub step_timer_hz: u32,
    /// Smallest in-band step period (fastest).
    pub stepper_fastest_period: u16,
    /// Largest in-band step period (slowest).
    pub stepper_slowest_period: u16,
}

impl SamplerConfig {
    pub const DEFAULT: Self = Self {
        interval_ms: SAMPLE_INTERVAL_MS,
        sample_timer_hz: SAMPLE_TIMER_HZ,
        max_ticks_per_cycle: u32::MAX,

        counts_per_revolution: QUADRATURE_COUNTS_PER_REV,
        wrap_threshold: WRAP_THRESHOLD_COUNTS,

        microsteps_per_revolution: STEPPER_MICROSTEPS_PER_REV,
        step_timer_hz: STEPPER_TIMER_HZ,
        stepper_fastest_period: STEPPER_FASTEST_PERIOD,
        stepper_slowest_period: STEPPER_SLOWEST_PERIOD,
    };

    pub const fn with_interval_ms(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the sampling timer tick rate and its single-cycle range.
    pub const fn with_sample_timer(mut self, hz: u32, max_ticks_per_cycle: u32) -> Self {
        self.sample_timer_hz = hz;
        self.max_ticks_per_cycle = max_ticks_per_cycle;
        self
    }

    pub const fn with_counts_per_revolution(mut self, counts: u32) -> Self {
        self.counts_per_revolution = counts;
        self
    }

    pub const fn with_wrap_threshold(mut self, counts: u32) -> Self {
        self.wrap_threshold = counts;
        self
    }

    /// Set the stepper drive constants: microsteps/rev, step timer clock and the in-band
    /// period range.
    pub const fn with_stepper(
        mut self,
        microsteps_per_revolution: u32,
        step_timer_hz: u32,
        fastest_period: u16,
        slowest_period: u16,
    ) -> Self {
        self.microsteps_per_revolution = microsteps_per_revolution;
        self.step_timer_hz = step_timer_hz;
        self.stepper_fastest_period = fastest_period;
        self.stepper_slowest_period = slowest_period;
        self
    }

    /// The delay request the sampler runs with.
    pub fn delay_request(&self) -> DelayRequest {
        DelayRequest {
            requested_interval_ms: self.interval_ms,
            hardware_tick_hz: self.sample_timer_hz,
            max_ticks_per_cycle: self.max_ticks_per_cycle,
        }
    }

    /// Check that every formula is defined for these values.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(Error::InvalidInterval);
        }
        if self.sample_timer_hz == 0 {
            return Err(Error::InvalidConfig("sample timer rate is zero"));
        }
        if self.max_ticks_per_cycle == 0 {
            return Err(Error::InvalidConfig("sample timer range is zero"));
        }
        if self.counts_per_revolution == 0 {
            return Err(Error::InvalidConfig("counts per revolution is zero"));
        }
        if self.microsteps_per_revolution == 0 {
            return Err(Error::InvalidConfig("microsteps per revolution is zero"));
        }
        if self.step_timer_hz == 0 {
            return Err(Error::InvalidConfig("step timer rate is zero"));
        }
        if self.stepper_fastest_period == 0
            || self.stepper_fastest_period > self.stepper_slowest_period
        {
            return Err(Error::InvalidConfig("empty stepper period band"));
        }
        // The interval must decompose onto the sampling timer.
        DelayState::for_request(&self.delay_request())?;
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SamplerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = SamplerConfig::DEFAULT.with_interval_ms(0);
        assert_eq!(cfg.validate(), Err(Error::InvalidInterval));
    }

    #[test]
    fn inverted_stepper_band_is_rejected() {
        let cfg = SamplerConfig::DEFAULT.with_stepper(1600, 100_000_000, 50_000, 20_000);
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn interval_shorter_than_one_tick_is_rejected() {
        // 1 ms at 100 Hz is a tenth of a tick.
        let cfg = SamplerConfig::DEFAULT
            .with_sample_timer(100, u32::MAX)
            .with_interval_ms(1);
        assert_eq!(cfg.validate(), Err(Error::InvalidInterval));
    }

    #[test]
    fn every_valid_config_can_start() {
        let cfg = SamplerConfig::DEFAULT
            .with_sample_timer(1_000, 10)
            .with_interval_ms(3);
        assert_eq!(cfg.validate(), Ok(()));
        assert!(DelayState::for_request(&cfg.delay_request()).is_ok());
    }

    #[test]
    fn zero_counts_per_revolution_is_rejected() {
        let cfg = SamplerConfig::DEFAULT.with_counts_per_revolution(0);
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }
}
