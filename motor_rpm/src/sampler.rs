// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-interval speed estimate.
//!
//! Runs once per completed sampling interval and turns raw counter readings into RPM:
//!
//! - **DC motor**: difference of two reads of the 16-bit quadrature counter. A difference larger
//!   than any genuine motion within one interval is a counter wrap; that sample is dropped and the
//!   previous estimate stays on the display. No unwrap is attempted since the wrap direction
//!   cannot be told from the magnitude.
//! - **Stepper**: no feedback, so the speed is derived from the step timer's programmed period.
//!   A period outside the operating band means the motor is idle.

use log::{debug, trace};

use crate::config::SamplerConfig;
use crate::mode::MotorMode;
use crate::timer::{PositionCounter, StepRateRegister};

/// Published speed, tagged with the motor that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpeedEstimate {
    pub rpm: u16,
    pub mode: MotorMode,
}

/// The last two encoder readings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderSample {
    pub current_count: i16,
    pub previous_count: i16,
}

impl EncoderSample {
    /// Counts moved between the two readings, without 16-bit overflow.
    #[inline]
    pub fn delta(&self) -> u32 {
        (self.current_count as i32 - self.previous_count as i32).unsigned_abs()
    }
}

/// What one sampling pass produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// A new estimate replaced the previous one.
    Published(SpeedEstimate),
    /// The encoder delta was implausible (counter wrap); nothing was published.
    Discarded { delta: u32 },
}

pub struct RotationSampler {
    config: SamplerConfig,
    encoder: EncoderSample,
    last: Option<SpeedEstimate>,
}

impl RotationSampler {
    /// `config` must have passed [`SamplerConfig::validate`].
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            encoder: EncoderSample::default(),
            last: None,
        }
    }

    /// Seed the encoder history, e.g. with the counter value right after it is configured.
    pub fn prime(&mut self, count: i16) {
        self.encoder = EncoderSample {
            current_count: count,
            previous_count: count,
        };
    }

    /// Forget the published estimate.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Sample the branch selected by `mode`.
    pub fn sample<C, S>(&mut self, mode: MotorMode, counter: &C, step_rate: &S) -> SampleOutcome
    where
        C: PositionCounter,
        S: StepRateRegister,
    {
        match mode {
            MotorMode::DcMotor => self.sample_dc(counter.count()),
            MotorMode::Stepper => self.sample_stepper(step_rate.period()),
        }
    }

    /// DC branch with an already-read counter value.
    pub fn sample_dc(&mut self, current_count: i16) -> SampleOutcome {
        self.encoder.current_count = current_count;
        let delta = self.encoder.delta();
        self.encoder.previous_count = current_count;

        if delta > self.config.wrap_threshold {
            debug!(
                "encoder delta {} above {}, treating as wrap",
                delta, self.config.wrap_threshold
            );
            return SampleOutcome::Discarded { delta };
        }

        self.publish(self.dc_rpm(delta), MotorMode::DcMotor)
    }

    /// Stepper branch with an already-read step timer period.
    pub fn sample_stepper(&mut self, period: u16) -> SampleOutcome {
        self.publish(self.stepper_rpm(period), MotorMode::Stepper)
    }

    /// RPM for `delta` encoder counts in one interval.
    pub fn dc_rpm(&self, delta: u32) -> u16 {
        let cfg = &self.config;
        let num = delta as u64 * 60 * 1000;
        let den = cfg.interval_ms as u64 * cfg.counts_per_revolution as u64;
        if den == 0 {
            return 0;
        }
        u16::try_from(num / den).unwrap_or(u16::MAX)
    }

    /// RPM for a step timer programmed with `period` ticks per microstep.
    pub fn stepper_rpm(&self, period: u16) -> u16 {
        let cfg = &self.config;
        if !self.stepper_in_band(period) || cfg.microsteps_per_revolution == 0 {
            return 0;
        }
        // 60 / (period * tick_s * microsteps), with tick_s = 1 / step_timer_hz
        let rpm = 60.0 * cfg.step_timer_hz as f32
            / (period as f32 * cfg.microsteps_per_revolution as f32);
        // `as` truncates and saturates
        rpm as u16
    }

    /// Whether `period` is a running (non-idle) step rate.
    #[inline]
    pub fn stepper_in_band(&self, period: u16) -> bool {
        (self.config.stepper_fastest_period..=self.config.stepper_slowest_period).contains(&period)
    }

    /// Estimate to show: the latest published one, kept across discarded samples.
    #[inline]
    pub fn last_estimate(&self) -> Option<SpeedEstimate> {
        self.last
    }

    #[inline]
    pub fn encoder(&self) -> &EncoderSample {
        &self.encoder
    }

    fn publish(&mut self, rpm: u16, mode: MotorMode) -> SampleOutcome {
        let estimate = SpeedEstimate { rpm, mode };
        trace!("{}: {} rpm", mode.label(), rpm);
        self.last = Some(estimate);
        SampleOutcome::Published(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCounter(i16);

    impl PositionCounter for FixedCounter {
        fn count(&self) -> i16 {
            self.0
        }
    }

    struct FixedPeriod(u16);

    impl StepRateRegister for FixedPeriod {
        fn period(&self) -> u16 {
            self.0
        }
    }

    fn sampler() -> RotationSampler {
        RotationSampler::new(SamplerConfig::DEFAULT)
    }

    #[test]
    fn dc_rpm_from_counter_delta() {
        let mut s = sampler();
        s.prime(100);

        let out = s.sample_dc(150);
        assert_eq!(
            out,
            SampleOutcome::Published(SpeedEstimate {
                rpm: 7,
                mode: MotorMode::DcMotor
            })
        );
        assert_eq!(s.encoder().previous_count, 150);
    }

    #[test]
    fn dc_rpm_ignores_direction() {
        let mut s = sampler();
        s.prime(150);
        // 800 counts in 500 ms = 2 rev/s
        let out = s.sample_dc(150 - 800);
        assert_eq!(
            out,
            SampleOutcome::Published(SpeedEstimate {
                rpm: 120,
                mode: MotorMode::DcMotor
            })
        );
    }

    #[test]
    fn wrap_is_discarded_and_previous_estimate_kept() {
        let mut s = sampler();
        s.prime(31_000);
        s.sample_dc(32_000);
        let before = s.last_estimate();
        assert!(before.is_some());

        let out = s.sample_dc(-32_000);
        assert_eq!(out, SampleOutcome::Discarded { delta: 64_000 });
        assert_eq!(s.encoder().previous_count, -32_000);
        assert_eq!(s.last_estimate(), before);

        // Next interval measures from the post-wrap reading.
        let out = s.sample_dc(-31_600);
        assert_eq!(
            out,
            SampleOutcome::Published(SpeedEstimate {
                rpm: 60,
                mode: MotorMode::DcMotor
            })
        );
    }

    #[test]
    fn delta_at_threshold_is_accepted() {
        let mut s = sampler();
        s.prime(0);
        assert!(matches!(s.sample_dc(10_000), SampleOutcome::Published(_)));
        assert!(matches!(
            s.sample_dc(20_001),
            SampleOutcome::Discarded { delta: 10_001 }
        ));
    }

    #[test]
    fn dc_rpm_saturates() {
        let s = RotationSampler::new(SamplerConfig::DEFAULT.with_counts_per_revolution(1));
        assert_eq!(s.dc_rpm(10_000), u16::MAX);
    }

    #[test]
    fn dc_rpm_uses_the_configured_interval() {
        let s = RotationSampler::new(
            SamplerConfig::DEFAULT
                .with_interval_ms(100)
                .with_counts_per_revolution(1000),
        );
        // 100 counts per 100 ms = 1 rev/s
        assert_eq!(s.dc_rpm(100), 60);
    }

    #[test]
    fn stepper_rpm_in_band_is_positive() {
        let s = sampler();
        assert_eq!(s.stepper_rpm(20_000), 187);
        assert_eq!(s.stepper_rpm(40_000), 93);

        for period in [19_999, 20_000, 30_000, 50_000, 65_534] {
            assert!(s.stepper_rpm(period) > 0, "period {}", period);
        }
    }

    #[test]
    fn stepper_out_of_band_is_idle() {
        let s = sampler();
        assert_eq!(s.stepper_rpm(0), 0);
        assert_eq!(s.stepper_rpm(19_998), 0);
        assert_eq!(s.stepper_rpm(u16::MAX), 0);
    }

    #[test]
    fn mode_selects_the_branch() {
        let mut s = sampler();
        let counter = FixedCounter(400);
        let period = FixedPeriod(20_000);

        let out = s.sample(MotorMode::Stepper, &counter, &period);
        assert_eq!(
            out,
            SampleOutcome::Published(SpeedEstimate {
                rpm: 187,
                mode: MotorMode::Stepper
            })
        );
        // The stepper branch does not touch the encoder history.
        assert_eq!(*s.encoder(), EncoderSample::default());

        let out = s.sample(MotorMode::DcMotor, &counter, &period);
        assert_eq!(
            out,
            SampleOutcome::Published(SpeedEstimate {
                rpm: 60,
                mode: MotorMode::DcMotor
            })
        );
    }
}
