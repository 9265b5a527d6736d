// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Open-loop speed set-points.
//!
//! Maps the 0–100 % speed commands coming from the gesture host onto timer registers. There is no
//! feedback here; the sampler only reports what these registers produce.

use crate::config::SamplerConfig;

/// Step timer period written while the stepper is idle. Lies outside every valid band, so the
/// sampler reports 0 RPM.
pub const STEPPER_IDLE_PERIOD: u16 = u16::MAX;

/// Step timer period for a speed in percent, or `None` for 0 % (idle).
///
/// 1 % runs at the slowest in-band period, 100 % at the fastest. Values above 100 are clamped.
pub fn stepper_period_for_percent(percent: u8, config: &SamplerConfig) -> Option<u16> {
    if percent == 0 {
        return None;
    }
    let percent = percent.min(100) as u32;
    let slowest = config.stepper_slowest_period as u32;
    let fastest = config.stepper_fastest_period as u32;
    let span = slowest.saturating_sub(fastest);

    Some((slowest - span * (percent - 1) / 99) as u16)
}

/// PWM compare value for a duty cycle in percent of `max_duty`. Values above 100 are clamped.
pub fn dc_duty_for_percent(percent: u8, max_duty: u16) -> u16 {
    (max_duty as u32 * percent.min(100) as u32 / 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::RotationSampler;

    #[test]
    fn zero_percent_idles_the_stepper() {
        assert_eq!(stepper_period_for_percent(0, &SamplerConfig::DEFAULT), None);

        let s = RotationSampler::new(SamplerConfig::DEFAULT);
        assert!(!s.stepper_in_band(STEPPER_IDLE_PERIOD));
    }

    #[test]
    fn stepper_band_endpoints() {
        let cfg = SamplerConfig::DEFAULT;
        assert_eq!(
            stepper_period_for_percent(1, &cfg),
            Some(cfg.stepper_slowest_period)
        );
        assert_eq!(
            stepper_period_for_percent(100, &cfg),
            Some(cfg.stepper_fastest_period)
        );
        assert_eq!(
            stepper_period_for_percent(255, &cfg),
            Some(cfg.stepper_fastest_period)
        );
    }

    #[test]
    fn stepper_period_shrinks_as_speed_rises() {
        let cfg = SamplerConfig::DEFAULT;
        let s = RotationSampler::new(cfg);
        let mut last_rpm = 0;
        for percent in 1..=100 {
            let period = stepper_period_for_percent(percent, &cfg).unwrap();
            assert!(s.stepper_in_band(period));
            let rpm = s.stepper_rpm(period);
            assert!(rpm >= last_rpm);
            last_rpm = rpm;
        }
    }

    #[test]
    fn dc_duty_scales_linearly() {
        assert_eq!(dc_duty_for_percent(0, 65_534), 0);
        assert_eq!(dc_duty_for_percent(50, 1000), 500);
        assert_eq!(dc_duty_for_percent(100, 65_534), 65_534);
        assert_eq!(dc_duty_for_percent(180, 1000), 1000);
    }
}
