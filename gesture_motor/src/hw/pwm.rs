// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM1 motor outputs.
//!
//! Both motors share TIM1, so they share its period:
//!
//! | Output | Pin | Signal |
//! | ------ | --- | ------ |
//! | CH1 | PA8 | DC motor PWM, duty relative to the current period |
//! | CH2N | PB14 | Stepper step pulse, 50 % duty; the period sets the step rate |
//!
//! The stepper speed is whatever period is loaded in ARR, which is also what the sampler reads back
//! through [`StepRateRegister`].

use motor_rpm::drive::{dc_duty_for_percent, stepper_period_for_percent, STEPPER_IDLE_PERIOD};
use motor_rpm::timer::StepRateRegister;
use motor_rpm::SamplerConfig;
use stm32f7xx_hal::pac;

// OCxM = PWM mode 1, OCxPE = preload, for CH1 (low byte) and CH2 (high byte).
const CCMR1_PWM1_BOTH: u32 = (0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11);

pub struct MotorPwm {
    tim: pac::TIM1,
    dc_percent: u8,
}

impl MotorPwm {
    /// Configure TIM1 for both outputs with the stepper idle and the DC duty at zero. Outputs stay
    /// disabled until [`MotorPwm::start`].
    pub fn tim1(tim1: pac::TIM1, prescaler: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.tim1en().set_bit());

        let tim = tim1;
        tim.cr1.modify(|_, w| w.cen().clear_bit().arpe().set_bit());

        tim.psc.write(|w| unsafe { w.bits(prescaler as u32) });
        tim.arr.write(|w| unsafe { w.bits(STEPPER_IDLE_PERIOD as u32) });
        tim.ccr1().write(|w| unsafe { w.bits(0) });
        tim.ccr2().write(|w| unsafe { w.bits(0) });
        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR1_PWM1_BOTH) });

        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim, dc_percent: 0 }
    }

    /// Enable CH1 and CH2N.
    pub fn start(&mut self) {
        self.start_dc();
        self.start_stepper();
    }

    /// Enable CH1. Idempotent.
    pub fn start_dc(&mut self) {
        self.tim.ccer.modify(|_, w| w.cc1e().set_bit());
        self.tim.bdtr.modify(|_, w| w.moe().set_bit());
    }

    /// Enable CH2N. Idempotent.
    pub fn start_stepper(&mut self) {
        self.tim.ccer.modify(|_, w| w.cc2ne().set_bit());
        self.tim.bdtr.modify(|_, w| w.moe().set_bit());
    }

    /// Disable both outputs and drop both set-points to zero.
    pub fn stop(&mut self) {
        self.tim.bdtr.modify(|_, w| w.moe().clear_bit());
        self.tim.ccer.modify(|_, w| w.cc1e().clear_bit().cc2ne().clear_bit());
        self.load_step_period(STEPPER_IDLE_PERIOD, false);
        self.set_dc_percent(0);
    }

    /// Set the stepper speed. 0 % idles the stepper.
    pub fn set_stepper_percent(&mut self, percent: u8, config: &SamplerConfig) {
        match stepper_period_for_percent(percent, config) {
            Some(period) => self.load_step_period(period, true),
            None => self.load_step_period(STEPPER_IDLE_PERIOD, false),
        }
        // The DC duty is relative to the period that just changed.
        self.set_dc_percent(self.dc_percent);
    }

    pub fn set_dc_percent(&mut self, percent: u8) {
        self.dc_percent = percent;
        let duty = dc_duty_for_percent(percent, self.period());
        self.tim.ccr1().write(|w| unsafe { w.bits(duty as u32) });
    }

    fn load_step_period(&mut self, period: u16, stepping: bool) {
        let pulse = if stepping { period / 2 } else { 0 };
        self.tim.arr.write(|w| unsafe { w.bits(period as u32) });
        self.tim.ccr2().write(|w| unsafe { w.bits(pulse as u32) });
    }
}

impl StepRateRegister for MotorPwm {
    #[inline]
    fn period(&self) -> u16 {
        self.tim.arr.read().bits() as u16
    }
}
