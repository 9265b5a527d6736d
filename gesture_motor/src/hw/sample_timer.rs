// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM2 as the sampling interval timer.
//!
//! TIM2 is 32-bit, so one cycle can span `u32::MAX` ticks. The delay generator reprograms the
//! period from the update interrupt; preload is off so a new period applies to the cycle that just
//! started.

use motor_rpm::timer::PeriodTimer;
use stm32f7xx_hal::pac;

pub struct SampleTimer {
    tim: pac::TIM2,
}

impl SampleTimer {
    /// Configure TIM2 to tick at `timer_clock / (prescaler + 1)`, stopped, with the update
    /// interrupt masked. Use [`super::prescaler_for`] to get `prescaler`.
    pub fn tim2(tim2: pac::TIM2, prescaler: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let tim = tim2;
        tim.cr1.modify(|_, w| w.cen().clear_bit().arpe().clear_bit());
        tim.dier.modify(|_, w| w.uie().clear_bit());

        tim.psc.write(|w| unsafe { w.bits(prescaler as u32) });
        tim.arr.write(|w| w.bits(0xFFFF_FFFF));

        // Latch the prescaler without raising the update flag.
        tim.cr1.modify(|_, w| w.urs().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());

        Self { tim }
    }

    /// Acknowledge the update interrupt. Call first thing in the `TIM2` handler.
    #[inline]
    pub fn clear_interrupt(&mut self) {
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }
}

impl PeriodTimer for SampleTimer {
    fn set_period(&mut self, ticks: u32) {
        self.tim.arr.write(|w| w.bits(ticks.saturating_sub(1)));
    }

    fn arm(&mut self) {
        self.tim.cnt.write(|w| w.bits(0));
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
        self.tim.dier.modify(|_, w| w.uie().set_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn disarm(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.dier.modify(|_, w| w.uie().clear_bit());
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }
}
