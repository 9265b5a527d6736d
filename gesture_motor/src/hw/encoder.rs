// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder on TIM3.
//!
//! The counter runs over its full 16-bit range and is read as a signed position, so it wraps
//! between 32767 and -32768. The sampler detects and drops samples that span the wrap.

use motor_rpm::timer::PositionCounter;
use stm32f7xx_hal::pac;

pub struct Encoder<TIM> {
    tim: TIM,
}

impl Encoder<pac::TIM3> {
    /// Configure TIM3 in encoder mode 3 on TI1/TI2 and start counting from zero.
    pub fn tim3(tim3: pac::TIM3) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        // Count on both edges of both channels: 4 counts per encoder line.
        tim.smcr.modify(|_, w| w.sms().bits(0b011));
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });

        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// The 16-bit counter read as a signed position.
    #[inline]
    pub fn position(&self) -> i16 {
        self.tim.cnt.read().cnt().bits() as i16
    }
}

impl PositionCounter for Encoder<pac::TIM3> {
    #[inline]
    fn count(&self) -> i16 {
        self.position()
    }
}
