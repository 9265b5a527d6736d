// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Peripheral traits the sampling core is written against.
//!
//! The firmware implements these on top of the STM32 timers; tests implement them with plain
//! structs.

/// A periodic timer whose update interrupt drives the delay generator.
pub trait PeriodTimer {
    /// Program the number of ticks per cycle. Takes effect without stopping the counter.
    ///
    /// Callers never pass zero.
    fn set_period(&mut self, ticks: u32);

    /// Start counting and enable the period-elapsed interrupt.
    fn arm(&mut self);

    /// Disable the period-elapsed interrupt and stop counting.
    fn disarm(&mut self);
}

/// Free-running quadrature position counter. Reading does not reset it.
pub trait PositionCounter {
    fn count(&self) -> i16;
}

/// Autoreload register of the timer that generates the stepper's step pulses.
pub trait StepRateRegister {
    fn period(&self) -> u16;
}
