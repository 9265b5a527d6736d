// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod encoder;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod sample_timer;
pub mod usart;

pub use encoder::Encoder;
pub use led::Led;
pub use pins::BoardPins;
pub use pwm::MotorPwm;
pub use sample_timer::SampleTimer;
pub use usart::{Usart, UsartRx};

use motor_rpm::{Error, Peripheral, Result};

/// Prescaler register value that divides `timer_clock_hz` down to `tick_hz` exactly.
///
/// Fails for `peripheral` if the ratio is fractional or exceeds the 16-bit prescaler.
pub fn prescaler_for(timer_clock_hz: u32, tick_hz: u32, peripheral: Peripheral) -> Result<u16> {
    if tick_hz == 0 || tick_hz > timer_clock_hz || timer_clock_hz % tick_hz != 0 {
        return Err(Error::PeripheralInit(peripheral));
    }
    u16::try_from(timer_clock_hz / tick_hz - 1).map_err(|_| Error::PeripheralInit(peripheral))
}
