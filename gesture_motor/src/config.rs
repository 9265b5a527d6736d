// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board configuration.

use log::LevelFilter;
use motor_rpm::{MotorMode, SamplerConfig};
use stm32f7xx_hal::pac;

/// USART wired to the ST-LINK virtual COM port.
pub type ConsoleUsart = pac::USART3;

pub const CONSOLE_BAUD: u32 = 115_200;

/// Core clock. TIM1 and TIM2 both divide down from it.
pub const SYSCLK_HZ: u32 = 100_000_000;

/// Motor reported on when `init` has no argument.
pub const DEFAULT_MODE: MotorMode = MotorMode::DcMotor;

pub const SAMPLER: SamplerConfig = SamplerConfig::DEFAULT;

#[cfg(feature = "verbose")]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;
#[cfg(not(feature = "verbose"))]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;
