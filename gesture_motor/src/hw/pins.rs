// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the NUCLEO-F767ZI gesture motor board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpioc, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub led: gpiob::PB7<Output<PushPull>>,
    pub usart3: Usart3Pins,
    pub encoder: EncoderPins,
    pub motor: MotorPins,
    pub stepper: StepperPins,
    pub lcd: LcdPins,
}

/// ST-LINK virtual COM port
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// TIM3 quadrature encoder inputs
pub struct EncoderPins {
    pub tim3_ch1: gpioa::PA6<Alternate<2>>,
    pub tim3_ch2: gpioa::PA7<Alternate<2>>,
}

/// TIM1 motor outputs
pub struct MotorPins {
    pub dc_pwm: gpioa::PA8<Alternate<1>>, // TIM1_CH1
    pub step: gpiob::PB14<Alternate<1>>, // TIM1_CH2N
}

/// Stepper driver control lines
pub struct StepperPins {
    pub rst: gpioc::PC3<Output<PushPull>>,
    pub enable: gpioc::PC4<Output<PushPull>>,
    pub dir: gpioc::PC5<Output<PushPull>>,
    pub ps: gpioc::PC8<Output<PushPull>>,
    pub vref: gpioa::PA4<Output<PushPull>>,
}

/// HD44780 in 4-bit mode, write only (R/W tied low)
pub struct LcdPins {
    pub rs: gpiod::PD0<Output<PushPull>>,
    pub en: gpiod::PD1<Output<PushPull>>,
    pub d4: gpiod::PD4<Output<PushPull>>,
    pub d5: gpiod::PD5<Output<PushPull>>,
    pub d6: gpiod::PD6<Output<PushPull>>,
    pub d7: gpiod::PD7<Output<PushPull>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            led: gpiob.pb7.into_push_pull_output(),

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            encoder: EncoderPins {
                tim3_ch1: gpioa.pa6.into_alternate::<2>(),
                tim3_ch2: gpioa.pa7.into_alternate::<2>(),
            },

            motor: MotorPins {
                dc_pwm: gpioa.pa8.into_alternate::<1>(),
                step: gpiob.pb14.into_alternate::<1>(),
            },

            stepper: StepperPins {
                rst: gpioc.pc3.into_push_pull_output(),
                enable: gpioc.pc4.into_push_pull_output(),
                dir: gpioc.pc5.into_push_pull_output(),
                ps: gpioc.pc8.into_push_pull_output(),
                vref: gpioa.pa4.into_push_pull_output(),
            },

            lcd: LcdPins {
                rs: gpiod.pd0.into_push_pull_output(),
                en: gpiod.pd1.into_push_pull_output(),
                d4: gpiod.pd4.into_push_pull_output(),
                d5: gpiod.pd5.into_push_pull_output(),
                d6: gpiod.pd6.into_push_pull_output(),
                d7: gpiod.pd7.into_push_pull_output(),
            },
        }
    }
}

impl StepperPins {
    /// Take the driver out of reset and enable it. Direction is fixed.
    pub fn enable(&mut self) {
        self.dir.set_low();
        self.enable.set_low();
        self.rst.set_high();
        self.ps.set_high();
        self.vref.set_high();
    }

    /// Put the driver back in reset.
    pub fn disable(&mut self) {
        self.rst.set_low();
    }
}
