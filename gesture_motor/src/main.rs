// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::delay::Delay;
use cortex_m::interrupt::{free, Mutex};
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use log::{error, info, warn};
use panic_halt as _;

use hal::{
    interrupt, pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use gesture_motor::app::{App, Timers};
use gesture_motor::drivers::Hd44780;
use gesture_motor::hw::{BoardPins, Led, Usart};
use gesture_motor::{config, console, logger};
use motor_rpm::command::LineParser;

static APP: Mutex<RefCell<Option<App>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(config::SYSCLK_HZ.Hz()).freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);

    // USART3 (ST-LINK VCP)
    let usart_cfg = Config {
        baud_rate: config::CONSOLE_BAUD.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        usart_cfg,
    );
    let (mut usart, rx) = Usart::split(serial);
    let _ = logger::init(config::LOG_LEVEL);
    info!("gesture motor ready, send `init` or `help`");

    // The LCD stays with the main loop; redraws run with interrupts enabled.
    let delay = Delay::new(cp.SYST, clocks.sysclk().raw());
    let mut lcd = Hd44780::new(pins.lcd, delay);
    let timers = Timers {
        tim1: dp.TIM1,
        tim2: dp.TIM2,
        tim3: dp.TIM3,
    };
    match App::new(
        config::SAMPLER,
        clocks,
        timers,
        pins.stepper,
        Led::active_high(pins.led),
    ) {
        Ok(app) => free(|cs| {
            APP.borrow(cs).replace(Some(app));
        }),
        Err(e) => error!("{}", e),
    }

    unsafe { NVIC::unmask(pac::Interrupt::TIM2) };
    console::attach_rx(rx);

    let mut parser = LineParser::new();
    loop {
        while let Some(byte) = console::read_byte() {
            match parser.push(byte) {
                Some(Ok(cmd)) => {
                    free(|cs| {
                        if let Some(app) = APP.borrow(cs).borrow_mut().as_mut() {
                            let _ = app.handle(cmd);
                        }
                    });
                    draw(&mut lcd);
                }
                Some(Err(e)) => warn!("{}", e),
                None => {}
            }
        }

        let lost = console::take_rx_lost();
        if lost > 0 {
            warn!("console input lost {} bytes", lost);
        }

        draw(&mut lcd);
        console::drain(&mut usart);
    }
}

/// Take the pending screen updates under the lock and draw them after releasing it.
fn draw(lcd: &mut Hd44780) {
    let ops = free(|cs| {
        APP.borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(App::take_display_ops)
    });
    if let Some(ops) = ops {
        for op in ops.iter() {
            op.apply(lcd);
        }
    }
}

#[interrupt]
fn USART3() {
    console::on_rx_interrupt();
}

#[interrupt]
fn TIM2() {
    free(|cs| {
        if let Some(app) = APP.borrow(cs).borrow_mut().as_mut() {
            app.on_sample_interrupt();
        }
    });
}
