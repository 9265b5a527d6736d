// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! HD44780 16x2 character LCD, 4-bit parallel, write only.
//!
//! Timing is open loop (no busy flag reads) using the SysTick delay. Owned by the main loop; a
//! full redraw takes a few milliseconds and must not run with interrupts masked.

use cortex_m::delay::Delay;
use motor_rpm::display::{TextDisplay, COLUMNS, ROWS};
use stm32f7xx_hal::gpio::PinState;

use crate::hw::pins::LcdPins;

// Instructions
pub mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_INCREMENT: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM: u8 = 0x80;
}

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct Hd44780 {
    pins: LcdPins,
    delay: Delay,
}

#[inline]
fn level(bit: bool) -> PinState {
    if bit {
        PinState::High
    } else {
        PinState::Low
    }
}

impl Hd44780 {
    pub fn new(pins: LcdPins, delay: Delay) -> Self {
        Self { pins, delay }
    }

    pub fn set_cursor(&mut self, row: u8, col: u8) {
        let offset = ROW_OFFSETS[(row as usize).min(ROW_OFFSETS.len() - 1)];
        self.command(cmd::SET_DDRAM | (offset + col));
    }

    #[inline]
    pub fn command(&mut self, byte: u8) {
        self.write_byte(byte, false);
    }

    #[inline]
    pub fn data(&mut self, byte: u8) {
        self.write_byte(byte, true);
    }

    fn write_byte(&mut self, byte: u8, is_data: bool) {
        self.pins.rs.set_state(level(is_data));
        self.write_nibble(byte >> 4);
        self.write_nibble(byte & 0x0F);
        self.delay.delay_us(50);
    }

    fn write_nibble(&mut self, nibble: u8) {
        self.pins.d4.set_state(level(nibble & 0x1 != 0));
        self.pins.d5.set_state(level(nibble & 0x2 != 0));
        self.pins.d6.set_state(level(nibble & 0x4 != 0));
        self.pins.d7.set_state(level(nibble & 0x8 != 0));

        self.pins.en.set_high();
        self.delay.delay_us(1);
        self.pins.en.set_low();
        self.delay.delay_us(1);
    }
}

impl TextDisplay for Hd44780 {
    /// Power-on initialization by instruction, then 2 lines, display on, cursor off, cleared.
    fn init(&mut self) {
        self.pins.rs.set_low();
        self.pins.en.set_low();
        self.delay.delay_ms(50);

        // Force 8-bit mode three times, then switch to 4-bit.
        self.write_nibble(0x3);
        self.delay.delay_ms(5);
        self.write_nibble(0x3);
        self.delay.delay_us(150);
        self.write_nibble(0x3);
        self.delay.delay_us(150);
        self.write_nibble(0x2);
        self.delay.delay_us(150);

        self.command(cmd::FUNCTION_4BIT_2LINE);
        self.command(cmd::DISPLAY_ON);
        self.command(cmd::ENTRY_INCREMENT);
        self.clear();
    }

    fn clear(&mut self) {
        self.command(cmd::CLEAR);
        self.delay.delay_ms(2);
    }

    fn write_line(&mut self, row: u8, text: &str) {
        if row >= ROWS {
            return;
        }
        self.set_cursor(row, 0);
        for b in text.bytes().take(COLUMNS) {
            self.data(b);
        }
    }
}
