// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART console.
//!
//! The transmit half carries log output and command replies; the receive half feeds the command
//! parser. Both are used through the queues in [`crate::console`]. Line endings on output are CRLF.
//!
//! To access the terminal on the host machine, connect to the ST-LINK USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{self, Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

pub struct UsartRx<U: Instance> {
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    /// Split a configured serial port into the console writer and reader.
    pub fn split<PINS: Pins<U>>(serial: Serial<U, PINS>) -> (Self, UsartRx<U>) {
        let (tx, rx) = serial.split();
        (Self { tx }, UsartRx { rx })
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

impl<U: Instance> UsartRx<U> {
    /// Next received byte. Framing, noise, parity and overrun errors are reported once and their
    /// flag cleared.
    #[inline]
    pub fn read(&mut self) -> nb::Result<u8, serial::Error> {
        self.rx.read()
    }
}
