// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` backend on the console USART.
//!
//! Records are formatted as `[LEVEL] message` with CRLF and queued whole through
//! [`console::write_parts`], so output from the `TIM2` handler never interleaves with the main
//! loop and logging never waits on the UART. The main loop sends them with [`console::drain`].

use core::fmt::Write;

use heapless::String;
use log::{LevelFilter, Log, Metadata, Record};
use motor_rpm::{Error, Peripheral, Result};

use crate::console;

/// Longest record; the rest is cut.
const RECORD_LEN: usize = 96;

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install the logger. Can only succeed once.
pub fn init(level: LevelFilter) -> Result<()> {
    log::set_logger(&LOGGER).map_err(|_| Error::PeripheralInit(Peripheral::Console))?;
    log::set_max_level(level);
    Ok(())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line: String<RECORD_LEN> = String::new();
        let _ = write!(line, "[{}] {}", record.level(), record.args());
        console::write_parts(&[line.as_str(), "\r\n"]);
    }

    fn flush(&self) {}
}
