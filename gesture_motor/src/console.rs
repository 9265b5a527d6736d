// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-safe console queues.
//!
//! Nothing here blocks inside a critical section. Output (log records, command replies) is copied
//! into [`TX_CAPACITY`] bytes of RAM and sent by the main loop through [`drain`]. Input is moved
//! byte by byte from the USART into [`RX_CAPACITY`] bytes of RAM by the `USART3` handler, so a
//! slow LCD redraw or a long help listing cannot overrun the receiver.
//!
//! ```text
//!   log!/write_parts ──▶ TX ──drain()──▶ USART3 TDR
//!   USART3 RDR ──on_rx_interrupt()──▶ RX ──read_byte()──▶ LineParser
//! ```

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::NVIC;
use heapless::{Deque, Vec};
use stm32f7xx_hal::pac;

use crate::config::ConsoleUsart;
use crate::hw::{Usart, UsartRx};

pub const TX_CAPACITY: usize = 1024;
pub const RX_CAPACITY: usize = 64;

/// Bytes moved out of the transmit queue per critical section.
const DRAIN_CHUNK: usize = 32;

struct TxQueue {
    bytes: Deque<u8, TX_CAPACITY>,
    /// Writes refused because they did not fit.
    dropped: u32,
}

impl TxQueue {
    const fn new() -> Self {
        Self {
            bytes: Deque::new(),
            dropped: 0,
        }
    }

    /// Append all of `parts` or none of them, so records never tear.
    fn push_parts(&mut self, parts: &[&str]) -> bool {
        let len: usize = parts.iter().map(|p| p.len()).sum();
        if self.bytes.capacity() - self.bytes.len() < len {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        for &b in parts.iter().flat_map(|p| p.as_bytes()) {
            let _ = self.bytes.push_back(b);
        }
        true
    }
}

struct RxQueue {
    bytes: Deque<u8, RX_CAPACITY>,
    /// Bytes lost to a full queue or a framing, noise, parity or overrun error.
    lost: u32,
}

impl RxQueue {
    const fn new() -> Self {
        Self {
            bytes: Deque::new(),
            lost: 0,
        }
    }
}

static TX: Mutex<RefCell<TxQueue>> = Mutex::new(RefCell::new(TxQueue::new()));
static RX: Mutex<RefCell<RxQueue>> = Mutex::new(RefCell::new(RxQueue::new()));
static RX_PORT: Mutex<RefCell<Option<UsartRx<ConsoleUsart>>>> = Mutex::new(RefCell::new(None));

/// Queue `parts` back to back for transmission. Returns `false` if the queue had no room; the
/// write is dropped whole and counted.
pub fn write_parts(parts: &[&str]) -> bool {
    interrupt::free(|cs| TX.borrow(cs).borrow_mut().push_parts(parts))
}

/// Queue `s` followed by CRLF.
#[inline]
pub fn println(s: &str) -> bool {
    write_parts(&[s, "\r\n"])
}

/// Send everything queued so far on `usart`. Call from the main loop only.
///
/// Bytes leave the queue in short critical sections; the blocking writes happen with interrupts
/// enabled.
pub fn drain(usart: &mut Usart<ConsoleUsart>) {
    loop {
        let chunk: Vec<u8, DRAIN_CHUNK> = interrupt::free(|cs| {
            let mut tx = TX.borrow(cs).borrow_mut();
            let mut chunk = Vec::new();
            while !chunk.is_full() {
                match tx.bytes.pop_front() {
                    Some(b) => {
                        let _ = chunk.push(b);
                    }
                    None => break,
                }
            }
            chunk
        });
        if chunk.is_empty() {
            break;
        }
        for b in chunk {
            usart.write_byte(b);
        }
    }

    let dropped = interrupt::free(|cs| core::mem::take(&mut TX.borrow(cs).borrow_mut().dropped));
    if dropped > 0 {
        let _ = write!(usart, "[WARN] console full, dropped {} writes\r\n", dropped);
    }
}

/// Hand the receive half to the `USART3` handler and enable the receive interrupt.
pub fn attach_rx(rx: UsartRx<ConsoleUsart>) {
    interrupt::free(|cs| RX_PORT.borrow(cs).replace(Some(rx)));

    // RXNEIE also raises the interrupt on overrun.
    let usart = unsafe { &*pac::USART3::ptr() };
    usart.cr1.modify(|_, w| w.rxneie().set_bit());
    unsafe { NVIC::unmask(pac::Interrupt::USART3) };
}

/// Body of the `USART3` handler: move every received byte into the queue.
pub fn on_rx_interrupt() {
    interrupt::free(|cs| {
        let mut port = RX_PORT.borrow(cs).borrow_mut();
        let Some(port) = port.as_mut() else {
            return;
        };
        let mut rx = RX.borrow(cs).borrow_mut();
        loop {
            match port.read() {
                Ok(b) => {
                    if rx.bytes.push_back(b).is_err() {
                        rx.lost = rx.lost.saturating_add(1);
                    }
                }
                Err(nb::Error::WouldBlock) => break,
                // Reading cleared the error flag; look again.
                Err(nb::Error::Other(_)) => rx.lost = rx.lost.saturating_add(1),
            }
        }
    });
}

/// Next received byte, if any.
pub fn read_byte() -> Option<u8> {
    interrupt::free(|cs| RX.borrow(cs).borrow_mut().bytes.pop_front())
}

/// Received bytes lost since the last call.
pub fn take_rx_lost() -> u32 {
    interrupt::free(|cs| core::mem::take(&mut RX.borrow(cs).borrow_mut().lost))
}
