// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Gesture Motor Firmware
//!
//! Board support and application for the gesture-controlled motor rig, targeting an STM32F767
//! (NUCLEO-F767ZI). A host script sends speed commands over the ST-LINK serial port; the board
//! drives a stepper and a DC motor from TIM1 and reports the measured speed every 500 ms on a 16x2
//! LCD. The sampling logic itself lives in the `motor_rpm` crate.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around USART, timers, GPIO |
//! | [`drivers`] | Device-level drivers (HD44780) |
//! | [`app`] | Command handling and per-interval publishing |
//! | [`console`] | Interrupt-safe console queues |
//! | [`logger`] | `log` backend on the console USART |
//! | [`config`] | Board constants |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board (from this directory, so `.cargo/config.toml` picks the target):
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod app;
pub mod config;
pub mod console;
pub mod drivers;
pub mod hw;
pub mod logger;
