// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motor RPM Sampling
//!
//! Hardware-independent core of the gesture motor firmware: a free-running sampling interval
//! built from a bounded hardware counter, and the per-interval speed estimate for a DC motor with
//! a quadrature encoder or an open-loop stepper.
//!
//! Peripherals are reached only through the traits in [`timer`] and [`display`], so everything
//! here runs on the host under `cargo test`.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`delay`] | Cyclic delay generator (full-range cycles + remainder) |
//! | [`sampler`] | Rotation sampler, wrap guard, RPM formulas |
//! | [`mode`] | Motor mode selector |
//! | [`monitor`] | Interrupt-facing composition of the above |
//! | [`config`] | Sampling and motor constants |
//! | [`drive`] | Speed set-point to timer register mapping |
//! | [`display`] | Speed text rendering for a character display |
//! | [`command`] | Line parser for the serial command shell |
//! | [`timer`] | Peripheral traits implemented by the firmware |
//! | [`error`] | Error types |
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod command;
pub mod config;
pub mod delay;
pub mod display;
pub mod drive;
pub mod error;
pub mod mode;
pub mod monitor;
pub mod sampler;
pub mod timer;

pub use config::SamplerConfig;
pub use delay::{CyclicDelay, DelayRequest, DelayState, TickOutcome};
pub use error::{Error, Peripheral, Result};
pub use mode::{MotorMode, MotorModeSelector};
pub use monitor::SpeedMonitor;
pub use sampler::{RotationSampler, SampleOutcome, SpeedEstimate};
