// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod hd44780;

pub use hd44780::Hd44780;
