// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types for the sampling core.
//!
//! Wrap artifacts on the encoder are not errors; they surface as
//! [`SampleOutcome::Discarded`](crate::sampler::SampleOutcome::Discarded).

use core::fmt;

/// Result type for sampling operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced to the caller or operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Requested delay is zero or cannot be expressed on the sampling timer.
    InvalidInterval,
    /// A configuration value makes one of the speed formulas undefined.
    InvalidConfig(&'static str),
    /// A peripheral failed to come up during initialization.
    PeripheralInit(Peripheral),
    /// A motor or display command arrived before `init`.
    NotInitialized,
    /// `init` while the sampler is already running.
    AlreadyRunning,
}

/// Peripherals wired up by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    SampleTimer,
    Encoder,
    Pwm,
    Display,
    Console,
}

impl Peripheral {
    pub fn name(self) -> &'static str {
        match self {
            Peripheral::SampleTimer => "sample timer",
            Peripheral::Encoder => "encoder",
            Peripheral::Pwm => "pwm",
            Peripheral::Display => "display",
            Peripheral::Console => "console",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInterval => f.write_str("invalid sampling interval"),
            Error::InvalidConfig(what) => write!(f, "invalid config: {}", what),
            Error::PeripheralInit(p) => write!(f, "{} init failed", p.name()),
            Error::NotInitialized => f.write_str("not initialized, send init first"),
            Error::AlreadyRunning => f.write_str("already running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    #[test]
    fn display_names_the_failed_peripheral() {
        let mut s: String<32> = String::new();
        fmt::write(&mut s, format_args!("{}", Error::PeripheralInit(Peripheral::Encoder))).unwrap();
        assert_eq!(s.as_str(), "encoder init failed");
    }
}
