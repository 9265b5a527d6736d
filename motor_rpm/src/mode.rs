// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Which motor the speed is reported for.

/// Motor types the board can drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotorMode {
    /// Open-loop stepper; speed follows the programmed step rate.
    Stepper,
    /// Brushed DC motor with a quadrature encoder.
    DcMotor,
}

impl MotorMode {
    /// Label shown on the display.
    pub fn label(self) -> &'static str {
        match self {
            MotorMode::Stepper => "Stepper Motor",
            MotorMode::DcMotor => "DC Motor",
        }
    }

    /// Parse the argument of the `init` command.
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stepper" => Some(MotorMode::Stepper),
            "dc" => Some(MotorMode::DcMotor),
            _ => None,
        }
    }
}

/// Holds the active motor mode. Chosen once at initialization; there is no runtime switching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotorModeSelector {
    current_mode: MotorMode,
}

impl MotorModeSelector {
    pub const fn new(mode: MotorMode) -> Self {
        Self { current_mode: mode }
    }

    #[inline]
    pub fn mode(&self) -> MotorMode {
        self.current_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_arguments() {
        assert_eq!(MotorMode::from_arg("dc"), Some(MotorMode::DcMotor));
        assert_eq!(MotorMode::from_arg("stepper"), Some(MotorMode::Stepper));
        assert_eq!(MotorMode::from_arg("servo"), None);
    }

    #[test]
    fn labels_fit_one_lcd_row() {
        for mode in [MotorMode::Stepper, MotorMode::DcMotor] {
            assert!(mode.label().len() <= 16);
        }
    }
}
