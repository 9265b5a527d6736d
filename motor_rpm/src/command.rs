// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial command shell.
//!
//! The gesture host sends one ASCII command per line, e.g. `dcchangespeed 40\n`. Bytes are fed to
//! [`LineParser::push`] as they arrive from the USART; a complete line yields a [`Command`].

use core::fmt;

use heapless::Vec;

use crate::display::{self, Line};
use crate::mode::MotorMode;

/// Longest accepted line, terminator excluded.
pub const MAX_LINE: usize = 32;

/// Commands and their one-line help.
pub const HELP: &[(&str, &str)] = &[
    ("init [stepper|dc]", "Initialize peripherals and start sampling"),
    ("stop", "Stop motor rotation and sampling"),
    ("stepperstart", "Enable the stepper output"),
    ("dcstart", "Enable the DC motor output"),
    ("stepperchangespeed <0-100>", "Set stepper speed in percent"),
    ("dcchangespeed <0-100>", "Set DC motor duty in percent"),
    ("lcd <row> <text>", "Write text on an LCD row"),
    ("lcdclear", "Clear the LCD"),
    ("lcddisplay", "Show the current speed on the LCD"),
    ("help", "List commands"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Bring up peripherals and start the sampler, optionally choosing the motor.
    Init(Option<MotorMode>),
    Stop,
    /// Enable the stepper driver and step output. Already on after `init`.
    StepperStart,
    /// Enable the DC motor PWM output. Already on after `init`.
    DcStart,
    StepperSpeed(u8),
    DcSpeed(u8),
    Lcd { row: u8, text: Line },
    LcdClear,
    LcdDisplay,
    Help,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown,
    MissingArgument,
    InvalidArgument,
    LineTooLong,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandError::Empty => "empty command",
            CommandError::Unknown => "unknown command",
            CommandError::MissingArgument => "missing argument",
            CommandError::InvalidArgument => "invalid argument",
            CommandError::LineTooLong => "line too long",
        })
    }
}

/// Parse one line without its terminator.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }

    let (name, rest) = match line.split_once(' ') {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    };

    match name {
        "init" => match rest {
            "" => Ok(Command::Init(None)),
            arg => MotorMode::from_arg(arg)
                .map(|m| Command::Init(Some(m)))
                .ok_or(CommandError::InvalidArgument),
        },
        "stop" => Ok(Command::Stop),
        "stepperstart" => Ok(Command::StepperStart),
        "dcstart" => Ok(Command::DcStart),
        "stepperchangespeed" => percent(rest).map(Command::StepperSpeed),
        "dcchangespeed" => percent(rest).map(Command::DcSpeed),
        "lcd" => {
            let (row, text) = rest.split_once(' ').unwrap_or((rest, ""));
            if row.is_empty() {
                return Err(CommandError::MissingArgument);
            }
            let row: u8 = row.parse().map_err(|_| CommandError::InvalidArgument)?;
            if row >= display::ROWS {
                return Err(CommandError::InvalidArgument);
            }
            Ok(Command::Lcd {
                row,
                text: display::line(text),
            })
        }
        "lcdclear" => Ok(Command::LcdClear),
        "lcddisplay" => Ok(Command::LcdDisplay),
        "help" => Ok(Command::Help),
        _ => Err(CommandError::Unknown),
    }
}

fn percent(arg: &str) -> Result<u8, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument);
    }
    match arg.parse::<u8>() {
        Ok(p) if p <= 100 => Ok(p),
        _ => Err(CommandError::InvalidArgument),
    }
}

/// Accumulates bytes into lines.
pub struct LineParser {
    buf: Vec<u8, MAX_LINE>,
    overflow: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Process a single incoming byte. Returns a result once a non-empty line is complete.
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, CommandError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let result = if self.overflow {
                    Some(Err(CommandError::LineTooLong))
                } else {
                    match core::str::from_utf8(&self.buf) {
                        Ok(s) if s.trim().is_empty() => None,
                        Ok(s) => Some(parse(s)),
                        Err(_) => Some(Err(CommandError::Unknown)),
                    }
                };
                self.buf.clear();
                self.overflow = false;
                result
            }
            b => {
                if self.buf.push(b).is_err() {
                    self.overflow = true;
                }
                None
            }
        }
    }

    /// Bytes of the line received so far.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut LineParser, bytes: &[u8]) -> Option<Result<Command, CommandError>> {
        let mut last = None;
        for &b in bytes {
            if let Some(r) = parser.push(b) {
                last = Some(r);
            }
        }
        last
    }

    #[test]
    fn lifecycle_commands() {
        assert_eq!(parse("init"), Ok(Command::Init(None)));
        assert_eq!(parse("init dc"), Ok(Command::Init(Some(MotorMode::DcMotor))));
        assert_eq!(
            parse("init  stepper"),
            Ok(Command::Init(Some(MotorMode::Stepper)))
        );
        assert_eq!(parse("init bldc"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("stop"), Ok(Command::Stop));
    }

    #[test]
    fn output_start_commands() {
        assert_eq!(parse("stepperstart"), Ok(Command::StepperStart));
        assert_eq!(parse("dcstart"), Ok(Command::DcStart));
        assert_eq!(parse("dcstart now"), Ok(Command::DcStart));
        assert_eq!(parse("dcstarts"), Err(CommandError::Unknown));
    }

    #[test]
    fn host_startup_sequence_parses() {
        let mut p = LineParser::new();
        let mut got = Vec::<Command, 4>::new();
        for &b in b"init
stepperstart
dcstart
".iter() {
            match p.push(b) {
                Some(Ok(cmd)) => got.push(cmd).unwrap(),
                Some(Err(e)) => panic!("rejected: {}", e),
                None => {}
            }
        }
        assert_eq!(
            got.as_slice(),
            &[Command::Init(None), Command::StepperStart, Command::DcStart]
        );
    }

    #[test]
    fn every_help_entry_parses() {
        for (usage, _) in HELP {
            let name = usage.split(' ').next().unwrap();
            assert_ne!(parse(name), Err(CommandError::Unknown), "{}", name);
        }
    }

    #[test]
    fn speed_commands() {
        assert_eq!(parse("stepperchangespeed 40"), Ok(Command::StepperSpeed(40)));
        assert_eq!(parse("dcchangespeed 0"), Ok(Command::DcSpeed(0)));
        assert_eq!(parse("dcchangespeed 100"), Ok(Command::DcSpeed(100)));
        assert_eq!(parse("dcchangespeed 101"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("dcchangespeed -1"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("stepperchangespeed"), Err(CommandError::MissingArgument));
    }

    #[test]
    fn direction_commands_are_not_supported() {
        assert_eq!(parse("dcchangedirection 1"), Err(CommandError::Unknown));
        assert_eq!(parse("stepperchangedirection 0"), Err(CommandError::Unknown));
    }

    #[test]
    fn lcd_commands() {
        assert_eq!(
            parse("lcd 1 hello world"),
            Ok(Command::Lcd {
                row: 1,
                text: display::line("hello world")
            })
        );
        assert_eq!(parse("lcd 2 nope"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("lcd"), Err(CommandError::MissingArgument));
        assert_eq!(parse("lcdclear"), Ok(Command::LcdClear));
        assert_eq!(parse("lcddisplay"), Ok(Command::LcdDisplay));
    }

    #[test]
    fn parser_handles_crlf_and_blank_lines() {
        let mut p = LineParser::new();
        assert_eq!(feed(&mut p, b"\r\n\n"), None);
        assert_eq!(feed(&mut p, b"stop\r\n"), Some(Ok(Command::Stop)));
        assert!(p.pending().is_empty());
    }

    #[test]
    fn parser_yields_one_command_per_line() {
        let mut p = LineParser::new();
        let mut got = Vec::<Command, 4>::new();
        for &b in b"init dc\ndcchangespeed 25\n".iter() {
            if let Some(Ok(cmd)) = p.push(b) {
                got.push(cmd).unwrap();
            }
        }
        assert_eq!(
            got.as_slice(),
            &[Command::Init(Some(MotorMode::DcMotor)), Command::DcSpeed(25)]
        );
    }

    #[test]
    fn overlong_line_is_rejected_and_parser_recovers() {
        let mut p = LineParser::new();
        let long = [b'x'; MAX_LINE + 5];
        assert_eq!(feed(&mut p, &long), None);
        assert_eq!(p.push(b'\n'), Some(Err(CommandError::LineTooLong)));
        assert_eq!(feed(&mut p, b"help\n"), Some(Ok(Command::Help)));
    }

    #[test]
    fn errors_render_for_the_console() {
        let mut s: heapless::String<24> = heapless::String::new();
        fmt::write(&mut s, format_args!("{}", CommandError::LineTooLong)).unwrap();
        assert_eq!(s.as_str(), "line too long");
    }
}
