// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Speed text for a 16x2 character display.
//!
//! Rendering is kept apart from the LCD driver so the layout can be checked on the host:
//!
//! ```text
//! +----------------+
//! |DC Motor        |
//! |RPM: 120        |
//! +----------------+
//! ```

use heapless::String;

use crate::mode::MotorMode;
use crate::sampler::SpeedEstimate;

pub const COLUMNS: usize = 16;
pub const ROWS: u8 = 2;

/// Shown after `init` and `stop`.
pub const BANNER: &str = "Gesture Control";

/// One display row, always exactly [`COLUMNS`] characters.
pub type Line = String<COLUMNS>;

/// A character display. Updates are fire-and-forget.
pub trait TextDisplay {
    /// Power-on setup. Leaves the display cleared.
    fn init(&mut self);

    fn clear(&mut self);

    /// Write `text` at the start of `row`. Rows past the last one are ignored.
    fn write_line(&mut self, row: u8, text: &str);
}

/// Pad or cut `text` to a full row so stale characters are overwritten.
pub fn line(text: &str) -> Line {
    let mut out = Line::new();
    for c in text.chars().filter(|c| c.is_ascii()).take(COLUMNS) {
        let _ = out.push(c);
    }
    while out.len() < COLUMNS {
        let _ = out.push(' ');
    }
    out
}

/// Both rows of the speed screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedText {
    pub rows: [Line; 2],
}

impl SpeedText {
    /// Banner on the first row, second row blank.
    pub fn banner() -> Self {
        Self {
            rows: [line(BANNER), line("")],
        }
    }

    /// Speed screen for `mode`. `None` means nothing has been measured yet.
    pub fn for_estimate(mode: MotorMode, estimate: Option<SpeedEstimate>) -> Self {
        let mut buf = itoa::Buffer::new();
        let mut rpm: String<COLUMNS> = String::new();
        let _ = rpm.push_str("RPM: ");
        let _ = match estimate {
            Some(e) => rpm.push_str(buf.format(e.rpm)),
            None => rpm.push_str("--"),
        };

        let label = estimate.map(|e| e.mode).unwrap_or(mode).label();
        Self {
            rows: [line(label), line(&rpm)],
        }
    }

    /// Write both rows to `display`.
    pub fn show<D: TextDisplay>(&self, display: &mut D) {
        for (row, text) in self.rows.iter().enumerate() {
            display.write_line(row as u8, text);
        }
    }
}

/// A deferred display update.
///
/// Drawing on a parallel LCD takes milliseconds, so whoever owns the shared state queues these and
/// the display's owner applies them later, outside any critical section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayOp {
    Init,
    Clear,
    Line { row: u8, text: Line },
    Show(SpeedText),
}

impl DisplayOp {
    pub fn apply<D: TextDisplay>(&self, display: &mut D) {
        match self {
            DisplayOp::Init => display.init(),
            DisplayOp::Clear => display.clear(),
            DisplayOp::Line { row, text } => display.write_line(*row, text),
            DisplayOp::Show(text) => text.show(display),
        }
    }
}
