use crossterm::{execute, Command};
use std::fmt;
use std::io::{self, Write};

/// `ESC [ n A`. Unlike [crossterm::cursor::MoveUp] the row count is not limited to `u16`.
///
/// A zero count still encodes as `ESC [ 0 A`, which most terminals read as "up one row". Use
/// [move_cursor_up] to get the zero-suppressing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorUp(pub usize);

impl Command for CursorUp {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1B[{}A", self.0)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "cursor movement requires an ANSI capable sink",
        ))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Erase the whole current line (`ESC [ 2 K`) and go to the first column (`ESC [ 0 G`).
///
/// crossterm's `MoveToColumn(0)` would encode as `ESC [ 1 G`, so the pair is written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearLineAndHome;

impl Command for ClearLineAndHome {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1B[2K\x1B[0G")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "line clearing requires an ANSI capable sink",
        ))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Moves the cursor up `rows` rows. Writes nothing at all when `rows` is zero.
pub fn move_cursor_up(output: &mut impl Write, rows: usize) -> io::Result<()> {
    if rows == 0 {
        return Ok(());
    }
    execute!(output, CursorUp(rows))
}

pub fn clear_line_and_home(output: &mut impl Write) -> io::Result<()> {
    execute!(output, ClearLineAndHome)
}
