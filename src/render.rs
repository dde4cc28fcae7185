//! The two redraw primitives. Both work on a tail of the message buffer: `rewind` walks the
//! cursor back over the rows that tail occupies on screen, `reprint` paints it again from the
//! cursor down. A tail is always reprinted whole because rows below an edited message only have a
//! position by virtue of having been printed after it.

use crate::cursor::{clear_line_and_home, move_cursor_up};
use crate::store::Message;
use std::io::{self, Write};

/// Moves the cursor to the first row of `tail`, assuming it was the last thing printed.
pub fn rewind(output: &mut impl Write, tail: &[Message]) -> io::Result<()> {
    let rows: usize = tail.iter().map(Message::line_count).sum();
    log::trace!("Rewinding {} messages over {rows} rows", tail.len());
    move_cursor_up(output, rows)
}

/// Prints every physical line of `tail`, each on a freshly cleared row.
pub fn reprint(output: &mut impl Write, tail: &[Message]) -> io::Result<()> {
    for message in tail {
        for line in message.lines() {
            clear_line_and_home(output)?;
            output.write_all(line.as_bytes())?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
    }
    Ok(())
}
