/*
A live log for command line tools: status lines that stay in place on the terminal and can be
grown, replaced, or have new lines spliced in around them, while fresh lines keep appending below.

Redraws are cursor-relative. Nothing addresses absolute rows, so the log has to know exactly how
many rows everything below an edited message occupies:
    Message store: ordered messages, lookup by id from newest to oldest
    Cursor: "up n rows" and "clear line, column 0", the only control sequences emitted
    Render: rewind over a tail of messages, then reprint that tail
    Replay: decode what was written and play it on a screen model, for checking the above
*/
mod cursor;
mod error;
mod insertion_log;
mod render;
pub mod replay;
mod shared;
mod store;

pub use cursor::{clear_line_and_home, move_cursor_up, ClearLineAndHome, CursorUp};
pub use error::{InsertionLogError, Result};
pub use insertion_log::InsertionLog;
pub use shared::SharedInsertionLog;
pub use store::{Message, MessageStore};
