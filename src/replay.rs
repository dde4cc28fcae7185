//! Decoding of what an insertion log wrote back into terminal actions, and a minimal screen model
//! to replay them on. This is how the redraw arithmetic gets checked against what a terminal would
//! actually show.

use crate::replay::VteAction::{
    CarriageReturn, CursorColumn, CursorUp, EraseLine, LineFeed, Tab, Text,
};
use vte::{Params, Parser, Perform};

/// The semantic actions that can be taken as a result of bytes sent to the terminal.
///
/// Only what an insertion log can emit is recognized, everything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VteAction {
    Text(char),
    Tab,
    LineFeed,
    CarriageReturn,
    /// Rows to move up, a zero parameter already canonicalized to 1.
    ///
    /// vte saturates parameters at `u16::MAX`, so larger moves read as 65535 rows.
    CursorUp(u16),
    /// Raw `EL` mode: 0 right of the cursor, 1 left of it, 2 whole line.
    EraseLine(u16),
    /// Raw `CHA` parameter, 1-based with 0 meaning 1.
    CursorColumn(u16),
}

/// A wrapper over [Parser] and [Perform] which takes bytes in and exposes the semantic actions.
pub struct VteActionParser {
    parser: Parser,
}

impl Default for VteActionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VteActionParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Vec<VteAction> {
        let mut performer = Performer::new();
        for byte in bytes {
            self.parser.advance(&mut performer, *byte)
        }
        performer.actions
    }
}

struct Performer {
    actions: Vec<VteAction>,
}

impl Performer {
    fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl Perform for Performer {
    fn print(&mut self, c: char) {
        self.actions.push(Text(c))
    }

    fn execute(&mut self, byte: u8) {
        let action = match byte {
            9 => Tab,
            10 => LineFeed,
            13 => CarriageReturn,
            _ => return,
        };
        self.actions.push(action);
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, c: char) {
        if intermediates.is_empty() {
            let action = match c {
                'A' => CursorUp(params.first_nonzero_or(1)),
                'K' => EraseLine(params.first_or(0)),
                'G' => CursorColumn(params.first_or(0)),
                _ => return,
            };
            self.actions.push(action);
        }
    }
}

trait ParamsFirst {
    fn first_or(&self, default: u16) -> u16;
    fn first_nonzero_or(&self, default: u16) -> u16;
}

impl ParamsFirst for Params {
    fn first_or(&self, default: u16) -> u16 {
        self.iter()
            .next()
            .and_then(|x| x.first().copied())
            .unwrap_or(default)
    }

    fn first_nonzero_or(&self, default: u16) -> u16 {
        Some(self.first_or(default))
            .filter(|x| *x != 0)
            .unwrap_or(default)
    }
}

/// Compact one-line rendering of `bytes`: printable text verbatim, controls as `{name n}`.
pub fn describe(bytes: &[u8]) -> String {
    VteActionParser::new()
        .parse_bytes(bytes)
        .into_iter()
        .map(|action| match action {
            Text(c) => c.to_string(),
            Tab => "{tab}".to_owned(),
            LineFeed => "{lf}".to_owned(),
            CarriageReturn => "{cr}".to_owned(),
            CursorUp(n) => format!("{{up {n}}}"),
            EraseLine(n) => format!("{{el {n}}}"),
            CursorColumn(n) => format!("{{cha {n}}}"),
        })
        .collect()
}

/// An unbounded grid of rows with a cursor. No scrolling region, no wrapping.
///
/// A line feed also returns to the first column, the way a cooked tty translates `\n`. Cursor
/// moves above 65535 rows are clamped by the parser (see [VteAction::CursorUp]), so tails taller
/// than that can't be replayed faithfully.
#[derive(Default)]
pub struct Screen {
    rows: Vec<Vec<char>>,
    row: usize,
    col: usize,
    parser: VteActionParser,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and applies `bytes`. Escape sequences split across calls are handled.
    pub fn process(&mut self, bytes: &[u8]) {
        let actions = self.parser.parse_bytes(bytes);
        for action in actions {
            self.apply(action);
        }
    }

    pub fn apply(&mut self, action: VteAction) {
        match action {
            Text(c) => {
                let col = self.col;
                let row = self.row_mut();
                if row.len() <= col {
                    row.resize(col + 1, ' ');
                }
                row[col] = c;
                self.col += 1;
            }
            Tab => self.col = (self.col / 8 + 1) * 8,
            LineFeed => {
                self.row += 1;
                self.col = 0;
                if self.rows.len() < self.row {
                    self.rows.resize(self.row, Vec::new());
                }
            }
            CarriageReturn => self.col = 0,
            CursorUp(n) => self.row = self.row.saturating_sub(usize::from(n)),
            EraseLine(mode) => {
                let col = self.col;
                let row = self.row_mut();
                match mode {
                    0 => row.truncate(col),
                    1 => row
                        .iter_mut()
                        .take(col + 1)
                        .for_each(|cell| *cell = ' '),
                    _ => row.clear(),
                }
            }
            CursorColumn(n) => self.col = usize::from(n.max(1)) - 1,
        }
    }

    fn row_mut(&mut self) -> &mut Vec<char> {
        if self.rows.len() <= self.row {
            self.rows.resize(self.row + 1, Vec::new());
        }
        &mut self.rows[self.row]
    }

    /// Every row touched so far. Erased cells left of written text read as spaces.
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().collect()).collect()
    }

    pub fn cursor_row(&self) -> usize {
        self.row
    }

    pub fn cursor_col(&self) -> usize {
        self.col
    }

    /// The `count` rows directly above the cursor, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let lines = self.lines();
        let end = self.row.min(lines.len());
        lines[end.saturating_sub(count)..end].to_vec()
    }
}
