//! Cursor — position tracking with wrapping horizontal movement and a
//! preferred column for vertical movement.
//!
//! The cursor is a plain value: a [`Position`] plus the column it would like
//! to return to. It does not own or reference the document; the document is
//! passed to each movement method.
//!
//! # Column range
//!
//! The column runs from 0 to the line's length inclusive. `col == len` is
//! the slot past the last character, where typing appends and where the
//! renderer draws a synthesized blank cursor cell.
//!
//! # Wrapping
//!
//! Left at column 0 continues at the end of the previous line; right at the
//! end of a line continues at column 0 of the next one. At the document's
//! first and last positions the move does nothing.
//!
//! # Preferred column
//!
//! Every horizontal move records the resulting column, even when it was a
//! no-op at a document edge. Vertical moves never change it: passing through
//! a short line clamps the column, and the next long line restores it.

use crate::document::Document;
use crate::position::Position;

/// A cursor in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,

    /// Column vertical moves try to return to.
    preferred_col: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            preferred_col: 0,
        }
    }

    /// A cursor at `pos`, preferring its column.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            preferred_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn preferred_col(&self) -> usize {
        self.preferred_col
    }

    // -- Direct positioning -------------------------------------------------

    /// Jump to `pos`, clamped to the document. Prefers the new column.
    pub fn set_position(&mut self, pos: Position, doc: &Document) {
        self.pos = doc.clamp(pos);
        self.preferred_col = self.pos.col;
    }

    /// Pull the cursor back inside the document after an edit. The
    /// preferred column is left alone.
    pub fn clamp(&mut self, doc: &Document) {
        self.pos = doc.clamp(self.pos);
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move one column in the direction of `delta`'s sign, wrapping across
    /// line boundaries. Only the sign matters; `0` does nothing.
    pub fn move_horizontal(&mut self, delta: isize, doc: &Document) {
        if delta == 0 {
            return;
        }
        self.clamp(doc);
        let Position { line, col } = self.pos;

        if delta < 0 {
            if col > 0 {
                self.pos.col -= 1;
            } else if line > 0 {
                self.pos = Position::new(line - 1, doc.line_len(line - 1));
            }
        } else if col < doc.line_len(line) {
            self.pos.col += 1;
        } else if line + 1 < doc.line_count() {
            self.pos = Position::new(line + 1, 0);
        }

        self.preferred_col = self.pos.col;
    }

    /// Column 0.
    pub const fn home(&mut self) {
        self.pos.col = 0;
        self.preferred_col = 0;
    }

    /// Past the last character of the line.
    pub fn end(&mut self, doc: &Document) {
        self.pos.col = doc.line_len(self.pos.line);
        self.preferred_col = self.pos.col;
    }

    // -- Vertical movement --------------------------------------------------

    /// Move one line in the direction of `delta`'s sign, landing on the
    /// preferred column or the end of a shorter line. Nothing happens at the
    /// first or last line.
    pub fn move_vertical(&mut self, delta: isize, doc: &Document) {
        let line = self.pos.line;
        let target = match delta.signum() {
            -1 if line > 0 => line - 1,
            1 if line + 1 < doc.line_count() => line + 1,
            _ => return,
        };
        self.pos = Position::new(target, self.preferred_col.min(doc.line_len(target)));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
