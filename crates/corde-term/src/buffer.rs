// SPDX-License-Identifier: MIT
//
// ScreenBuffer — a rectangular grid of Symbols.
//
// Every layer of a frame (gutter, text area, status bar, and the front
// buffer they are composited onto) is one of these. Layers are combined with
// `blit`, which copies every non-transparent symbol of one buffer onto
// another at an offset. That is the only compositing primitive; there is no
// blending and no damage tracking. The front buffer is serialized in full
// every frame.
//
// Design:
//
//   - Flat `Vec<Symbol>` with row-major indexing. A row is contiguous, so
//     left-to-right rendering is a linear scan.
//
//   - Every write is bounds-checked and silently dropped when outside the
//     grid. Reads outside return `None`. Nothing here panics on coordinates.
//
//   - Wide characters occupy their own cell plus the next one. The renderer
//     skips the shadowed cell so the grid never drifts; a wide character in
//     the last column has nowhere to spill and renders as a blank.

use std::io::{self, Write};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ansi;
use crate::output::OutputBuffer;
use crate::symbol::Symbol;

// ─── ScreenBuffer ────────────────────────────────────────────────────────────

/// A 2D grid of [`Symbol`]s.
///
/// # Examples
///
/// ```
/// use corde_term::buffer::ScreenBuffer;
/// use corde_term::color::ColorPair;
/// use corde_term::symbol::Symbol;
///
/// let mut buf = ScreenBuffer::new(80, 24);
/// assert!(buf.set(5, 3, Symbol::new('X', ColorPair::default())));
/// assert!(!buf.set(80, 0, Symbol::BLANK)); // clipped
/// assert_eq!(buf.get(5, 3).map(|s| s.ch), Some('X'));
/// assert!(buf.get(0, 24).is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ScreenBuffer {
    width: u16,
    height: u16,
    cells: Vec<Symbol>,
}

impl ScreenBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with transparent blanks.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Symbol::TRANSPARENT; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Buffer width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The symbol at `(x, y)`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Symbol> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// A single row, or `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Symbol]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of row `y` as a string. Handy for assertions.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| row.iter().map(|s| s.ch).collect())
            .unwrap_or_default()
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Write one symbol. Out-of-bounds writes are dropped.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, symbol: Symbol) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = symbol;
        true
    }

    /// Overwrite every cell with `symbol`.
    pub fn fill(&mut self, symbol: Symbol) {
        self.cells.fill(symbol);
    }

    /// Fill with the opaque black blank.
    pub fn clear(&mut self) {
        self.fill(Symbol::BLANK);
    }

    /// Back to the freshly-created state: every cell transparent.
    pub fn clear_transparent(&mut self) {
        self.fill(Symbol::TRANSPARENT);
    }

    /// Write a run of symbols left to right starting at `(x, y)`.
    ///
    /// Symbols that fall past the right edge are dropped; a row outside the
    /// buffer drops the whole run. Returns the number of symbols written.
    pub fn blit_symbols(&mut self, symbols: &[Symbol], x: u16, y: u16) -> usize {
        if y >= self.height || x >= self.width {
            return 0;
        }
        let room = usize::from(self.width - x);
        let n = symbols.len().min(room);
        let start = self.index(x, y);
        self.cells[start..start + n].copy_from_slice(&symbols[..n]);
        n
    }

    // ─── Compositing ─────────────────────────────────────────────────────

    /// Copy every non-transparent symbol of `self` onto `dest`, with this
    /// buffer's origin placed at `(x, y)`.
    ///
    /// Clipped to `dest`. A source whose origin lies beyond `dest` copies
    /// nothing.
    pub fn blit(&self, dest: &mut Self, x: u16, y: u16) {
        if x >= dest.width || y >= dest.height {
            return;
        }
        let cols = self.width.min(dest.width - x);
        let rows = self.height.min(dest.height - y);

        for sy in 0..rows {
            let src = self.index(0, sy);
            let dst = dest.index(x, y + sy);
            for sx in 0..usize::from(cols) {
                let symbol = self.cells[src + sx];
                if !symbol.transparent {
                    dest.cells[dst + sx] = symbol;
                }
            }
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Serialize the whole grid into `out`.
    ///
    /// Layout: begin-sync, home, rows joined by `\r\n` (no trailing newline),
    /// home, end-sync. Each opaque cell is `<fg><bg><ch><reset>`; transparent
    /// cells are a bare blank in default colors.
    ///
    /// # Errors
    ///
    /// Only propagates errors from `out`, which cannot fail for an
    /// [`OutputBuffer`].
    pub fn render_to(&self, out: &mut OutputBuffer) -> io::Result<()> {
        ansi::begin_sync(out)?;
        ansi::cursor_home(out)?;

        for y in 0..self.height {
            if y > 0 {
                out.write_all(b"\r\n")?;
            }
            let row = &self.cells[self.index(0, y)..self.index(0, y) + usize::from(self.width)];
            let mut x = 0;
            while x < row.len() {
                let symbol = row[x];
                if symbol.transparent {
                    out.write_all(b" ")?;
                    x += 1;
                    continue;
                }

                let width = symbol.ch.width();
                let fits = match width {
                    Some(1) => true,
                    Some(2) => x + 1 < row.len(),
                    _ => false,
                };

                ansi::colors(out, symbol.color)?;
                if fits {
                    out.push_char(symbol.ch);
                } else {
                    out.push_char(' ');
                }
                ansi::reset(out)?;

                x += if fits && width == Some(2) { 2 } else { 1 };
            }
        }

        ansi::cursor_home(out)?;
        ansi::end_sync(out)
    }

    /// Render the grid and hand it to `w` in a single `write_all` + `flush`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        let mut out = OutputBuffer::with_capacity(self.cells.len() * 40 + 32);
        self.render_to(&mut out)?;
        out.flush_to(w)
    }
}

impl std::fmt::Debug for ScreenBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScreenBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// 0 for control characters, 1 for most characters, 2 for wide ones.
///
/// ```
/// use corde_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
#[inline]
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.width()
}

/// The longest prefix of `s` that fits in `max` columns, cut on grapheme
/// boundaries so a combining sequence is never split.
///
/// ```
/// use corde_term::buffer::truncate_to_width;
///
/// assert_eq!(truncate_to_width("hello", 3), "hel");
/// assert_eq!(truncate_to_width("a中b", 2), "a");
/// assert_eq!(truncate_to_width("short", 80), "short");
/// ```
#[must_use]
pub fn truncate_to_width(s: &str, max: usize) -> &str {
    let mut used = 0;
    for (i, g) in s.grapheme_indices(true) {
        let w = g.width();
        if used + w > max {
            return &s[..i];
        }
        used += w;
    }
    s
}

// ─── Tests ───────────────────────────────────────────────────────────────────
