//! Styling — turns the document and cursor into colored symbols.
//!
//! Everything here is rebuilt from scratch every frame. One document char
//! always maps to one symbol, so a column in [`PreparedLines`] is the same
//! column the cursor uses.

use corde_term::buffer::{ScreenBuffer, char_width};
use corde_term::color::ColorPair;
use corde_term::symbol::Symbol;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::settings::EditorSettings;

/// One row of symbols per display line.
pub type PreparedLines = Vec<Vec<Symbol>>;

/// Shown in place of chars that don't fill exactly one cell: control
/// chars, zero-width marks, and wide CJK or emoji.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Columns needed for the line-number gutter: the digits of the largest
/// line number plus one separator column.
///
/// | Lines   | Gutter |
/// |---------|--------|
/// | 1–9     | 2      |
/// | 10–99   | 3      |
/// | 100–999 | 4      |
#[must_use]
pub fn gutter_width(line_count: usize) -> u16 {
    let digits = line_count.max(1).ilog10() + 1;
    // digits <= 20 for usize::MAX.
    u16::try_from(digits + 1).unwrap_or(u16::MAX)
}

/// The cell a document char is drawn as. Always exactly one column wide.
#[inline]
#[must_use]
pub fn display_char(ch: char) -> char {
    match ch {
        '\t' => ' ',
        c if c.is_control() || char_width(c) != 1 => REPLACEMENT,
        c => c,
    }
}

/// Style every display line of `doc`.
///
/// The cursor's line gets the active-line background, and the cell under
/// the cursor is drawn in the cursor colors. A cursor past the last char
/// gets a synthesized blank cell so it stays visible.
#[must_use]
pub fn prepare_lines(doc: &Document, cursor: &Cursor, settings: &EditorSettings) -> PreparedLines {
    let plain = ColorPair::new(settings.background, settings.text_fg);
    let active = plain.with_background(settings.active_line_bg());
    let cursor_color = ColorPair::new(settings.cursor_bg, settings.cursor_fg);

    let mut lines: PreparedLines = (0..doc.line_count())
        .map(|i| {
            let color = if i == cursor.line() { active } else { plain };
            doc.line(i)
                .map(|line| {
                    line.chars()
                        .map(|ch| Symbol::new(display_char(ch), color))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    if let Some(row) = lines.get_mut(cursor.line()) {
        match row.get_mut(cursor.col()) {
            Some(cell) => *cell = cell.with_color(cursor_color),
            None => row.push(Symbol::blank(cursor_color)),
        }
    }
    lines
}

/// Paint line numbers into `gutter`, one row per document line starting at
/// `first_line`. Rows past the end of the document stay background.
pub fn paint_gutter(
    gutter: &mut ScreenBuffer,
    first_line: usize,
    line_count: usize,
    active_line: usize,
    settings: &EditorSettings,
) {
    gutter.fill(Symbol::blank(ColorPair::solid(settings.background)));
    let digits = usize::from(gutter.width().saturating_sub(1));

    for row in 0..gutter.height() {
        let line = first_line + usize::from(row);
        if line >= line_count {
            break;
        }
        let fg = if line == active_line {
            settings.gutter_active_fg
        } else {
            settings.gutter_fg
        };
        let color = ColorPair::solid(settings.background).with_foreground(fg);
        let number = format!("{:>digits$}", line + 1);
        let symbols: Vec<Symbol> = number.chars().map(|ch| Symbol::new(ch, color)).collect();
        gutter.blit_symbols(&symbols, 0, row);
    }
}
