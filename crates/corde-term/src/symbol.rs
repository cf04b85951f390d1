// SPDX-License-Identifier: MIT
//
// Symbol — one terminal cell.
//
// A character, the colors it is drawn with, and a transparency flag.
// Transparency is all-or-nothing: a transparent symbol means "no paint" when
// one buffer is blitted onto another, and renders as a blank with terminal
// default colors if it ever reaches the screen. There is no alpha blending.

use std::fmt;

use crate::ansi;
use crate::color::{ColorPair, Rgb};

/// One character cell with its colors.
///
/// # Examples
///
/// ```
/// use corde_term::color::{ColorPair, Rgb};
/// use corde_term::symbol::Symbol;
///
/// let s = Symbol::new('a', ColorPair::only_foreground(Rgb::WHITE));
/// assert!(!s.transparent);
/// assert!(Symbol::TRANSPARENT.transparent);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub ch: char,
    pub color: ColorPair,
    pub transparent: bool,
}

impl Symbol {
    /// A transparent blank. Fresh buffers are filled with this.
    pub const TRANSPARENT: Self = Self {
        ch: ' ',
        color: ColorPair::solid(Rgb::BLACK),
        transparent: true,
    };

    /// An opaque blank, black on black.
    pub const BLANK: Self = Self::blank(ColorPair::solid(Rgb::BLACK));

    /// An opaque symbol.
    #[inline]
    #[must_use]
    pub const fn new(ch: char, color: ColorPair) -> Self {
        Self {
            ch,
            color,
            transparent: false,
        }
    }

    /// An opaque space in `color`.
    #[inline]
    #[must_use]
    pub const fn blank(color: ColorPair) -> Self {
        Self::new(' ', color)
    }

    /// Copy with different colors.
    #[inline]
    #[must_use]
    pub const fn with_color(self, color: ColorPair) -> Self {
        Self { color, ..self }
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// `<fg><bg><ch><reset>`, or a bare blank when transparent.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.transparent {
            return f.write_str(" ");
        }
        let mut esc = Vec::with_capacity(48);
        let _ = ansi::colors(&mut esc, self.color);
        f.write_str(&String::from_utf8_lossy(&esc))?;
        write!(f, "{}\x1b[0m", self.ch)
    }
}

/// Build a run of opaque symbols from `text`, all in one color.
///
/// ```
/// use corde_term::color::ColorPair;
/// use corde_term::symbol::symbols;
///
/// let run = symbols("ok", ColorPair::default());
/// assert_eq!(run.len(), 2);
/// assert_eq!(run[1].ch, 'k');
/// ```
#[must_use]
pub fn symbols(text: &str, color: ColorPair) -> Vec<Symbol> {
    text.chars().map(|ch| Symbol::new(ch, color)).collect()
}
