// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. The screen buffer and terminal lifecycle
// call these; this module only knows the byte-level encoding.
//
// Cursor positions are 0-indexed in our API and converted to the 1-indexed
// form ANSI expects.
use std::io::{self, Write};

use crate::color::{ColorPair, Rgb};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Disable auto-wrap (DECAWM reset).
///
/// With wrap off, writing the last column of a row leaves the cursor there
/// instead of scrolling when it lands on the bottom-right cell.
#[inline]
pub fn disable_autowrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7l")
}

/// Re-enable auto-wrap (DECAWM set).
#[inline]
pub fn enable_autowrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7h")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set the 24-bit foreground color.
#[inline]
pub fn fg(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    write!(w, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// Set the 24-bit background color.
#[inline]
pub fn bg(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    write!(w, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

/// Foreground then background for one cell.
#[inline]
pub fn colors(w: &mut impl Write, pair: ColorPair) -> io::Result<()> {
    fg(w, pair.foreground)?;
    bg(w, pair.background)
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// The terminal buffers everything until [`end_sync`] so a frame never
/// shows half drawn. Terminals that don't know the mode ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Kitty Keyboard Protocol ────────────────────────────────────────────────

/// Push Kitty keyboard protocol enhancement flags.
///
/// - `1` disambiguate escape codes
/// - `2` report event types (press / repeat / release)
///
/// The editor needs both: release events are what let key state tell a tap
/// from a hold.
#[inline]
pub fn enable_kitty_keyboard(w: &mut impl Write, flags: u8) -> io::Result<()> {
    write!(w, "\x1b[>{flags}u")
}

/// Pop the Kitty keyboard enhancement pushed by [`enable_kitty_keyboard`].
#[inline]
pub fn disable_kitty_keyboard(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[<u")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
        assert_eq!(emit(|w| cursor_home(w)), "\x1b[H");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn screen_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
        assert_eq!(emit(|w| disable_autowrap(w)), "\x1b[?7l");
        assert_eq!(emit(|w| enable_autowrap(w)), "\x1b[?7h");
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn truecolor_fg_bg() {
        assert_eq!(emit(|w| fg(w, Rgb::new(1, 22, 255))), "\x1b[38;2;1;22;255m");
        assert_eq!(emit(|w| bg(w, Rgb::new(31, 31, 31))), "\x1b[48;2;31;31;31m");
    }

    #[test]
    fn colors_writes_fg_first() {
        let pair = ColorPair::new(Rgb::WHITE, Rgb::BLACK);
        assert_eq!(
            emit(|w| colors(w, pair)),
            "\x1b[38;2;0;0;0m\x1b[48;2;255;255;255m"
        );
    }

    // ── Modes ───────────────────────────────────────────────────────────

    #[test]
    fn sync_and_alt_screen() {
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
    }

    #[test]
    fn kitty_keyboard_flags() {
        assert_eq!(emit(|w| enable_kitty_keyboard(w, 3)), "\x1b[>3u");
        assert_eq!(emit(|w| disable_kitty_keyboard(w)), "\x1b[<u");
    }
}
