// SPDX-License-Identifier: MIT
//
// Terminal key parser.
//
// Turns raw stdin bytes into key events. Understands what `terminal.rs`
// asks the terminal to send:
//
// - Legacy CSI sequences (arrows, editing keys, function keys)
// - SS3 sequences (arrows and F1-F4 from some terminals)
// - Kitty keyboard protocol: `CSI codepoint ; modifiers : event u`, and the
//   `: event` sub-parameter on legacy finals, which is how releases arrive
// - Alt+key (ESC followed by a printable byte)
// - UTF-8 multi-byte characters
//
// The parser keeps a small byte buffer because a sequence can be split
// across two reads. Feed bytes with [`Parser::advance`]. A lone ESC stays
// pending until more bytes arrive or [`Parser::flush`] resolves it as the
// Escape key.

use bitflags::bitflags;
use tracing::trace;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity, modifiers, and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[must_use]
    pub const fn press(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty(), KeyEventKind::Press)
    }

    /// A release of `code` with no modifiers.
    #[must_use]
    pub const fn release(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty(), KeyEventKind::Release)
    }

    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers, kind: KeyEventKind) -> Self {
        Self {
            code,
            modifiers,
            kind,
        }
    }
}

/// Press / repeat / release.
///
/// Only terminals speaking the Kitty protocol with event types report
/// `Repeat` and `Release`. Everything else arrives as `Press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F35.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the Kitty bitmask, which is also the xterm CSI encoding
    /// minus one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const HYPER = 0b0001_0000;
        const META  = 0b0010_0000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// ```
/// use corde_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut p = Parser::new();
/// assert_eq!(p.advance(b"a\x1b[A"), vec![
///     KeyEvent::press(KeyCode::Char('a')),
///     KeyEvent::press(KeyCode::Up),
/// ]);
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every complete event.
    ///
    /// Incomplete trailing sequences stay buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => {
                    trace!(bytes = ?&self.buf[pos..pos + n], "skipped unrecognized input");
                    pos += n;
                }
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys.
    ///
    /// Call when a read times out with bytes still pending: a lone ESC
    /// becomes the Escape key.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let (code, modifiers) = match byte {
                0x1B => (KeyCode::Escape, Modifiers::empty()),
                0x7F => (KeyCode::Backspace, Modifiers::empty()),
                b @ 0x01..=0x1A => (KeyCode::Char((b + b'a' - 1) as char), Modifiers::CTRL),
                b @ 0x20..=0x7E => (KeyCode::Char(b as char), Modifiers::empty()),
                _ => continue,
            };
            events.push(KeyEvent::new(code, modifiers, KeyEventKind::Press));
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────
//
// Each function reads from the front of `buf` and reports what it found and
// how many bytes it used.

enum Parsed {
    Event(KeyEvent, usize),
    Incomplete,
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => Parsed::Event(KeyEvent::press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(KeyEvent::press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(KeyEvent::press(KeyCode::Enter), 1),
        0x00 => Parsed::Event(ctrl(KeyCode::Char('@')), 1),
        b @ 0x01..=0x1A => Parsed::Event(ctrl(KeyCode::Char((b + b'a' - 1) as char)), 1),
        b @ 0x20..=0x7E => Parsed::Event(KeyEvent::press(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(
            KeyEvent::new(KeyCode::Escape, Modifiers::ALT, KeyEventKind::Press),
            2,
        ),
        b @ 0x20..=0x7E => Parsed::Event(
            KeyEvent::new(KeyCode::Char(b as char), Modifiers::ALT, KeyEventKind::Press),
            2,
        ),
        _ => Parsed::Event(KeyEvent::press(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Final byte is 0x40..=0x7E; parameters and intermediates sit in
    // 0x20..=0x3F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;

    // The second parameter carries `modifiers:event` for every form.
    let (modifiers, kind) = params
        .get(1)
        .map_or((Modifiers::empty(), KeyEventKind::Press), |p| {
            (decode_modifiers(p.0), decode_event_kind(p.1))
        });
    let first = params.first().map_or(0, |p| p.0);

    let code = match final_byte {
        b'~' => match first {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            15 => KeyCode::F(5),
            17..=21 => KeyCode::F(first_as_u8(first) - 11),
            23..=26 => KeyCode::F(first_as_u8(first) - 12),
            _ => return Parsed::Skip(consumed),
        },
        b'u' => kitty_codepoint_to_keycode(first),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => {
            return Parsed::Event(
                KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT, KeyEventKind::Press),
                consumed,
            );
        }
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(KeyEvent::new(code, modifiers, kind), consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(KeyEvent::press(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(KeyEvent::press(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, Modifiers::CTRL, KeyEventKind::Press)
}

/// `(value, colon sub-parameter)`.
struct CsiParam(u32, u32);

/// `1;5:3` → `[(1,0), (5,3)]`.
fn parse_csi_params(raw: &[u8]) -> Vec<CsiParam> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::with_capacity(4);
    let mut pos = 0;

    loop {
        let (main, next) = parse_u32_at(raw, pos);
        pos = next;

        let sub = if raw.get(pos) == Some(&b':') {
            let (v, n) = parse_u32_at(raw, pos + 1);
            pos = n;
            // Kitty may append further `:alternate` keys; ignore them.
            while pos < raw.len() && raw[pos] != b';' {
                pos += 1;
            }
            v
        } else {
            0
        };

        params.push(CsiParam(main, sub));

        if raw.get(pos) == Some(&b';') {
            pos += 1;
        } else {
            break;
        }
    }

    params
}

fn parse_u32_at(buf: &[u8], start: usize) -> (u32, usize) {
    let mut val: u32 = 0;
    let mut pos = start;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u32::from(buf[pos] - b'0'));
        pos += 1;
    }
    (val, pos)
}

#[allow(clippy::cast_possible_truncation)]
const fn first_as_u8(v: u32) -> u8 {
    v as u8
}

/// `1 + bitmask` → modifiers. Caps/Num Lock bits (64, 128) are dropped.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u32) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

const fn decode_event_kind(sub: u32) -> KeyEventKind {
    match sub {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    }
}

/// Kitty functional keys live in the Private Use Area from 57344.
fn kitty_codepoint_to_keycode(cp: u32) -> KeyCode {
    match cp {
        27 | 57344 => KeyCode::Escape,
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        127 | 57347 => KeyCode::Backspace,
        57348 => KeyCode::Insert,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        #[allow(clippy::cast_possible_truncation)]
        cp @ 57364..=57398 => KeyCode::F((cp - 57364 + 1) as u8),
        cp => char::from_u32(cp).map_or(KeyCode::Char('\u{FFFD}'), KeyCode::Char),
    }
}

const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
