// SPDX-License-Identifier: MIT
//
// corde color model — 24-bit RGB with a foreground/background pair.
//
// Every cell on screen carries exactly one `ColorPair`. The editor derives
// its palette from a handful of base colors through three operations:
//
//   lighten(c, s)   scale each channel by `s`
//   greyscale(s)    a neutral grey at `255 * s`
//   contrast(c)     the photometric complement, halved
//
// All channel arithmetic saturates to [0, 255]. A scale that would push a
// channel past white lands on 255; a negative or NaN scale lands on 0. No
// operation can wrap.

use std::fmt;

use crate::ansi;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// A 24-bit sRGB color.
///
/// # Examples
///
/// ```
/// use corde_term::color::Rgb;
///
/// let bg = Rgb::new(31, 31, 31);
/// assert_eq!(bg.lighten(2.0), Rgb::new(62, 62, 62));
/// assert_eq!(Rgb::WHITE.lighten(1.5), Rgb::WHITE); // saturates
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const CYAN: Self = Self::new(0, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255);

    /// Create a color from 8-bit channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A neutral grey with every channel at `255 * scale`.
    ///
    /// `greyscale(0.0)` is black, `greyscale(1.0)` is white. Out-of-range
    /// scales saturate.
    #[must_use]
    pub fn greyscale(scale: f32) -> Self {
        let v = scale_channel(255, scale);
        Self::new(v, v, v)
    }

    /// Scale every channel by `scale`, saturating at 255.
    ///
    /// Despite the name this also darkens when `scale < 1.0`.
    #[must_use]
    pub fn lighten(self, scale: f32) -> Self {
        Self::new(
            scale_channel(self.r, scale),
            scale_channel(self.g, scale),
            scale_channel(self.b, scale),
        )
    }

    /// The photometric complement halved: `(255 - c) / 2` per channel.
    #[must_use]
    pub const fn contrast(self) -> Self {
        Self::new(
            (255 - self.r) / 2,
            (255 - self.g) / 2,
            (255 - self.b) / 2,
        )
    }

    /// Parse `#RGB` or `#RRGGBB` (the `#` is optional).
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let bytes = s.as_bytes();
        match bytes.len() {
            3 => {
                let r = parse_hex_digit(bytes[0])?;
                let g = parse_hex_digit(bytes[1])?;
                let b = parse_hex_digit(bytes[2])?;
                Some(Self::new(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            6 => Some(Self::new(
                parse_hex_byte(&bytes[0..2])?,
                parse_hex_byte(&bytes[2..4])?,
                parse_hex_byte(&bytes[4..6])?,
            )),
            _ => None,
        }
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

// ─── ColorPair ───────────────────────────────────────────────────────────────

/// Background and foreground of a single cell.
///
/// Displaying a pair produces the 24-bit SGR escapes that select it:
///
/// ```
/// use corde_term::color::{ColorPair, Rgb};
///
/// let pair = ColorPair::new(Rgb::BLACK, Rgb::WHITE);
/// assert_eq!(pair.to_string(), "\x1b[38;2;255;255;255m\x1b[48;2;0;0;0m");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorPair {
    pub background: Rgb,
    pub foreground: Rgb,
}

impl ColorPair {
    /// Create a pair from background and foreground.
    #[inline]
    #[must_use]
    pub const fn new(background: Rgb, foreground: Rgb) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Both layers the same color (a solid block when drawn as a blank).
    #[inline]
    #[must_use]
    pub const fn solid(color: Rgb) -> Self {
        Self::new(color, color)
    }

    /// Foreground `fg` over a black background.
    #[inline]
    #[must_use]
    pub const fn only_foreground(fg: Rgb) -> Self {
        Self::new(Rgb::BLACK, fg)
    }

    /// Background `bg` under a black foreground.
    #[inline]
    #[must_use]
    pub const fn only_background(bg: Rgb) -> Self {
        Self::new(bg, Rgb::BLACK)
    }

    /// Copy with a different background.
    #[inline]
    #[must_use]
    pub const fn with_background(self, background: Rgb) -> Self {
        Self { background, ..self }
    }

    /// Copy with a different foreground.
    #[inline]
    #[must_use]
    pub const fn with_foreground(self, foreground: Rgb) -> Self {
        Self { foreground, ..self }
    }
}

impl fmt::Debug for ColorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} on {:?}", self.foreground, self.background)
    }
}

impl fmt::Display for ColorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut esc = Vec::with_capacity(40);
        // Writing into a Vec cannot fail.
        let _ = ansi::colors(&mut esc, *self);
        f.write_str(&String::from_utf8_lossy(&esc))
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Multiply one channel by `scale`, clamped to `0..=255`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_channel(channel: u8, scale: f32) -> u8 {
    let v = f32::from(channel) * scale;
    if v.is_nan() {
        return 0;
    }
    // Safe: clamped into u8 range before truncation.
    v.clamp(0.0, 255.0) as u8
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
