//! Editor settings — colors and layout knobs, plus the `key=value`
//! directive parser that overrides them.
//!
//! # Syntax
//!
//! | Syntax        | Effect                     |
//! |---------------|----------------------------|
//! | `key`         | Enable a boolean setting   |
//! | `nokey`       | Disable a boolean setting  |
//! | `key!`        | Toggle a boolean setting   |
//! | `key=value`   | Assign a value             |
//!
//! Booleans also accept `key=on` / `key=off`.
//!
//! # Settings
//!
//! | Full name      | Abbrev | Type  | Default     |
//! |----------------|--------|-------|-------------|
//! | `background`   | `bg`   | color | `#1f1f1f`   |
//! | `bottombar`    | `bb`   | color | `#424242`   |
//! | `foreground`   | `fg`   | color | `#ffffff`   |
//! | `gutter`       | `gu`   | color | `#999999`   |
//! | `gutteractive` | `ga`   | color | `#ffffff`   |
//! | `cursorbg`     | `cb`   | color | `#ffffff`   |
//! | `cursorfg`     | `cf`   | color | `#000000`   |
//! | `activescale`  | `as`   | float | `1.3`       |
//! | `statusbar`    | `sb`   | bool  | on          |
//! | `activeline`   | `al`   | bool  | on          |
//!
//! Colors are `#RRGGBB` or `#RGB`.

use corde_term::color::Rgb;
use tracing::debug;

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// One parsed override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `key`
    On(String),
    /// `nokey`
    Off(String),
    /// `key!`
    Toggle(String),
    /// `key=value`
    Assign(String, String),
}

/// Returns `true` if `name` is a boolean setting (full name or abbreviation).
#[must_use]
pub fn is_bool_setting(name: &str) -> bool {
    matches!(name, "statusbar" | "sb" | "activeline" | "al")
}

/// Returns `true` if `name` is a color setting (full name or abbreviation).
#[must_use]
pub fn is_color_setting(name: &str) -> bool {
    matches!(
        name,
        "background"
            | "bg"
            | "bottombar"
            | "bb"
            | "foreground"
            | "fg"
            | "gutter"
            | "gu"
            | "gutteractive"
            | "ga"
            | "cursorbg"
            | "cb"
            | "cursorfg"
            | "cf"
    )
}

/// Parse whitespace-separated directives, e.g. `bg=#000000 nostatusbar`.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only strip `no` from a known boolean, so a future setting whose name
    // starts with "no" is not misread.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_setting(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// EditorSettings
// ---------------------------------------------------------------------------

/// Every color and layout knob the renderer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Text area and gutter background.
    pub background: Rgb,
    /// Status bar background.
    pub bottom_bar: Rgb,
    /// Document text.
    pub text_fg: Rgb,
    /// Line numbers.
    pub gutter_fg: Rgb,
    /// The cursor line's number.
    pub gutter_active_fg: Rgb,
    pub cursor_bg: Rgb,
    pub cursor_fg: Rgb,
    /// Factor applied to `background` for the cursor's line.
    pub active_line_scale: f32,
    pub status_bar: bool,
    pub active_line: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            background: Rgb::new(31, 31, 31),
            bottom_bar: Rgb::new(66, 66, 66),
            text_fg: Rgb::WHITE,
            gutter_fg: Rgb::greyscale(0.6),
            gutter_active_fg: Rgb::WHITE,
            cursor_bg: Rgb::WHITE,
            cursor_fg: Rgb::BLACK,
            active_line_scale: 1.3,
            status_bar: true,
            active_line: true,
        }
    }
}

impl EditorSettings {
    /// Background of the cursor's line.
    #[must_use]
    pub fn active_line_bg(&self) -> Rgb {
        if self.active_line {
            self.background.lighten(self.active_line_scale)
        } else {
            self.background
        }
    }

    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// Returns a message naming the setting when it is unknown or the value
    /// does not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<(), String> {
        match directive {
            SetDirective::On(name) => *self.flag(name)? = true,
            SetDirective::Off(name) => *self.flag(name)? = false,
            SetDirective::Toggle(name) => {
                let flag = self.flag(name)?;
                *flag = !*flag;
            }
            SetDirective::Assign(name, value) => self.assign(name, value)?,
        }
        debug!(?directive, "setting applied");
        Ok(())
    }

    /// Apply every directive in `args`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn apply_all(&mut self, args: &str) -> Result<(), String> {
        parse_set(args).iter().try_for_each(|d| self.apply(d))
    }

    fn flag(&mut self, name: &str) -> Result<&mut bool, String> {
        match name {
            "statusbar" | "sb" => Ok(&mut self.status_bar),
            "activeline" | "al" => Ok(&mut self.active_line),
            _ if is_color_setting(name) || matches!(name, "activescale" | "as") => {
                Err(format!("{name}: not a boolean setting"))
            }
            _ => Err(format!("unknown setting: {name}")),
        }
    }

    fn color(&mut self, name: &str) -> Option<&mut Rgb> {
        Some(match name {
            "background" | "bg" => &mut self.background,
            "bottombar" | "bb" => &mut self.bottom_bar,
            "foreground" | "fg" => &mut self.text_fg,
            "gutter" | "gu" => &mut self.gutter_fg,
            "gutteractive" | "ga" => &mut self.gutter_active_fg,
            "cursorbg" | "cb" => &mut self.cursor_bg,
            "cursorfg" | "cf" => &mut self.cursor_fg,
            _ => return None,
        })
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), String> {
        if is_bool_setting(name) {
            let on = match value {
                "on" | "true" | "yes" | "1" => true,
                "off" | "false" | "no" | "0" => false,
                _ => return Err(format!("{name}: expected on or off, got {value:?}")),
            };
            *self.flag(name)? = on;
            return Ok(());
        }

        if matches!(name, "activescale" | "as") {
            let scale: f32 = value
                .parse()
                .map_err(|_| format!("{name}: expected a number, got {value:?}"))?;
            if !scale.is_finite() || scale < 0.0 {
                return Err(format!("{name}: must be a non-negative number"));
            }
            self.active_line_scale = scale;
            return Ok(());
        }

        let slot = self
            .color(name)
            .ok_or_else(|| format!("unknown setting: {name}"))?;
        *slot = Rgb::hex(value).ok_or_else(|| format!("{name}: expected #RRGGBB, got {value:?}"))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- parse_set_arg ------------------------------------------------------

    #[test]
    fn parse_forms() {
        assert_eq!(parse_set_arg("statusbar"), SetDirective::On("statusbar".into()));
        assert_eq!(parse_set_arg("nosb"), SetDirective::Off("sb".into()));
        assert_eq!(parse_set_arg("al!"), SetDirective::Toggle("al".into()));
        assert_eq!(
            parse_set_arg("bg=#000000"),
            SetDirective::Assign("bg".into(), "#000000".into())
        );
    }

    #[test]
    fn no_prefix_only_for_booleans() {
        assert_eq!(parse_set_arg("nonsense"), SetDirective::On("nonsense".into()));
    }

    #[test]
    fn parse_multiple() {
        assert_eq!(
            parse_set("  fg=#fff   nostatusbar "),
            vec![
                SetDirective::Assign("fg".into(), "#fff".into()),
                SetDirective::Off("statusbar".into()),
            ]
        );
        assert!(parse_set("").is_empty());
    }

    // -- defaults -----------------------------------------------------------

    #[test]
    fn defaults() {
        let s = EditorSettings::default();
        assert_eq!(s.background, Rgb::new(31, 31, 31));
        assert_eq!(s.bottom_bar, Rgb::new(66, 66, 66));
        assert_eq!(s.gutter_fg, Rgb::greyscale(0.6));
        assert_eq!(s.active_line_bg(), Rgb::new(40, 40, 40));
        assert!(s.status_bar);
    }

    // -- apply --------------------------------------------------------------

    #[test]
    fn apply_colors() {
        let mut s = EditorSettings::default();
        s.apply_all("bg=#102030 cursorfg=#f00").unwrap();
        assert_eq!(s.background, Rgb::new(0x10, 0x20, 0x30));
        assert_eq!(s.cursor_fg, Rgb::RED);
    }

    #[test]
    fn apply_booleans() {
        let mut s = EditorSettings::default();
        s.apply(&parse_set_arg("nostatusbar")).unwrap();
        assert!(!s.status_bar);
        s.apply(&parse_set_arg("sb!")).unwrap();
        assert!(s.status_bar);
        s.apply(&parse_set_arg("activeline=off")).unwrap();
        assert!(!s.active_line);
        assert_eq!(s.active_line_bg(), s.background);
    }

    #[test]
    fn apply_scale() {
        let mut s = EditorSettings::default();
        s.apply(&parse_set_arg("as=2")).unwrap();
        assert_eq!(s.active_line_bg(), Rgb::new(62, 62, 62));
        assert!(s.apply(&parse_set_arg("as=-1")).is_err());
        assert!(s.apply(&parse_set_arg("as=abc")).is_err());
    }

    #[test]
    fn apply_errors() {
        let mut s = EditorSettings::default();
        assert_eq!(
            s.apply(&parse_set_arg("wat=1")),
            Err("unknown setting: wat".to_string())
        );
        assert!(s.apply(&parse_set_arg("bg=blue")).is_err());
        assert!(s.apply(&parse_set_arg("bg")).is_err());
        assert!(s.apply(&parse_set_arg("sb=maybe")).is_err());
        assert_eq!(s, EditorSettings::default());
    }
}
