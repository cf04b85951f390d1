//! # corde-editor — editor core for corde
//!
//! The document/cursor model and the frame compositor:
//!
//! - **[`position`]** — `Position` (line, col), 0-indexed
//! - **[`document`]** — raw text in a rope, its display-line index, edits
//! - **[`cursor`]** — wrapping horizontal moves, preferred column
//! - **[`camera`]** — the scrolled window onto the document
//! - **[`settings`]** — colors and layout knobs, `key=value` overrides
//! - **[`input`]** — per-frame key states from terminal key events
//! - **[`style`]** — prepared lines, gutter numbers, cursor glyph
//! - **[`frame`]** — layer buffers composited into the front buffer
//! - **[`editor`]** — the `Editor` context the main loop drives
//!
//! Terminal I/O, colors and screen buffers come from `corde-term`.

pub mod camera;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod frame;
pub mod input;
pub mod position;
pub mod settings;
pub mod style;
