//! Frame compositor — builds one full frame from the editor state.
//!
//! A frame is assembled from three layers, each its own [`ScreenBuffer`],
//! and composited onto the front buffer with `blit`:
//!
//! ```text
//! ┌──────┬──────────────────────────┐
//! │gutter│ text (camera window)     │ ← text height rows
//! │      │                          │
//! ├──────┴──────────────────────────┤
//! │ status bar                      │ ← 1 row, optional
//! └─────────────────────────────────┘
//! ```
//!
//! The compositor owns the buffers and resizes them as the terminal or the
//! gutter width changes. Document, cursor and camera are passed in per
//! frame.

use std::io::{self, Write};

use corde_term::buffer::{ScreenBuffer, string_width, truncate_to_width};
use corde_term::color::ColorPair;
use corde_term::symbol::{Symbol, symbols};
use tracing::debug;

use crate::camera::Camera;
use crate::cursor::Cursor;
use crate::document::Document;
use crate::settings::EditorSettings;
use crate::style::{PreparedLines, gutter_width, paint_gutter, prepare_lines};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where each layer goes on a `width × height` screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub gutter_width: u16,
    pub text_width: u16,
    pub text_height: u16,
    /// Row of the status bar, if shown.
    pub status_row: Option<u16>,
}

impl Layout {
    #[must_use]
    pub fn compute(width: u16, height: u16, line_count: usize, settings: &EditorSettings) -> Self {
        let gutter = gutter_width(line_count).min(width);
        let status = settings.status_bar && height > 0;
        Self {
            gutter_width: gutter,
            text_width: width - gutter,
            text_height: if status { height - 1 } else { height },
            status_row: status.then(|| height - 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Owns the front buffer and the layer buffers composited onto it.
#[derive(Debug)]
pub struct Compositor {
    front: ScreenBuffer,
    gutter: ScreenBuffer,
    text: ScreenBuffer,
    status: ScreenBuffer,
}

impl Compositor {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            front: ScreenBuffer::new(width, height),
            gutter: ScreenBuffer::new(0, 0),
            text: ScreenBuffer::new(0, 0),
            status: ScreenBuffer::new(0, 0),
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.front.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.front.height()
    }

    /// The last composited frame.
    #[inline]
    #[must_use]
    pub const fn front(&self) -> &ScreenBuffer {
        &self.front
    }

    /// Recreate the front buffer at a new size. Returns `true` if the size
    /// changed.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if width == self.width() && height == self.height() {
            return false;
        }
        debug!(width, height, "front buffer resized");
        self.front = ScreenBuffer::new(width, height);
        true
    }

    /// Layout for the current size and document.
    #[must_use]
    pub fn layout(&self, line_count: usize, settings: &EditorSettings) -> Layout {
        Layout::compute(self.width(), self.height(), line_count, settings)
    }

    /// Build a full frame into the front buffer.
    pub fn compose(
        &mut self,
        doc: &Document,
        cursor: &Cursor,
        camera: Camera,
        settings: &EditorSettings,
    ) -> &ScreenBuffer {
        let layout = self.layout(doc.line_count(), settings);
        let lines = prepare_lines(doc, cursor, settings);

        ensure_size(&mut self.gutter, layout.gutter_width, layout.text_height);
        paint_gutter(
            &mut self.gutter,
            camera.y,
            doc.line_count(),
            cursor.line(),
            settings,
        );

        ensure_size(&mut self.text, layout.text_width, layout.text_height);
        assemble_view(&mut self.text, &lines, cursor, camera, settings);

        self.front.clear();
        self.gutter.blit(&mut self.front, 0, 0);
        self.text.blit(&mut self.front, layout.gutter_width, 0);

        if let Some(row) = layout.status_row {
            ensure_size(&mut self.status, self.front.width(), 1);
            paint_status(&mut self.status, doc, cursor, settings);
            self.status.blit(&mut self.front, 0, row);
        }

        &self.front
    }

    /// Write the front buffer to `w` in one write.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        self.front.render(w)
    }
}

fn ensure_size(buf: &mut ScreenBuffer, width: u16, height: u16) {
    if buf.width() != width || buf.height() != height {
        *buf = ScreenBuffer::new(width, height);
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Fill `text` with the camera's window onto `lines`.
///
/// The buffer is cleared to the background, the cursor's row (if visible)
/// is painted with the active-line background across its full width, then
/// prepared symbols are copied in. Rows and columns beyond the document are
/// left as background.
pub fn assemble_view(
    text: &mut ScreenBuffer,
    lines: &PreparedLines,
    cursor: &Cursor,
    camera: Camera,
    settings: &EditorSettings,
) {
    text.fill(Symbol::blank(ColorPair::solid(settings.background)));
    let (w, h) = (usize::from(text.width()), usize::from(text.height()));

    if let Some(row) = cursor
        .line()
        .checked_sub(camera.y)
        .filter(|&row| row < h)
        .and_then(|row| u16::try_from(row).ok())
    {
        let band = vec![Symbol::blank(ColorPair::solid(settings.active_line_bg())); w];
        text.blit_symbols(&band, 0, row);
    }

    for (row, line) in (0..text.height()).zip(lines.iter().skip(camera.y)) {
        let visible: Vec<Symbol> = line.iter().skip(camera.x).take(w).copied().collect();
        text.blit_symbols(&visible, 0, row);
    }
}

/// Status bar: file name on the left, position, line count and line ending
/// on the right. The left part is truncated first when space runs out.
pub fn paint_status(
    status: &mut ScreenBuffer,
    doc: &Document,
    cursor: &Cursor,
    settings: &EditorSettings,
) {
    let color = ColorPair::new(settings.bottom_bar, settings.text_fg);
    status.fill(Symbol::blank(color));
    let width = usize::from(status.width());

    let modified = if doc.is_modified() { " [+]" } else { "" };
    let left = format!(" {}{modified}", doc.display_name());
    let lines = doc.line_count();
    let plural = if lines == 1 { "" } else { "s" };
    let right = format!(
        " {}  {lines} line{plural}  {} ",
        cursor.position(),
        doc.line_ending()
    );

    let right = truncate_to_width(&right, width);
    let right_width = string_width(right);
    let left = truncate_to_width(&left, width - right_width);

    status.blit_symbols(&symbols(left, color), 0, 0);
    // right_width <= width <= u16::MAX.
    #[allow(clippy::cast_possible_truncation)]
    let right_x = (width - right_width) as u16;
    status.blit_symbols(&symbols(right, color), right_x, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use corde_term::color::Rgb;
    use pretty_assertions::assert_eq;

    fn compose(text: &str, pos: Position, camera: Camera, w: u16, h: u16) -> ScreenBuffer {
        let doc = Document::from_text(text);
        let mut c = Compositor::new(w, h);
        c.compose(&doc, &Cursor::at(pos), camera, &EditorSettings::default())
            .clone()
    }

    // -- Layout -------------------------------------------------------------

    #[test]
    fn layout_with_and_without_status() {
        let mut s = EditorSettings::default();
        assert_eq!(
            Layout::compute(20, 5, 12, &s),
            Layout {
                gutter_width: 3,
                text_width: 17,
                text_height: 4,
                status_row: Some(4),
            }
        );
        s.status_bar = false;
        let l = Layout::compute(20, 5, 12, &s);
        assert_eq!((l.text_height, l.status_row), (5, None));
    }

    #[test]
    fn layout_narrower_than_gutter() {
        let l = Layout::compute(1, 0, 100, &EditorSettings::default());
        assert_eq!((l.gutter_width, l.text_width, l.text_height), (1, 0, 0));
        assert_eq!(l.status_row, None);
    }

    // -- Composition --------------------------------------------------------

    #[test]
    fn gutter_text_and_status() {
        let front = compose("hello\nworld", Position::new(0, 0), Camera::new(), 24, 3);
        assert_eq!(front.row_text(0), format!("{:<24}", "1 hello"));
        assert_eq!(front.row_text(1), format!("{:<24}", "2 world"));
        // " [scratch]" loses its tail to the right-hand part.
        assert_eq!(front.row_text(2), " [scra 1:1  2 lines  LF ");
    }

    #[test]
    fn status_bar_layout() {
        let doc = Document::from_text("a\r\nb\r\nc");
        let mut status = ScreenBuffer::new(40, 1);
        paint_status(
            &mut status,
            &doc,
            &Cursor::at(Position::new(1, 0)),
            &EditorSettings::default(),
        );
        assert_eq!(
            status.row_text(0),
            format!("{:<20}{}", " [scratch]", " 2:1  3 lines  CRLF ")
        );
        assert_eq!(
            status.get(0, 0).map(|c| c.color.background),
            Some(Rgb::new(66, 66, 66))
        );
    }

    #[test]
    fn status_bar_truncates_left_first() {
        let doc = Document::from_text("x");
        let mut status = ScreenBuffer::new(12, 1);
        paint_status(&mut status, &doc, &Cursor::new(), &EditorSettings::default());
        // " 1:1  1 line  LF " is 17 wide: only its first 12 columns fit.
        assert_eq!(status.row_text(0), " 1:1  1 line");
    }

    #[test]
    fn camera_window_is_copied() {
        let text = "0123456789\nabcdefghij\nABCDEFGHIJ";
        let camera = Camera { x: 3, y: 1 };
        let front = compose(text, Position::new(2, 5), camera, 6, 3);
        // Gutter shows lines 2 and 3; text columns 3..7.
        assert_eq!(front.row_text(0), "2 defg");
        assert_eq!(front.row_text(1), "3 DEFG");
    }

    #[test]
    fn cursor_cell_and_active_band() {
        let s = EditorSettings::default();
        let front = compose("ab\ncd", Position::new(1, 2), Camera::new(), 8, 3);
        // Past-end cursor on "cd" at text column 2 → screen x 4.
        let cursor_cell = front.get(4, 1).copied();
        assert_eq!(cursor_cell.map(|c| c.color.background), Some(s.cursor_bg));
        // Band extends to the right edge.
        assert_eq!(
            front.get(7, 1).map(|c| c.color.background),
            Some(s.active_line_bg())
        );
        assert_eq!(front.get(7, 0).map(|c| c.color.background), Some(s.background));
    }

    #[test]
    fn nothing_transparent_reaches_front() {
        let front = compose("short", Position::ZERO, Camera::new(), 10, 4);
        for y in 0..4 {
            for x in 0..10 {
                assert!(front.get(x, y).is_some_and(|c| !c.transparent), "({x},{y})");
            }
        }
    }

    #[test]
    fn resize_reports_change() {
        let mut c = Compositor::new(10, 5);
        assert!(!c.resize(10, 5));
        assert!(c.resize(20, 5));
        assert_eq!((c.width(), c.height()), (20, 5));
    }

    #[test]
    fn zero_sized_frame_does_not_panic() {
        let front = compose("abc", Position::ZERO, Camera::new(), 0, 0);
        assert_eq!((front.width(), front.height()), (0, 0));
        let front = compose("abc", Position::ZERO, Camera::new(), 1, 1);
        assert_eq!(front.height(), 1);
    }
}
