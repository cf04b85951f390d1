//! Camera — the document-space window shown in the text area.
//!
//! `(x, y)` is the document coordinate drawn in the text area's top-left
//! cell. [`Camera::follow`] runs once per update, after cursor movement,
//! and scrolls by the minimal distance that brings the cursor back inside
//! a `width × height` window. For one-step cursor motion that is one row
//! or column per frame.

use tracing::trace;

use crate::cursor::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Camera {
    /// First visible column.
    pub x: usize,
    /// First visible line.
    pub y: usize,
}

impl Camera {
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Scroll so the cursor lies inside the viewport. Returns `true` when
    /// the camera moved.
    ///
    /// A zero-sized viewport has nowhere to put the cursor and leaves the
    /// camera untouched.
    pub fn follow(&mut self, cursor: &Cursor, width: usize, height: usize) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let before = *self;

        self.y = scroll_axis(self.y, cursor.line(), height);
        self.x = scroll_axis(self.x, cursor.col(), width);

        let moved = *self != before;
        if moved {
            trace!(x = self.x, y = self.y, "camera scrolled");
        }
        moved
    }

    /// Whether the document coordinate `(line, col)` is inside the viewport.
    #[must_use]
    pub const fn contains(&self, line: usize, col: usize, width: usize, height: usize) -> bool {
        line >= self.y && line < self.y + height && col >= self.x && col < self.x + width
    }
}

/// New origin on one axis so `target` lies in `[origin, origin + extent)`.
const fn scroll_axis(origin: usize, target: usize, extent: usize) -> usize {
    if target < origin {
        target
    } else if target + 1 > origin + extent {
        target + 1 - extent
    } else {
        origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn at(line: usize, col: usize) -> Cursor {
        Cursor::at(Position::new(line, col))
    }

    #[test]
    fn inside_viewport_does_not_scroll() {
        let mut cam = Camera::new();
        assert!(!cam.follow(&at(3, 5), 10, 5));
        assert_eq!(cam, Camera::new());
    }

    #[test]
    fn scrolls_down_one_row() {
        let mut cam = Camera::new();
        assert!(cam.follow(&at(5, 0), 10, 5));
        assert_eq!(cam.y, 1);
        assert!(cam.follow(&at(6, 0), 10, 5));
        assert_eq!(cam.y, 2);
    }

    #[test]
    fn scrolls_up_to_cursor() {
        let mut cam = Camera { x: 0, y: 10 };
        cam.follow(&at(9, 0), 10, 5);
        assert_eq!(cam.y, 9);
    }

    #[test]
    fn horizontal_follows_column() {
        let mut cam = Camera::new();
        cam.follow(&at(0, 12), 10, 5);
        assert_eq!(cam.x, 3);
        cam.follow(&at(0, 0), 10, 5);
        assert_eq!(cam.x, 0);
    }

    #[test]
    fn large_jump_is_contained() {
        let mut cam = Camera::new();
        let c = at(500, 77);
        cam.follow(&c, 20, 8);
        assert!(cam.contains(c.line(), c.col(), 20, 8));
        assert_eq!(cam, Camera { x: 58, y: 493 });
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut cam = Camera { x: 4, y: 4 };
        assert!(!cam.follow(&at(0, 0), 0, 5));
        assert!(!cam.follow(&at(0, 0), 5, 0));
        assert_eq!(cam, Camera { x: 4, y: 4 });
    }

    #[test]
    fn shrinking_viewport_recontains() {
        let mut cam = Camera::new();
        let c = at(20, 0);
        cam.follow(&c, 10, 30);
        assert_eq!(cam.y, 0);
        cam.follow(&c, 10, 5);
        assert!(cam.contains(20, 0, 10, 5));
        assert_eq!(cam.y, 16);
    }
}
