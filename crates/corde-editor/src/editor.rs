//! Editor — the top-level context that owns all editor state.
//!
//! One [`Editor`] owns the document, the cursor, the camera, the settings,
//! the input handler and the frame compositor. The main loop drives it with
//! two calls per frame:
//!
//! ```text
//! loop {
//!     editor.resize(w, h);   // terminal size, every frame
//!     editor.render(&mut out)?;
//!     editor.feed(events);   // whatever stdin produced
//!     editor.update();
//!     if editor.should_quit() { break }
//! }
//! ```
//!
//! # Key handling
//!
//! | Key              | State          | Effect                               |
//! |------------------|----------------|--------------------------------------|
//! | Escape           | down           | quit                                 |
//! | ← → ↑ ↓          | just released  | move the cursor                      |
//! | Home / End       | just released  | line start / end                     |
//! | printable char   | just pressed   | insert at cursor, advance            |
//! | Enter            | just pressed   | insert the document's line ending    |
//! | Backspace        | just pressed   | delete before cursor                 |
//! | Delete           | just pressed   | delete at cursor                     |
//!
//! Characters typed with Ctrl, Alt or Super held are ignored.

use std::io::{self, Write};
use std::path::Path;

use corde_term::buffer::ScreenBuffer;
use corde_term::input::{KeyCode, KeyEvent, Modifiers};
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::cursor::Cursor;
use crate::document::Document;
use crate::frame::Compositor;
use crate::input::{InputHandler, KeyState, printable};
use crate::settings::EditorSettings;

/// Owns everything the editor needs between frames.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    cursor: Cursor,
    camera: Camera,
    settings: EditorSettings,
    input: InputHandler,
    compositor: Compositor,
    quit: bool,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// An editor on `doc` drawing into a `width × height` screen.
    #[must_use]
    pub fn new(doc: Document, settings: EditorSettings, width: u16, height: u16) -> Self {
        Self {
            doc,
            cursor: Cursor::new(),
            camera: Camera::new(),
            settings,
            input: InputHandler::new(),
            compositor: Compositor::new(width, height),
            quit: false,
        }
    }

    /// Load `path` and open an editor on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn open(
        path: &Path,
        settings: EditorSettings,
        width: u16,
        height: u16,
    ) -> io::Result<Self> {
        Document::from_file(path).map(|doc| Self::new(doc, settings, width, height))
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.camera
    }

    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub const fn input(&self) -> &InputHandler {
        &self.input
    }

    #[inline]
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.quit
    }

    /// Width and height of the text area for the current document.
    #[must_use]
    pub fn viewport(&self) -> (usize, usize) {
        let layout = self.compositor.layout(self.doc.line_count(), &self.settings);
        (
            usize::from(layout.text_width),
            usize::from(layout.text_height),
        )
    }

    // -- Frame cycle --------------------------------------------------------

    /// Track the terminal size. Returns `true` when it changed.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        let changed = self.compositor.resize(width, height);
        if changed {
            self.follow_cursor();
        }
        changed
    }

    /// Queue key events for the coming updates.
    pub fn feed(&mut self, events: impl IntoIterator<Item = KeyEvent>) {
        self.input.feed(events);
    }

    /// Advance one frame: refresh key states, apply movement and edits,
    /// then scroll the camera to the cursor.
    pub fn update(&mut self) {
        self.input.update();

        if self.input.key_pressed(KeyCode::Escape) {
            debug!("escape pressed, quitting");
            self.quit = true;
            return;
        }

        self.handle_navigation();

        let pressed = self
            .input
            .key_states()
            .find(|&(_, state)| state == KeyState::JustPressed)
            .map(|(key, _)| key);
        if let Some(key) = pressed {
            self.handle_press(key);
        }

        self.follow_cursor();
    }

    /// Compose the frame without writing it anywhere.
    pub fn compose(&mut self) -> &ScreenBuffer {
        self.compositor
            .compose(&self.doc, &self.cursor, self.camera, &self.settings)
    }

    /// Compose the frame and write it to `w` in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn render(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.compose();
        self.compositor.render(w)
    }

    // -- Input --------------------------------------------------------------

    fn handle_navigation(&mut self) {
        let released = |key| self.input.key_state(key) == KeyState::JustReleased;
        let (left, right, down, up, home, end) = (
            released(KeyCode::Left),
            released(KeyCode::Right),
            released(KeyCode::Down),
            released(KeyCode::Up),
            released(KeyCode::Home),
            released(KeyCode::End),
        );

        if left {
            self.cursor.move_horizontal(-1, &self.doc);
        }
        if right {
            self.cursor.move_horizontal(1, &self.doc);
        }
        if down {
            self.cursor.move_vertical(1, &self.doc);
        }
        if up {
            self.cursor.move_vertical(-1, &self.doc);
        }
        if home {
            self.cursor.home();
        }
        if end {
            self.cursor.end(&self.doc);
        }
    }

    fn handle_press(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let ending = self.doc.line_ending().as_str();
                self.insert(ending);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => {
                self.doc.delete_at(self.cursor.position());
                self.cursor.clamp(&self.doc);
            }
            _ => {
                let chorded = self
                    .input
                    .modifiers()
                    .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER);
                if chorded {
                    return;
                }
                if let Some(ch) = printable(key, self.input.shift()) {
                    let mut buf = [0u8; 4];
                    self.insert(ch.encode_utf8(&mut buf));
                }
            }
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at the cursor and step over it.
    pub fn insert(&mut self, text: &str) {
        self.doc.insert_at(self.cursor.position(), text);
        for _ in 0..cursor_steps(text) {
            self.cursor.move_horizontal(1, &self.doc);
        }
        trace!(cursor = ?self.cursor.position(), "inserted");
    }

    /// Delete the char (or line break) before the cursor.
    ///
    /// The cursor steps left against the line index as it was before the
    /// edit, which puts it on the join point when a line break goes away.
    pub fn backspace(&mut self) {
        let old = self.cursor.position();
        if self.doc.raw_index(old) == 0 {
            return;
        }
        self.cursor.move_horizontal(-1, &self.doc);
        self.doc.delete_before(old);
        self.cursor.clamp(&self.doc);
        trace!(cursor = ?self.cursor.position(), "backspace");
    }

    fn follow_cursor(&mut self) {
        let (w, h) = self.viewport();
        if self.camera.follow(&self.cursor, w, h) {
            trace!(camera = ?self.camera, "follow");
        }
    }
}

/// Cursor positions `text` spans once inserted: one per char, with a CRLF
/// counting once.
fn cursor_steps(text: &str) -> usize {
    text.chars().count() - text.matches("\r\n").count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> Editor {
        Editor::new(Document::from_text(text), EditorSettings::default(), 20, 6)
    }

    fn tap(ed: &mut Editor, key: KeyCode) {
        ed.feed([KeyEvent::press(key)]);
        // Pressed this frame, synthesized release the next.
        ed.update();
        ed.update();
    }

    #[test]
    fn cursor_steps_counts_crlf_once() {
        assert_eq!(cursor_steps("ab"), 2);
        assert_eq!(cursor_steps("\r\n"), 1);
        assert_eq!(cursor_steps("\n"), 1);
        assert_eq!(cursor_steps("a\r\nb"), 3);
    }

    #[test]
    fn typing_inserts_and_advances() {
        let mut ed = editor("");
        for c in ['h', 'I', '!'] {
            tap(&mut ed, KeyCode::Char(c));
        }
        assert_eq!(ed.document().text(), "hI!");
        assert_eq!(ed.cursor().position(), Position::new(0, 3));
    }

    #[test]
    fn shift_modifier_uppercases() {
        let mut ed = editor("");
        ed.feed([KeyEvent::new(
            KeyCode::Char('q'),
            Modifiers::SHIFT,
            corde_term::input::KeyEventKind::Press,
        )]);
        ed.update();
        assert_eq!(ed.document().text(), "Q");
    }

    #[test]
    fn ctrl_chord_types_nothing() {
        let mut ed = editor("");
        ed.feed([KeyEvent::new(
            KeyCode::Char('s'),
            Modifiers::CTRL,
            corde_term::input::KeyEventKind::Press,
        )]);
        ed.update();
        assert_eq!(ed.document().text(), "");
    }

    #[test]
    fn arrows_move_on_release() {
        let mut ed = editor("abc\ndef");
        ed.feed([KeyEvent::press(KeyCode::Right)]);
        ed.update();
        assert_eq!(ed.cursor().col(), 0);
        ed.update();
        assert_eq!(ed.cursor().col(), 1);

        tap(&mut ed, KeyCode::Down);
        assert_eq!(ed.cursor().position(), Position::new(1, 1));
        tap(&mut ed, KeyCode::End);
        assert_eq!(ed.cursor().position(), Position::new(1, 3));
        tap(&mut ed, KeyCode::Home);
        assert_eq!(ed.cursor().position(), Position::new(1, 0));
        tap(&mut ed, KeyCode::Up);
        assert_eq!(ed.cursor().position(), Position::new(0, 0));
    }

    #[test]
    fn queued_arrow_presses_each_move() {
        let mut ed = editor("abcdef");
        ed.feed([KeyEvent::press(KeyCode::Right); 3]);
        for _ in 0..10 {
            ed.update();
        }
        assert_eq!(ed.cursor().position(), Position::new(0, 3));
    }

    #[test]
    fn enter_after_content_cr_then_backspace_restores_text() {
        let mut ed = editor("a\r");
        tap(&mut ed, KeyCode::End);
        tap(&mut ed, KeyCode::Enter);
        assert_eq!(ed.document().text(), "a\r\r\n");
        assert_eq!(ed.document().line_len(0), 2);
        assert_eq!(ed.cursor().position(), Position::new(1, 0));

        tap(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.document().text(), "a\r");
        assert_eq!(ed.cursor().position(), Position::new(0, 2));
    }

    #[test]
    fn enter_uses_document_line_ending() {
        let mut ed = editor("ab\r\ncd");
        ed.cursor.set_position(Position::new(0, 1), &ed.doc);
        tap(&mut ed, KeyCode::Enter);
        assert_eq!(ed.document().text(), "a\r\nb\r\ncd");
        assert_eq!(ed.cursor().position(), Position::new(1, 0));
    }

    #[test]
    fn backspace_joins_lines_at_join_point() {
        let mut ed = editor("ab\r\ncd");
        ed.cursor.set_position(Position::new(1, 0), &ed.doc);
        tap(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.document().text(), "abcd");
        assert_eq!(ed.cursor().position(), Position::new(0, 2));
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut ed = editor("abc");
        tap(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.document().text(), "abc");
        assert!(!ed.document().is_modified());
    }

    #[test]
    fn insert_then_backspace_restores_text() {
        let mut ed = editor("hello\nworld");
        ed.cursor.set_position(Position::new(1, 3), &ed.doc);
        tap(&mut ed, KeyCode::Char('x'));
        assert_eq!(ed.document().text(), "hello\nworxld");
        tap(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.document().text(), "hello\nworld");
        assert_eq!(ed.cursor().position(), Position::new(1, 3));
    }

    #[test]
    fn delete_keeps_cursor() {
        let mut ed = editor("ab\ncd");
        ed.cursor.set_position(Position::new(0, 2), &ed.doc);
        tap(&mut ed, KeyCode::Delete);
        assert_eq!(ed.document().text(), "abcd");
        assert_eq!(ed.cursor().position(), Position::new(0, 2));
    }

    #[test]
    fn escape_quits() {
        let mut ed = editor("x");
        ed.feed([KeyEvent::press(KeyCode::Escape)]);
        ed.update();
        assert!(ed.should_quit());
    }

    #[test]
    fn camera_follows_cursor_down() {
        let text = (1..=30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut ed = editor(&text);
        let (_, h) = ed.viewport();
        for _ in 0..12 {
            tap(&mut ed, KeyCode::Down);
            let cam = ed.camera();
            assert!(cam.y <= ed.cursor().line() && ed.cursor().line() < cam.y + h);
        }
        assert_eq!(ed.camera().y, 12 + 1 - h);
    }

    #[test]
    fn resize_recontains_cursor() {
        let text = "x\n".repeat(40);
        let mut ed = editor(&text);
        ed.cursor.set_position(Position::new(30, 0), &ed.doc);
        ed.update();
        assert!(ed.resize(20, 3));
        let (_, h) = ed.viewport();
        assert_eq!(h, 2);
        assert!(ed.camera().contains(30, 0, 20, h));
    }

    #[test]
    fn render_writes_one_frame() {
        let mut ed = editor("hi");
        let mut out = Vec::new();
        ed.render(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("\x1b[?2026h\x1b[H"));
        assert!(s.ends_with("\x1b[H\x1b[?2026l"));
        assert_eq!(s.matches("\r\n").count(), 5);
    }
}
