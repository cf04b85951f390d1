//! Document — the raw text of the open file and its display-line index.
//!
//! The text lives in a [`ropey::Rope`]. On top of it sits a [`LineIndex`]:
//! one [`LineSpan`] per display line recording where the line starts, how
//! many chars of content it has, and which separator ends it. Every cursor
//! to raw-offset translation goes through the index, never through ropey's
//! own line breaking.
//!
//! # Line separators
//!
//! Only `\n` and `\r\n` end a line. A lone `\r` is ordinary content and is
//! displayed like any other control character. The separator width is
//! recorded per line (0, 1 or 2), so documents with mixed endings and a
//! last line without a terminator translate exactly.
//!
//! Edits never fuse a content `\r` into a separator: when an insert or a
//! removal would leave one directly before a `\n`, that `\n` is written as
//! `\r\n` instead, so the line keeps its `\r`.
//!
//! The index is rebuilt from the rope after load and after every edit.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::{Rope, RopeSlice};
use tracing::{debug, trace};

use crate::position::Position;

// ---------------------------------------------------------------------------
// Separators and line ending
// ---------------------------------------------------------------------------

/// What terminates a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// The last line of the document.
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl Separator {
    /// Number of chars the separator occupies in the raw text.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::None => 0,
            Self::Lf => 1,
            Self::CrLf => 2,
        }
    }
}

/// The line ending a document inserts for a line break.
///
/// Detected from the first separator in the text; `Lf` when there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Detect from the first `\n` in `text`.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Line index
// ---------------------------------------------------------------------------

/// One display line: `len` content chars starting at raw char `start`,
/// followed by `separator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub len: usize,
    pub separator: Separator,
}

impl LineSpan {
    /// Raw offset just past the content (where the separator begins).
    #[inline]
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Raw offset where the following line starts.
    #[inline]
    #[must_use]
    pub const fn next_start(self) -> usize {
        self.start + self.len + self.separator.width()
    }
}

/// Display-line segmentation of a text. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<LineSpan>,
}

impl LineIndex {
    /// Scan `chars` left to right and split at `\n` and `\r\n`.
    pub fn build(chars: impl IntoIterator<Item = char>) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        let mut len = 0;
        let mut chars = chars.into_iter().peekable();

        while let Some(ch) = chars.next() {
            let separator = match ch {
                '\n' => Separator::Lf,
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    Separator::CrLf
                }
                _ => {
                    len += 1;
                    continue;
                }
            };
            let span = LineSpan {
                start,
                len,
                separator,
            };
            lines.push(span);
            start = span.next_start();
            len = 0;
        }

        lines.push(LineSpan {
            start,
            len,
            separator: Separator::None,
        });
        Self { lines }
    }

    /// Number of display lines (at least 1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`; kept for clippy's `len_without_is_empty`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, line: usize) -> Option<LineSpan> {
        self.lines.get(line).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineSpan> {
        self.lines.iter()
    }
}

/// Split `text` into display lines (without separators).
///
/// For text that only uses `\n`, joining the result with `"\n"` gives back
/// the input.
///
/// ```
/// use corde_editor::document::segment;
///
/// assert_eq!(segment("a\r\nb\rc\n"), vec!["a", "b\rc", ""]);
/// ```
#[must_use]
pub fn segment(text: &str) -> Vec<&str> {
    // `\r` and `\n` are ASCII, so byte scanning never splits a char.
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                lines.push(&text[start..i]);
                i += 2;
                start = i;
            }
            _ => i += 1,
        }
    }

    lines.push(&text[start..]);
    lines
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The open file.
///
/// Owns the raw text and keeps the line index in step with it. Positions
/// passed in are clamped to the document, so no operation here panics on
/// a stale cursor.
pub struct Document {
    rope: Rope,
    index: LineIndex,
    path: Option<PathBuf>,
    line_ending: LineEnding,
    modified: bool,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty scratch document.
    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let index = LineIndex::build(rope.chars());
        Self {
            rope,
            index,
            path: None,
            line_ending: LineEnding::detect(text),
            modified: false,
        }
    }

    /// Read a whole file as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut doc = Self::from_text(&text);
        doc.path = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            bytes = text.len(),
            lines = doc.line_count(),
            ending = %doc.line_ending,
            "loaded document"
        );
        Ok(doc)
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    #[inline]
    #[must_use]
    pub const fn index(&self) -> &LineIndex {
        &self.index
    }

    /// The full raw text.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of display lines (at least 1).
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.index.len()
    }

    #[inline]
    #[must_use]
    pub fn line_span(&self, line: usize) -> Option<LineSpan> {
        self.index.get(line)
    }

    /// Content length of `line` in chars; 0 past the end.
    #[inline]
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.index.get(line).map_or(0, |s| s.len)
    }

    /// Content of `line` without its separator.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        self.index
            .get(line)
            .map(|s| self.rope.slice(s.start..s.end()))
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp to an existing line and a column in `0..=len`.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// Raw char offset of `pos`.
    ///
    /// The sum of `len + separator width` over the lines above, plus the
    /// column clamped to the line's length.
    #[must_use]
    pub fn raw_index(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.index.get(pos.line).map_or(0, |s| s.start + pos.col)
    }

    /// Inverse of [`raw_index`](Self::raw_index). Offsets inside a separator
    /// map to the end of its line.
    #[must_use]
    pub fn position_of(&self, raw: usize) -> Position {
        let line = self
            .index
            .lines
            .partition_point(|s| s.next_start() <= raw)
            .min(self.line_count() - 1);
        let span = self.index.lines[line];
        Position::new(line, raw.saturating_sub(span.start).min(span.len))
    }

    // -- Editing ------------------------------------------------------------

    /// Splice `text` in at `pos`.
    ///
    /// A `\n` landing right after a content `\r` (on either side of the
    /// splice) is written as `\r\n`.
    pub fn insert_at(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = self.raw_index(pos);
        let mut text = Cow::Borrowed(text);
        if text.starts_with('\n') && idx > 0 && self.rope.get_char(idx - 1) == Some('\r') {
            text = Cow::Owned(format!("\r{text}"));
        }
        if text.ends_with('\r') && self.rope.get_char(idx) == Some('\n') {
            text.to_mut().push('\r');
        }
        self.rope.insert(idx, &text);
        self.reindex();
        trace!(at = idx, chars = text.chars().count(), "insert");
    }

    /// Remove what sits before `pos`: one char, or at column 0 the whole
    /// separator of the line above. Returns the number of chars removed.
    pub fn delete_before(&mut self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let idx = self.raw_index(pos);
        if idx == 0 {
            return 0;
        }
        let width = if pos.col == 0 {
            self.index
                .get(pos.line - 1)
                .map_or(1, |s| s.separator.width())
        } else {
            1
        };
        self.remove(idx - width, idx)
    }

    /// Remove what sits at `pos`: one char, or at end of line the whole
    /// separator. Returns the number of chars removed.
    pub fn delete_at(&mut self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let idx = self.raw_index(pos);
        let Some(span) = self.index.get(pos.line) else {
            return 0;
        };
        let width = if pos.col < span.len {
            1
        } else {
            span.separator.width()
        };
        if width == 0 {
            return 0;
        }
        self.remove(idx, idx + width)
    }

    /// Remove `start..end`. The char before `start` is always content, so a
    /// `\r` there that now meets a `\n` gets a separator `\r` of its own.
    fn remove(&mut self, start: usize, end: usize) -> usize {
        self.rope.remove(start..end);
        if start > 0
            && self.rope.get_char(start - 1) == Some('\r')
            && self.rope.get_char(start) == Some('\n')
        {
            self.rope.insert_char(start, '\r');
        }
        self.reindex();
        trace!(start, end, "remove");
        end - start
    }

    fn reindex(&mut self) {
        self.index = LineIndex::build(self.rope.chars());
        self.modified = true;
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name for display, or `[scratch]` for a document with no path.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "[scratch]".to_owned(), |n| n.to_string_lossy().into_owned())
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .field("modified", &self.modified)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(text: &str) -> Vec<(usize, usize, usize)> {
        LineIndex::build(text.chars())
            .iter()
            .map(|s| (s.start, s.len, s.separator.width()))
            .collect()
    }

    // -- Segmentation -------------------------------------------------------

    #[test]
    fn segment_lf_round_trips() {
        for text in ["", "a", "a\n", "\n\n", "one\ntwo\nthree", "x\n\ny\n"] {
            assert_eq!(segment(text).join("\n"), text, "{text:?}");
        }
    }

    #[test]
    fn segment_crlf_and_lone_cr() {
        assert_eq!(segment("a\r\nb"), vec!["a", "b"]);
        assert_eq!(segment("a\rb"), vec!["a\rb"]);
        assert_eq!(segment("a\r"), vec!["a\r"]);
        assert_eq!(segment("\r\r\n"), vec!["\r", ""]);
    }

    #[test]
    fn empty_text_has_one_line() {
        assert_eq!(spans(""), vec![(0, 0, 0)]);
        assert_eq!(Document::new().line_count(), 1);
    }

    #[test]
    fn index_records_separator_widths() {
        assert_eq!(spans("ab\ncd"), vec![(0, 2, 1), (3, 2, 0)]);
        assert_eq!(spans("ab\r\ncd\r\n"), vec![(0, 2, 2), (4, 2, 2), (8, 0, 0)]);
        assert_eq!(spans("a\r\nb\nc"), vec![(0, 1, 2), (3, 1, 1), (5, 1, 0)]);
        assert_eq!(spans("a\rb\n"), vec![(0, 3, 1), (4, 0, 0)]);
    }

    #[test]
    fn index_agrees_with_segment() {
        let text = "α\r\nβγ\n\rδ\r\n";
        let doc = Document::from_text(text);
        let lines: Vec<String> = (0..doc.line_count())
            .map(|i| doc.line(i).map(|l| l.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(lines, segment(text));
    }

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn line_ending_detect() {
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("no newline"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("\n"), LineEnding::Lf);
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF");
    }

    // -- raw_index ----------------------------------------------------------

    #[test]
    fn raw_index_lf() {
        let doc = Document::from_text("abc\nde\nf");
        assert_eq!(doc.raw_index(Position::new(0, 0)), 0);
        assert_eq!(doc.raw_index(Position::new(0, 3)), 3);
        assert_eq!(doc.raw_index(Position::new(1, 0)), 4);
        assert_eq!(doc.raw_index(Position::new(1, 2)), 6);
        assert_eq!(doc.raw_index(Position::new(2, 1)), 8);
    }

    #[test]
    fn raw_index_crlf() {
        let doc = Document::from_text("abc\r\nde\r\nf");
        assert_eq!(doc.raw_index(Position::new(1, 0)), 5);
        assert_eq!(doc.raw_index(Position::new(2, 0)), 9);
        assert_eq!(doc.raw_index(Position::new(2, 1)), 10);
    }

    #[test]
    fn raw_index_mixed() {
        let doc = Document::from_text("a\r\nb\nc\r\nd");
        assert_eq!(doc.raw_index(Position::new(1, 0)), 3);
        assert_eq!(doc.raw_index(Position::new(2, 0)), 5);
        assert_eq!(doc.raw_index(Position::new(3, 0)), 8);
        assert_eq!(doc.rope().char(8), 'd');
    }

    #[test]
    fn raw_index_trailing_newline_and_none() {
        let with = Document::from_text("ab\n");
        assert_eq!(with.line_count(), 2);
        assert_eq!(with.raw_index(Position::new(1, 0)), 3);

        let without = Document::from_text("ab");
        assert_eq!(without.line_count(), 1);
        assert_eq!(without.raw_index(Position::new(0, 2)), 2);
    }

    #[test]
    fn raw_index_clamps() {
        let doc = Document::from_text("ab\ncd");
        assert_eq!(doc.raw_index(Position::new(0, 99)), 2);
        assert_eq!(doc.raw_index(Position::new(99, 0)), 3);
    }

    #[test]
    fn raw_index_lone_cr_is_content() {
        let doc = Document::from_text("a\rb\nc");
        assert_eq!(doc.line_len(0), 3);
        assert_eq!(doc.raw_index(Position::new(1, 0)), 4);
    }

    #[test]
    fn position_of_inverts_raw_index() {
        let doc = Document::from_text("ab\r\n\ncd");
        for line in 0..doc.line_count() {
            for col in 0..=doc.line_len(line) {
                let pos = Position::new(line, col);
                assert_eq!(doc.position_of(doc.raw_index(pos)), pos);
            }
        }
        // Inside the CRLF: end of line 0.
        assert_eq!(doc.position_of(3), Position::new(0, 2));
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_then_delete_before_restores_text() {
        let mut doc = Document::from_text("hello\r\nworld");
        let at = Position::new(1, 2);
        doc.insert_at(at, "x");
        assert_eq!(doc.text(), "hello\r\nwoxrld");
        doc.delete_before(Position::new(1, 3));
        assert_eq!(doc.text(), "hello\r\nworld");
    }

    #[test]
    fn delete_before_at_start_is_noop() {
        let mut doc = Document::from_text("abc");
        assert_eq!(doc.delete_before(Position::ZERO), 0);
        assert_eq!(doc.text(), "abc");
        assert!(!doc.is_modified());
    }

    #[test]
    fn delete_before_joins_crlf_lines() {
        let mut doc = Document::from_text("ab\r\ncd");
        assert_eq!(doc.delete_before(Position::new(1, 0)), 2);
        assert_eq!(doc.text(), "abcd");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn delete_before_joins_lf_lines() {
        let mut doc = Document::from_text("ab\ncd");
        assert_eq!(doc.delete_before(Position::new(1, 0)), 1);
        assert_eq!(doc.text(), "abcd");
    }

    #[test]
    fn delete_at_char_and_separator() {
        let mut doc = Document::from_text("ab\r\ncd");
        assert_eq!(doc.delete_at(Position::new(0, 0)), 1);
        assert_eq!(doc.text(), "b\r\ncd");
        assert_eq!(doc.delete_at(Position::new(0, 1)), 2);
        assert_eq!(doc.text(), "bcd");
        assert_eq!(doc.delete_at(Position::new(0, 3)), 0);
    }

    #[test]
    fn insert_line_break_reindexes() {
        let mut doc = Document::from_text("abcd");
        doc.insert_at(Position::new(0, 2), "\r\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_span(0).map(|s| s.separator), Some(Separator::CrLf));
        assert_eq!(doc.line(1).map(|l| l.to_string()), Some("cd".to_owned()));
        assert!(doc.is_modified());
    }

    #[test]
    fn inserted_cr_before_lf_stays_content() {
        let mut doc = Document::from_text("a\nb");
        doc.insert_at(Position::new(0, 1), "\r");
        assert_eq!(doc.text(), "a\r\r\nb");
        assert_eq!(doc.line_len(0), 2);
        assert_eq!(doc.line_span(0).map(|s| s.separator), Some(Separator::CrLf));
    }

    #[test]
    fn lf_inserted_after_content_cr_keeps_it() {
        let mut doc = Document::from_text("a\r");
        doc.insert_at(Position::new(0, 2), "\n");
        assert_eq!(doc.text(), "a\r\r\n");
        assert_eq!(doc.line_len(0), 2);
        assert_eq!(doc.line_count(), 2);

        assert_eq!(doc.delete_before(Position::new(1, 0)), 2);
        assert_eq!(doc.text(), "a\r");
    }

    #[test]
    fn removal_never_fuses_cr_and_lf() {
        let mut doc = Document::from_text("a\rx\nb");
        assert_eq!(doc.delete_at(Position::new(0, 2)), 1);
        assert_eq!(doc.text(), "a\r\r\nb");
        assert_eq!(doc.line(0).map(|l| l.to_string()), Some("a\r".to_owned()));

        let mut doc = Document::from_text("a\rx\nb");
        doc.delete_before(Position::new(0, 3));
        assert_eq!(doc.text(), "a\r\r\nb");

        // Joining lines: "a\r" ends in CRLF, the empty line after it in LF.
        let mut doc = Document::from_text("a\r\r\n\nb");
        assert_eq!(doc.delete_before(Position::new(1, 0)), 2);
        assert_eq!(doc.text(), "a\r\r\nb");
        assert_eq!(doc.line_len(0), 2);
        assert_eq!(doc.line_count(), 2);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn from_file_reads_text_and_path() {
        let dir = std::env::temp_dir().join("corde_document_test");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("load.txt");
        fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let doc = Document::from_file(&path).unwrap();
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.display_name(), "load.txt");
        assert!(!doc.is_modified());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn from_file_nonexistent() {
        assert!(Document::from_file(Path::new("/nonexistent/path/file.txt")).is_err());
    }

    #[test]
    fn scratch_display_name() {
        assert_eq!(Document::new().display_name(), "[scratch]");
    }
}
