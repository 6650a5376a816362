//! Single-line auxiliary input component: a reduced-scope sibling of
//! [`crate::editor::Editor`] for prompt-style fields.
//!
//! One logical line, a scrolling visible window, kill-ring and undo with
//! word-coalescing, and bracketed paste that collapses newlines to spaces.
//! No soft wrap, history, autocomplete, or character-jump.

use crate::component::{Component, Focusable, CURSOR_MARKER};
use crate::killring::KillRing;
use crate::paste::{self, PasteScanner, ScanResult};
use crate::undo::UndoStack;
use crate::width::{graphemes, visible_width};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    text: String,
    cursor: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum LastAction {
    #[default]
    None,
    TypeWord,
    Other,
    Kill,
}

/// A single-line, focusable text input.
pub struct Input {
    text: String,
    cursor: usize,
    view_offset: usize,
    focused: bool,
    kill_ring: KillRing,
    undo: UndoStack<Snapshot>,
    paste_scanner: PasteScanner,
    last_action: LastAction,
    last_width: u16,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    /// Create an empty, unfocused single-line input.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            view_offset: 0,
            focused: false,
            kill_ring: KillRing::new(),
            undo: UndoStack::new(),
            paste_scanner: PasteScanner::new(),
            last_action: LastAction::None,
            last_width: 80,
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current cursor byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text, placing the cursor at its end. Forces an undo
    /// snapshot and collapses any newlines to spaces (a single-line field
    /// never holds a logical newline).
    pub fn set_text(&mut self, text: &str) {
        self.push_undo();
        self.text = text.replace(['\n', '\r'], " ");
        self.cursor = self.text.len();
        self.last_action = LastAction::None;
    }

    /// Clear the text.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    fn push_undo(&mut self) {
        self.undo.push(Snapshot {
            text: self.text.clone(),
            cursor: self.cursor,
        });
    }

    fn restore(&mut self, snap: Snapshot) {
        self.text = snap.text;
        self.cursor = snap.cursor.min(self.text.len());
    }

    /// Undo the most recent coalesced edit.
    pub fn undo(&mut self) {
        if let Some(snap) = self.undo.undo() {
            self.restore(snap);
        }
        self.last_action = LastAction::None;
    }

    fn grapheme_before(&self, col: usize) -> Option<(usize, usize)> {
        graphemes(&self.text)
            .into_iter()
            .take_while(|g| g.byte_start < col)
            .next_back()
            .map(|g| (g.byte_start, col - g.byte_start))
    }

    fn grapheme_after_len(&self, col: usize) -> Option<usize> {
        graphemes(&self.text).into_iter().find(|g| g.byte_start == col).map(|g| g.text.len())
    }

    /// Move one grapheme left.
    pub fn move_left(&mut self) {
        if let Some((start, _)) = self.grapheme_before(self.cursor) {
            self.cursor = start;
        }
    }

    /// Move one grapheme right.
    pub fn move_right(&mut self) {
        if let Some(len) = self.grapheme_after_len(self.cursor) {
            self.cursor += len;
        }
    }

    /// Move to the start of the field.
    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    /// Move to the end of the field.
    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    fn is_word_char(g: &str) -> bool {
        !g.chars().all(char::is_whitespace) && !g.chars().all(|c| c.is_ascii_punctuation() && c != '_')
    }

    fn is_ws(g: &str) -> bool {
        g.chars().all(char::is_whitespace)
    }

    /// Move backward to the start of the previous word token.
    pub fn move_word_left(&mut self) {
        let gs = graphemes(&self.text);
        let mut idx = gs.iter().rposition(|g| g.byte_start < self.cursor).map(|i| i + 1).unwrap_or(0);
        while idx > 0 && Self::is_ws(gs[idx - 1].text) {
            idx -= 1;
        }
        if idx == 0 {
            self.cursor = 0;
            return;
        }
        let class_is_word = Self::is_word_char(gs[idx - 1].text);
        while idx > 0 && !Self::is_ws(gs[idx - 1].text) && Self::is_word_char(gs[idx - 1].text) == class_is_word {
            idx -= 1;
        }
        self.cursor = gs.get(idx).map(|g| g.byte_start).unwrap_or(0);
    }

    /// Move forward to the start of the next word token.
    pub fn move_word_right(&mut self) {
        let gs = graphemes(&self.text);
        let mut idx = gs.iter().position(|g| g.byte_start >= self.cursor).unwrap_or(gs.len());
        while idx < gs.len() && Self::is_ws(gs[idx].text) {
            idx += 1;
        }
        if idx >= gs.len() {
            self.cursor = self.text.len();
            return;
        }
        let class_is_word = Self::is_word_char(gs[idx].text);
        while idx < gs.len() && !Self::is_ws(gs[idx].text) && Self::is_word_char(gs[idx].text) == class_is_word {
            idx += 1;
        }
        self.cursor = gs.get(idx).map(|g| g.byte_start).unwrap_or(self.text.len());
    }

    fn maybe_push_undo_for_insert(&mut self, ch: char) {
        if ch.is_whitespace() || self.last_action != LastAction::TypeWord {
            self.push_undo();
        }
    }

    /// Insert one character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        self.maybe_push_undo_for_insert(ch);
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.last_action = if ch.is_whitespace() { LastAction::Other } else { LastAction::TypeWord };
    }

    /// Grapheme-aware backspace.
    pub fn backspace(&mut self) {
        if let Some((start, _)) = self.grapheme_before(self.cursor) {
            self.push_undo();
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
            self.last_action = LastAction::Other;
        }
    }

    /// Grapheme-aware forward delete.
    pub fn delete_forward(&mut self) {
        if let Some(len) = self.grapheme_after_len(self.cursor) {
            self.push_undo();
            self.text.replace_range(self.cursor..self.cursor + len, "");
            self.last_action = LastAction::Other;
        }
    }

    /// Delete from the cursor to the start, pushing the removed text to
    /// the kill ring with `prepend=true`.
    pub fn delete_to_start(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.push_undo();
        let accumulate = self.last_action == LastAction::Kill;
        let killed: String = self.text.drain(..self.cursor).collect();
        self.cursor = 0;
        self.kill_ring.push(&killed, true, accumulate);
        self.last_action = LastAction::Kill;
    }

    /// Delete from the cursor to the end, pushing the removed text to the
    /// kill ring with `prepend=false`.
    pub fn delete_to_end(&mut self) {
        if self.cursor == self.text.len() {
            return;
        }
        self.push_undo();
        let accumulate = self.last_action == LastAction::Kill;
        let killed: String = self.text.drain(self.cursor..).collect();
        self.kill_ring.push(&killed, false, accumulate);
        self.last_action = LastAction::Kill;
    }

    /// Delete the word immediately before the cursor.
    pub fn delete_word_backward(&mut self) {
        let end = self.cursor;
        self.move_word_left();
        let start = self.cursor;
        if start == end {
            return;
        }
        self.push_undo();
        let accumulate = self.last_action == LastAction::Kill;
        let killed: String = self.text.drain(start..end).collect();
        self.cursor = start;
        self.kill_ring.push(&killed, true, accumulate);
        self.last_action = LastAction::Kill;
    }

    /// Insert the most recent kill-ring entry at the cursor.
    pub fn yank(&mut self) {
        let Some(text) = self.kill_ring.peek().map(str::to_string) else {
            return;
        };
        self.push_undo();
        self.text.insert_str(self.cursor, &text);
        self.cursor += text.len();
        self.last_action = LastAction::Other;
    }

    // ---- Bracketed paste (collapsing newlines to spaces) --------------

    fn feed_paste(&mut self, bytes: &[u8]) -> Option<Vec<u8>> {
        match self.paste_scanner.feed(bytes) {
            ScanResult::PassThrough(rest) => Some(rest),
            ScanResult::Accumulating => None,
            ScanResult::Complete { text, trailing } => {
                self.apply_paste(&text);
                Some(trailing)
            }
        }
    }

    fn apply_paste(&mut self, raw: &str) {
        self.push_undo();
        let collapsed = raw.replace('\n', " ");
        let mut text = collapsed;
        if paste::looks_path_like(&text) {
            let word_before = self
                .grapheme_before(self.cursor)
                .is_some_and(|(start, _)| Self::is_word_char(&self.text[start..self.cursor]));
            if word_before {
                text.insert(0, ' ');
            }
        }
        self.text.insert_str(self.cursor, &text);
        self.cursor += text.len();
        self.last_action = LastAction::Other;
    }

    // ---- Input dispatch -------------------------------------------------

    /// Handle one chunk of raw input bytes.
    pub fn handle_input_bytes(&mut self, bytes: &[u8]) {
        let bytes = if self.paste_scanner.in_paste() || bytes.windows(6).any(|w| w == b"\x1b[200~") {
            match self.feed_paste(bytes) {
                Some(rest) => rest,
                None => return,
            }
        } else {
            bytes.to_vec()
        };
        if bytes.is_empty() {
            return;
        }
        let mut i = 0usize;
        while i < bytes.len() {
            i += self.dispatch_one(&bytes[i..]);
        }
    }

    fn dispatch_one(&mut self, buf: &[u8]) -> usize {
        match buf[0] {
            0x1b => self.dispatch_escape(buf),
            0x7f | 0x08 => {
                self.backspace();
                1
            }
            0x01 => {
                self.move_start();
                1
            }
            0x05 => {
                self.move_end();
                1
            }
            0x02 => {
                self.move_left();
                1
            }
            0x06 => {
                self.move_right();
                1
            }
            0x0b => {
                self.delete_to_end();
                1
            }
            0x15 => {
                self.delete_to_start();
                1
            }
            0x17 => {
                self.delete_word_backward();
                1
            }
            0x19 => {
                self.yank();
                1
            }
            0x1f => {
                self.undo();
                1
            }
            b if b >= 0x20 => {
                if let Some((ch, len)) = decode_utf8_char(buf) {
                    if ch != '\n' && ch != '\r' {
                        self.insert_char(ch);
                    }
                    len
                } else {
                    1
                }
            }
            _ => 1,
        }
    }

    fn dispatch_escape(&mut self, buf: &[u8]) -> usize {
        if buf.len() == 1 {
            return 1;
        }
        match buf[1] {
            b'[' => self.dispatch_csi(buf),
            b'b' => {
                self.move_word_left();
                2
            }
            b'f' => {
                self.move_word_right();
                2
            }
            _ => 1,
        }
    }

    fn dispatch_csi(&mut self, buf: &[u8]) -> usize {
        let Some(final_pos) = buf.iter().skip(2).position(|&b| (0x40..=0x7e).contains(&b)).map(|p| p + 2) else {
            return buf.len();
        };
        let params = &buf[2..final_pos];
        let final_byte = buf[final_pos];
        let consumed = final_pos + 1;
        match final_byte {
            b'C' => self.move_right(),
            b'D' => self.move_left(),
            b'H' => self.move_start(),
            b'F' => self.move_end(),
            b'~' => match params {
                b"1" => self.move_start(),
                b"4" => self.move_end(),
                b"3" => self.delete_forward(),
                _ => {}
            },
            _ => {}
        }
        consumed
    }

    // ---- Rendering: scrolling visible window --------------------------

    fn content_width(&self, width: u16) -> usize {
        (width as usize).saturating_sub(1).max(1)
    }

    fn adjust_view_offset(&mut self, content_width: usize) {
        let cursor_col = visible_width(&self.text[..self.cursor]);
        if cursor_col < self.view_offset {
            self.view_offset = cursor_col;
        } else if cursor_col >= self.view_offset + content_width {
            self.view_offset = cursor_col + 1 - content_width;
        }
        let total_width = visible_width(&self.text);
        if total_width.saturating_sub(self.view_offset) < content_width && total_width > content_width {
            self.view_offset = total_width - content_width;
        }
        if total_width <= content_width {
            self.view_offset = 0;
        }
    }
}

fn decode_utf8_char(buf: &[u8]) -> Option<(char, usize)> {
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return None,
    };
    if buf.len() < len {
        return None;
    }
    std::str::from_utf8(&buf[..len]).ok()?.chars().next().map(|c| (c, len))
}

impl Component for Input {
    fn render(&mut self, width: u16) -> Vec<String> {
        self.last_width = width;
        let content_width = self.content_width(width);
        self.adjust_view_offset(content_width);

        let gs = graphemes(&self.text);
        let mut visible = String::new();
        let mut col = 0usize;
        let mut cursor_visual_col = None;
        let mut byte_col = 0usize;
        for g in &gs {
            if byte_col == self.cursor {
                cursor_visual_col = Some(col.saturating_sub(self.view_offset));
            }
            if col >= self.view_offset && col < self.view_offset + content_width {
                visible.push_str(g.text);
            }
            col += g.width;
            byte_col = g.byte_start + g.text.len();
        }
        if byte_col == self.cursor || gs.is_empty() {
            cursor_visual_col = Some(col.saturating_sub(self.view_offset));
        }

        if !self.focused {
            return vec![visible];
        }

        let cursor_col = cursor_visual_col.unwrap_or(0);
        let mut out = String::new();
        let mut placed = false;
        let mut c = 0usize;
        for g in graphemes(&visible) {
            if !placed && c == cursor_col {
                out.push_str(CURSOR_MARKER);
                out.push_str("\x1b[7m");
                out.push_str(g.text);
                out.push_str("\x1b[27m");
                placed = true;
            } else {
                out.push_str(g.text);
            }
            c += g.width;
        }
        if !placed {
            out.push_str(CURSOR_MARKER);
            out.push_str("\x1b[7m \x1b[27m");
        }
        vec![out]
    }

    fn handle_input(&mut self, bytes: &[u8]) {
        self.handle_input_bytes(bytes);
    }
}

impl Focusable for Input {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_round_trip() {
        let mut input = Input::new();
        for ch in "hello".chars() {
            input.insert_char(ch);
        }
        assert_eq!(input.text(), "hello");
        input.backspace();
        assert_eq!(input.text(), "hell");
    }

    #[test]
    fn kill_and_yank() {
        let mut input = Input::new();
        for ch in "hello world".chars() {
            input.insert_char(ch);
        }
        input.move_start();
        for _ in 0.."hello".len() {
            input.move_right();
        }
        input.delete_to_end();
        assert_eq!(input.text(), "hello");
        input.yank();
        assert_eq!(input.text(), "hello world");
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut input = Input::new();
        input.insert_char('a');
        input.insert_char(' ');
        input.insert_char('b');
        input.undo();
        input.undo();
        assert_eq!(input.text(), "");
    }

    #[test]
    fn paste_collapses_newlines_to_spaces() {
        let mut input = Input::new();
        input.apply_paste("line one\nline two");
        assert_eq!(input.text(), "line one line two");
    }

    #[test]
    fn no_history_no_autocomplete_no_wrap_surface() {
        // Input exposes no history/autocomplete/multi-line API at all;
        // this test exists to document that contract rather than probe
        // a negative.
        let mut input = Input::new();
        input.set_text("single logical line only");
        assert!(!input.text().contains('\n'));
    }

    #[test]
    fn render_hides_cursor_marker_when_unfocused() {
        let mut input = Input::new();
        input.set_text("abc");
        let lines = input.render(20);
        assert!(!lines[0].contains(CURSOR_MARKER));
    }

    #[test]
    fn render_shows_cursor_marker_when_focused() {
        let mut input = Input::new();
        input.set_text("abc");
        input.set_focused(true);
        let lines = input.render(20);
        assert!(lines[0].contains(CURSOR_MARKER));
    }

    #[test]
    fn scrolls_view_to_keep_cursor_visible() {
        let mut input = Input::new();
        input.set_text(&"x".repeat(50));
        input.set_focused(true);
        for width in [10u16, 20, 80] {
            let lines = input.render(width);
            assert!(visible_width(&lines[0]) <= width as usize);
        }
    }
}
