//! The multi-line, grapheme-aware, soft-wrapping editor.
//!
//! Built around a plain `Vec<String>` logical-line buffer and the
//! pull-based [`Component`] contract. Visual layout reuses
//! [`crate::width::word_wrap_line`] directly so cursor navigation and
//! rendering can never disagree about where a logical line wraps.

use crate::autocomplete::{AutocompleteProvider, Mode as AcMode, Session as AcSession};
use crate::component::{Component, Focusable, CURSOR_MARKER};
use crate::history::History;
use crate::killring::KillRing;
use crate::paste::{self, PasteScanner, PasteStore, ScanResult};
use crate::select_list::SelectList;
use crate::undo::UndoStack;
use crate::width::{graphemes, visible_width, word_wrap_line};

/// Which direction a pending character-jump is armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpDirection {
    /// Jump forward (toward the end of the buffer) to the next occurrence.
    Forward,
    /// Jump backward (toward the start of the buffer) to the previous
    /// occurrence.
    Backward,
}

/// The editor's jump-mode state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JumpMode {
    /// Not awaiting a jump target.
    #[default]
    None,
    /// Awaiting the next printable grapheme as a jump target.
    Armed(JumpDirection),
}

/// What the previous editing action was, used to decide undo coalescing,
/// kill-ring accumulation, and yank-pop validity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum LastAction {
    #[default]
    None,
    /// The previous action inserted one or more non-whitespace characters
    /// of the same word.
    TypeWord,
    /// The previous action inserted whitespace, or any other single-shot
    /// insertion that should not coalesce with the next keystroke.
    Other,
    /// The previous action was a kill (delete-to-line-start/end or a
    /// word-delete whose text was pushed to the kill ring).
    Kill,
    /// The previous action was a yank.
    Yank,
}

/// An immutable snapshot of editor state, pushed to the undo stack before
/// a coalescable mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
}

/// One wrapped visual row of the editor, owning a byte-range of its
/// logical line for cursor-ownership purposes.
#[derive(Clone, Debug)]
struct VisualLine {
    logical_line: usize,
    /// Inclusive byte start within the logical line.
    start_col: usize,
    /// Exclusive byte end of this visual line's cursor-ownership range.
    /// The last visual line of a logical line owns up to
    /// `lines[logical_line].len() + 1` so `cursor_col == line.len()` is
    /// representable.
    end_col: usize,
    /// The rendered (wrap-trimmed) text of this visual line.
    text: String,
}

/// A multi-line, focusable text editor.
pub struct Editor {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
    preferred_col: Option<usize>,
    focused: bool,

    kill_ring: KillRing,
    undo: UndoStack<Snapshot>,
    history: History,
    pastes: PasteStore,
    paste_scanner: PasteScanner,

    jump_mode: JumpMode,
    autocomplete: Option<AcSession>,
    provider: Option<Box<dyn AutocompleteProvider + Send>>,

    last_action: LastAction,
    scroll_offset: usize,
    last_width: u16,
    /// Terminal row count, pushed in by the engine via
    /// [`Component::set_rows_hint`] each tick; drives the `max(5, floor(0.3
    /// * rows))` visible-line window and page-scroll distance. Defaults to
    /// a conservative 24 until the first hint arrives.
    last_rows: u16,
    padding_x: u16,

    /// Set on Enter outside of a slash-command autocomplete accept; the
    /// engine or host reads it via [`Editor::take_submission`].
    pending_submission: Option<String>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an empty, unfocused editor with one blank logical line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            preferred_col: None,
            focused: false,
            kill_ring: KillRing::new(),
            undo: UndoStack::new(),
            history: History::new(),
            pastes: PasteStore::new(),
            paste_scanner: PasteScanner::new(),
            jump_mode: JumpMode::None,
            autocomplete: None,
            provider: None,
            last_action: LastAction::None,
            scroll_offset: 0,
            last_width: 80,
            last_rows: 24,
            padding_x: 1,
            pending_submission: None,
        }
    }

    /// Install the autocomplete provider the editor delegates candidate
    /// generation and acceptance to.
    pub fn set_provider(&mut self, provider: Box<dyn AutocompleteProvider + Send>) {
        self.provider = Some(provider);
    }

    /// Horizontal padding reserved on each side of the editor's content.
    #[must_use]
    pub fn with_padding_x(mut self, padding_x: u16) -> Self {
        self.padding_x = padding_x;
        self
    }

    /// Current logical-line buffer, as a single newline-joined string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the entire buffer with `text`, placing the cursor at its
    /// end. Forces an undo snapshot and exits history browsing.
    pub fn set_text(&mut self, text: &str) {
        self.push_undo_forced();
        self.lines = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.cursor_line = self.lines.len() - 1;
        self.cursor_col = self.lines[self.cursor_line].len();
        self.preferred_col = None;
        self.history.go_live();
        self.last_action = LastAction::None;
    }

    /// Current cursor position as `(line, byte column)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    /// Take the most recently submitted text, if `handle_input` produced
    /// one since the last call (Enter outside a slash-command
    /// autocomplete accept). Pastes are already re-inflated to their
    /// original text.
    pub fn take_submission(&mut self) -> Option<String> {
        self.pending_submission.take()
    }

    // ---- Undo -----------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            cursor_line: self.cursor_line,
            cursor_col: self.cursor_col,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.lines = snap.lines;
        self.cursor_line = snap.cursor_line;
        self.cursor_col = snap.cursor_col;
        self.clamp_cursor();
    }

    fn push_undo_forced(&mut self) {
        self.undo.push(self.snapshot());
    }

    /// Undo the most recent coalesced edit.
    pub fn undo(&mut self) {
        if let Some(snap) = self.undo.undo() {
            self.restore(snap);
        }
        self.last_action = LastAction::None;
        self.refresh_autocomplete();
    }

    fn clamp_cursor(&mut self) {
        self.cursor_line = self.cursor_line.min(self.lines.len() - 1);
        let len = self.lines[self.cursor_line].len();
        if self.cursor_col > len {
            self.cursor_col = len;
        }
        // Snap to a grapheme boundary in case a caller landed mid-cluster.
        let line = &self.lines[self.cursor_line];
        if !line.is_char_boundary(self.cursor_col) {
            self.cursor_col = graphemes(line)
                .iter()
                .map(|g| g.byte_start)
                .filter(|&b| b <= self.cursor_col)
                .next_back()
                .unwrap_or(0);
        }
    }

    // ---- Grapheme-aware horizontal motion ---------------------------

    fn grapheme_before(&self, line: usize, col: usize) -> Option<(usize, usize)> {
        graphemes(&self.lines[line])
            .into_iter()
            .take_while(|g| g.byte_start < col)
            .next_back()
            .map(|g| (g.byte_start, col - g.byte_start))
    }

    fn grapheme_after_len(&self, line: usize, col: usize) -> Option<usize> {
        graphemes(&self.lines[line])
            .into_iter()
            .find(|g| g.byte_start == col)
            .map(|g| g.text.len())
    }

    /// Move the cursor one grapheme left, wrapping to the end of the
    /// previous logical line at a line boundary.
    pub fn move_left(&mut self) {
        self.preferred_col = None;
        if let Some((start, _)) = self.grapheme_before(self.cursor_line, self.cursor_col) {
            self.cursor_col = start;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.lines[self.cursor_line].len();
        }
    }

    /// Move the cursor one grapheme right, wrapping to the start of the
    /// next logical line at a line boundary.
    pub fn move_right(&mut self) {
        self.preferred_col = None;
        if let Some(glen) = self.grapheme_after_len(self.cursor_line, self.cursor_col) {
            self.cursor_col += glen;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    /// Move to the start of the current logical line.
    pub fn move_line_start(&mut self) {
        self.preferred_col = None;
        self.cursor_col = 0;
    }

    /// Move to the end of the current logical line.
    pub fn move_line_end(&mut self) {
        self.preferred_col = None;
        self.cursor_col = self.lines[self.cursor_line].len();
    }

    fn is_word_char(g: &str) -> bool {
        !g.chars().all(char::is_whitespace) && !is_punct(g)
    }

    /// Move backward to the start of the previous word token. Word tokens
    /// are runs of punctuation or runs of non-whitespace/non-punctuation
    /// graphemes, separated by whitespace.
    pub fn move_word_left(&mut self) {
        self.preferred_col = None;
        loop {
            let gs = graphemes(&self.lines[self.cursor_line]);
            let mut idx = gs
                .iter()
                .rposition(|g| g.byte_start < self.cursor_col)
                .map(|i| i + 1)
                .unwrap_or(0);
            // Skip trailing whitespace.
            while idx > 0 && is_ws(&gs[idx - 1].text) {
                idx -= 1;
            }
            if idx == 0 {
                if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.cursor_col = self.lines[self.cursor_line].len();
                    continue;
                }
                self.cursor_col = 0;
                return;
            }
            let class_is_word = Self::is_word_char(&gs[idx - 1].text);
            while idx > 0 && !is_ws(&gs[idx - 1].text) && Self::is_word_char(&gs[idx - 1].text) == class_is_word {
                idx -= 1;
            }
            self.cursor_col = gs.get(idx).map(|g| g.byte_start).unwrap_or(0);
            return;
        }
    }

    /// Move forward to the start of the next word token.
    pub fn move_word_right(&mut self) {
        self.preferred_col = None;
        loop {
            let gs = graphemes(&self.lines[self.cursor_line]);
            let mut idx = gs.iter().position(|g| g.byte_start >= self.cursor_col).unwrap_or(gs.len());
            while idx < gs.len() && is_ws(&gs[idx].text) {
                idx += 1;
            }
            if idx >= gs.len() {
                if self.cursor_line + 1 < self.lines.len() {
                    self.cursor_line += 1;
                    self.cursor_col = 0;
                    continue;
                }
                self.cursor_col = self.lines[self.cursor_line].len();
                return;
            }
            let class_is_word = Self::is_word_char(&gs[idx].text);
            while idx < gs.len() && !is_ws(&gs[idx].text) && Self::is_word_char(&gs[idx].text) == class_is_word {
                idx += 1;
            }
            self.cursor_col = gs.get(idx).map(|g| g.byte_start).unwrap_or(self.lines[self.cursor_line].len());
            return;
        }
    }

    // ---- Visual layout & vertical motion ----------------------------

    fn content_width(&self, width: u16) -> usize {
        let px = self.padding_x as usize * 2;
        let base = (width as usize).saturating_sub(px);
        if self.padding_x == 0 {
            base.saturating_sub(1).max(1)
        } else {
            base.max(1)
        }
    }

    fn build_layout(&self, content_width: usize) -> Vec<VisualLine> {
        let mut out = Vec::new();
        for (li, line) in self.lines.iter().enumerate() {
            if visible_width(line) <= content_width {
                out.push(VisualLine {
                    logical_line: li,
                    start_col: 0,
                    end_col: line.len() + 1,
                    text: line.clone(),
                });
                continue;
            }
            let chunks = word_wrap_line(line, content_width);
            let n = chunks.len();
            for (i, chunk) in chunks.into_iter().enumerate() {
                let end_col = if i + 1 < n {
                    // Ownership runs up to (but excluding) the next
                    // chunk's start; the wrap whitespace belongs to the
                    // earlier visual line.
                    0 // placeholder, fixed below
                } else {
                    line.len() + 1
                };
                out.push(VisualLine {
                    logical_line: li,
                    start_col: chunk.start_index,
                    end_col,
                    text: chunk.text,
                });
            }
            // Fix up end_col using next start_col now that all chunks for
            // this logical line are pushed.
            let base = out.len() - n;
            for i in 0..n.saturating_sub(1) {
                out[base + i].end_col = out[base + i + 1].start_col;
            }
        }
        out
    }

    fn visual_index_for_cursor(&self, layout: &[VisualLine]) -> usize {
        layout
            .iter()
            .position(|v| v.logical_line == self.cursor_line && self.cursor_col >= v.start_col && self.cursor_col < v.end_col)
            .unwrap_or_else(|| layout.len().saturating_sub(1))
    }

    fn visual_col_of_cursor(&self, v: &VisualLine) -> usize {
        let rel = self.cursor_col.saturating_sub(v.start_col).min(v.text.len());
        visible_width(&v.text[..rel.min(v.text.len())])
    }

    fn byte_offset_for_visual_col(text: &str, target_col: usize) -> usize {
        let mut col = 0usize;
        for g in graphemes(text) {
            if col >= target_col {
                return g.byte_start;
            }
            col += g.width;
        }
        text.len()
    }

    /// Move the cursor `delta` visual lines (negative = up), applying the
    /// sticky-column decision table that remembers the user's intended
    /// visual column across moves that land on a shorter line.
    fn vertical_move(&mut self, delta: isize, content_width: usize) {
        let layout = self.build_layout(content_width);
        if layout.is_empty() {
            return;
        }
        let current_idx = self.visual_index_for_cursor(&layout) as isize;
        let target_idx = (current_idx + delta).clamp(0, layout.len() as isize - 1) as usize;
        if target_idx as isize == current_idx {
            // Can't move further in that direction; still honor the
            // table's fall-through to current-line behavior only when
            // delta was genuinely absorbed at a boundary — no-op instead,
            // matching "no line above/below" as an edge case.
            return;
        }
        let current = &layout[current_idx as usize];
        let target = &layout[target_idx];
        let current_visual_col = self.visual_col_of_cursor(current);
        let current_width = visible_width(&current.text);
        let target_width = visible_width(&target.text);

        let p = self.preferred_col.is_some();
        let s = current_visual_col < current_width;
        let t = target_width < current_visual_col;
        let u = self.preferred_col.is_some_and(|pref| target_width < pref);

        let new_col;
        if !p {
            if !t {
                self.preferred_col = None;
                new_col = current_visual_col;
            } else {
                self.preferred_col = Some(current_visual_col);
                new_col = target_width;
            }
        } else if !s {
            if !t {
                // Target fits within (or exactly at) the preferred column
                // either way: the preferred column has been fully
                // resolved by this move (either reached outright, or
                // clamped to the target's end), so it is cleared rather
                // than carried further.
                new_col = if !u {
                    self.preferred_col.unwrap_or(current_visual_col)
                } else {
                    target_width
                };
                self.preferred_col = None;
            } else {
                new_col = target_width;
            }
        } else if !t {
            self.preferred_col = None;
            new_col = current_visual_col;
        } else {
            self.preferred_col = Some(current_visual_col);
            new_col = target_width;
        }

        let byte_off = Self::byte_offset_for_visual_col(&target.text, new_col.min(target_width));
        self.cursor_line = target.logical_line;
        self.cursor_col = target.start_col + byte_off;
    }

    /// Move the cursor one visual line up.
    pub fn move_up(&mut self, width: u16) {
        self.vertical_move(-1, self.content_width(width));
    }

    /// Move the cursor one visual line down.
    pub fn move_down(&mut self, width: u16) {
        self.vertical_move(1, self.content_width(width));
    }

    fn page_size(rows: u16) -> isize {
        (5usize.max((0.3 * rows as f64).floor() as usize)) as isize
    }

    /// Scroll the cursor a page (`max(5, floor(0.3 * rows))` visual
    /// lines) up.
    pub fn page_up(&mut self, width: u16, rows: u16) {
        self.vertical_move(-Self::page_size(rows), self.content_width(width));
    }

    /// Scroll the cursor a page down.
    pub fn page_down(&mut self, width: u16, rows: u16) {
        self.vertical_move(Self::page_size(rows), self.content_width(width));
    }

    // ---- Editing -----------------------------------------------------

    fn maybe_push_undo_for_insert(&mut self, ch: char) {
        let whitespace = ch.is_whitespace();
        if whitespace || self.last_action != LastAction::TypeWord {
            self.push_undo_forced();
        }
    }

    /// Insert one character at the cursor, handling undo coalescing and
    /// autocomplete auto-triggering.
    pub fn insert_char(&mut self, ch: char) {
        self.maybe_push_undo_for_insert(ch);
        let line = &mut self.lines[self.cursor_line];
        line.insert(self.cursor_col, ch);
        self.cursor_col += ch.len_utf8();
        self.history.go_live();
        self.last_action = if ch.is_whitespace() { LastAction::Other } else { LastAction::TypeWord };
        self.maybe_trigger_autocomplete(ch);
    }

    /// Insert a literal newline, splitting the current logical line.
    pub fn insert_newline(&mut self) {
        self.push_undo_forced();
        let line = &mut self.lines[self.cursor_line];
        let rest = line.split_off(self.cursor_col);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.preferred_col = None;
        self.history.go_live();
        self.last_action = LastAction::Other;
        self.refresh_autocomplete();
    }

    fn at_slash_trigger_position(&self) -> bool {
        self.cursor_line == 0 && self.cursor_col == 0
    }

    fn preceding_is_start_or_whitespace(&self, at: usize) -> bool {
        at == 0
            || self.grapheme_before(self.cursor_line, at)
                .is_some_and(|(start, _)| is_ws(&self.lines[self.cursor_line][start..at]))
    }

    fn maybe_trigger_autocomplete(&mut self, ch: char) {
        let before_insert_col = self.cursor_col - ch.len_utf8();
        let should_trigger = match ch {
            '/' => before_insert_col == 0 && self.at_slash_trigger_position(),
            '@' => self.preceding_is_start_or_whitespace(before_insert_col),
            c if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') => self.autocomplete.is_some(),
            _ => false,
        };
        if should_trigger {
            self.refresh_autocomplete();
        } else if ch != '/' && ch != '@' {
            // Non-trigger, non-continuation character typed while a
            // session was open: it no longer extends the token, so
            // re-evaluate (the provider will return None and we cancel).
            if self.autocomplete.is_some() {
                self.refresh_autocomplete();
            }
        }
    }

    fn current_token_prefix(&self) -> Option<String> {
        let line = &self.lines[self.cursor_line];
        let gs = graphemes(line);
        let mut start = self.cursor_col;
        let mut idx = gs.iter().rposition(|g| g.byte_start < self.cursor_col).map(|i| i + 1).unwrap_or(0);
        while idx > 0 && !is_ws(&gs[idx - 1].text) {
            idx -= 1;
        }
        start = gs.get(idx).map(|g| g.byte_start).unwrap_or(start.min(line.len()));
        if start >= self.cursor_col {
            return None;
        }
        Some(line[start..self.cursor_col].to_string())
    }

    /// Re-evaluate the autocomplete session against the current cursor
    /// context, consulting the provider. Cancels the session silently if
    /// the provider no longer matches.
    fn refresh_autocomplete(&mut self) {
        let Some(provider) = self.provider.as_ref() else {
            self.autocomplete = None;
            return;
        };
        let Some(token) = self.current_token_prefix() else {
            self.autocomplete = None;
            return;
        };
        if !(token.starts_with('/') || token.starts_with('@')) {
            self.autocomplete = None;
            return;
        }
        match provider.get_suggestions(&self.lines, self.cursor_line, self.cursor_col) {
            Some(suggestions) if !suggestions.items.is_empty() => {
                self.autocomplete = Some(AcSession::new(AcMode::Regular, suggestions));
            }
            _ => self.autocomplete = None,
        }
    }

    /// Force-trigger file-path autocomplete (e.g. bound to `Tab` outside a
    /// slash-command context) if the provider opts in.
    pub fn force_file_completion(&mut self) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };
        if !provider.should_trigger_file_completion(&self.lines, self.cursor_line, self.cursor_col) {
            return false;
        }
        if let Some(suggestions) = provider.get_force_file_suggestions(&self.lines, self.cursor_line, self.cursor_col) {
            self.autocomplete = Some(AcSession::new(AcMode::Force, suggestions));
            return true;
        }
        false
    }

    /// Grapheme-aware backspace; merges with the previous logical line at
    /// column 0.
    pub fn backspace(&mut self) {
        if let Some((start, _)) = self.grapheme_before(self.cursor_line, self.cursor_col) {
            self.push_undo_forced();
            let line = &mut self.lines[self.cursor_line];
            line.replace_range(start..self.cursor_col, "");
            self.cursor_col = start;
        } else if self.cursor_line > 0 {
            self.push_undo_forced();
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.lines[self.cursor_line].len();
            self.lines[self.cursor_line].push_str(&current);
        } else {
            return;
        }
        self.preferred_col = None;
        self.last_action = LastAction::Other;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Grapheme-aware forward delete; merges with the next logical line
    /// at end-of-line.
    pub fn delete_forward(&mut self) {
        self.push_undo_forced();
        if let Some(glen) = self.grapheme_after_len(self.cursor_line, self.cursor_col) {
            let line = &mut self.lines[self.cursor_line];
            line.replace_range(self.cursor_col..self.cursor_col + glen, "");
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
        } else {
            self.undo.undo(); // nothing happened; drop the speculative snapshot
            return;
        }
        self.preferred_col = None;
        self.last_action = LastAction::Other;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Delete from the cursor to the start of the line (or, at column 0,
    /// consume the newline joining it to the previous line), pushing the
    /// removed text to the kill ring.
    pub fn delete_to_line_start(&mut self) {
        self.push_undo_forced();
        let accumulate = self.last_action == LastAction::Kill;
        let killed = if self.cursor_col == 0 {
            if self.cursor_line == 0 {
                self.undo.undo();
                return;
            }
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.lines[self.cursor_line].len();
            self.lines[self.cursor_line].push_str(&current);
            "\n".to_string()
        } else {
            let removed: String = self.lines[self.cursor_line].drain(..self.cursor_col).collect();
            self.cursor_col = 0;
            removed
        };
        self.kill_ring.push(&killed, true, accumulate);
        self.preferred_col = None;
        self.last_action = LastAction::Kill;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Delete from the cursor to the end of the line (or, at end-of-line,
    /// consume the newline joining it to the next line).
    pub fn delete_to_line_end(&mut self) {
        self.push_undo_forced();
        let accumulate = self.last_action == LastAction::Kill;
        let line_len = self.lines[self.cursor_line].len();
        let killed = if self.cursor_col == line_len {
            if self.cursor_line + 1 >= self.lines.len() {
                self.undo.undo();
                return;
            }
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
            "\n".to_string()
        } else {
            self.lines[self.cursor_line].drain(self.cursor_col..).collect()
        };
        self.kill_ring.push(&killed, false, accumulate);
        self.preferred_col = None;
        self.last_action = LastAction::Kill;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Delete the word immediately before the cursor, killing it with
    /// `prepend=true`.
    pub fn delete_word_backward(&mut self) {
        self.push_undo_forced();
        let accumulate = self.last_action == LastAction::Kill;
        let (orig_line, orig_col) = (self.cursor_line, self.cursor_col);
        self.move_word_left();
        let killed = self.delete_range(self.cursor_line, self.cursor_col, orig_line, orig_col);
        self.kill_ring.push(&killed, true, accumulate);
        self.last_action = LastAction::Kill;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Delete the word immediately after the cursor, killing it with
    /// `prepend=false`.
    pub fn delete_word_forward(&mut self) {
        self.push_undo_forced();
        let accumulate = self.last_action == LastAction::Kill;
        let (orig_line, orig_col) = (self.cursor_line, self.cursor_col);
        self.move_word_right();
        let (end_line, end_col) = (self.cursor_line, self.cursor_col);
        self.cursor_line = orig_line;
        self.cursor_col = orig_col;
        let killed = self.delete_range(orig_line, orig_col, end_line, end_col);
        self.kill_ring.push(&killed, false, accumulate);
        self.last_action = LastAction::Kill;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    /// Delete `[from, to)` (possibly spanning logical lines) and return
    /// the removed text, leaving the cursor at `from`.
    fn delete_range(&mut self, from_line: usize, from_col: usize, to_line: usize, to_col: usize) -> String {
        if from_line == to_line {
            let removed: String = self.lines[from_line].drain(from_col..to_col).collect();
            self.cursor_line = from_line;
            self.cursor_col = from_col;
            return removed;
        }
        let mut removed = String::new();
        removed.push_str(&self.lines[from_line][from_col..]);
        removed.push('\n');
        for li in from_line + 1..to_line {
            removed.push_str(&self.lines[li]);
            removed.push('\n');
        }
        removed.push_str(&self.lines[to_line][..to_col]);
        let tail = self.lines[to_line][to_col..].to_string();
        self.lines.truncate(from_line + 1);
        self.lines[from_line].truncate(from_col);
        self.lines[from_line].push_str(&tail);
        self.cursor_line = from_line;
        self.cursor_col = from_col;
        removed
    }

    /// Insert the most recent kill-ring entry at the cursor.
    pub fn yank(&mut self) {
        let Some(text) = self.kill_ring.peek().map(str::to_string) else {
            return;
        };
        self.push_undo_forced();
        self.insert_text_raw(&text);
        self.last_action = LastAction::Yank;
        self.history.go_live();
    }

    /// Replace the just-yanked span with the ring's next-most-recent
    /// entry. Only valid immediately after a yank with at
    /// least two ring entries.
    pub fn yank_pop(&mut self) {
        if self.last_action != LastAction::Yank || self.kill_ring.len() < 2 {
            return;
        }
        let Some(prev_len) = self.kill_ring.peek().map(str::len) else {
            return;
        };
        // Remove the just-yanked text (it ends exactly at the cursor).
        let start = self.cursor_col.saturating_sub(prev_len);
        if self.lines[self.cursor_line].is_char_boundary(start) {
            self.lines[self.cursor_line].replace_range(start..self.cursor_col, "");
            self.cursor_col = start;
        }
        self.kill_ring.rotate();
        if let Some(text) = self.kill_ring.peek().map(str::to_string) {
            self.insert_text_raw(&text);
        }
        self.last_action = LastAction::Yank;
    }

    /// Insert possibly-multi-line text at the cursor without touching
    /// undo/kill-ring/autocomplete bookkeeping (used by yank and paste).
    fn insert_text_raw(&mut self, text: &str) {
        if !text.contains('\n') {
            self.lines[self.cursor_line].insert_str(self.cursor_col, text);
            self.cursor_col += text.len();
            return;
        }
        let mut parts = text.split('\n');
        let first = parts.next().unwrap_or_default();
        let rest: Vec<&str> = parts.collect();
        let tail = self.lines[self.cursor_line].split_off(self.cursor_col);
        self.lines[self.cursor_line].push_str(first);
        let mut insert_at = self.cursor_line + 1;
        for (i, part) in rest.iter().enumerate() {
            if i + 1 == rest.len() {
                let mut last_line = (*part).to_string();
                self.cursor_line = insert_at;
                self.cursor_col = last_line.len();
                last_line.push_str(&tail);
                self.lines.insert(insert_at, last_line);
            } else {
                self.lines.insert(insert_at, (*part).to_string());
            }
            insert_at += 1;
        }
        if rest.is_empty() {
            self.lines[self.cursor_line].push_str(&tail);
        }
    }

    // ---- Bracketed paste --------------------------------

    /// Feed raw bytes through the paste scanner; returns `true` if the
    /// bytes were (at least partly) consumed as paste content. Any
    /// pass-through bytes should still be dispatched by the caller as
    /// ordinary input.
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
        self.push_undo_forced();
        let mut text = raw.to_string();
        if paste::looks_path_like(&text) {
            let word_before = self
                .grapheme_before(self.cursor_line, self.cursor_col)
                .is_some_and(|(start, _)| Self::is_word_char(&self.lines[self.cursor_line][start..self.cursor_col]));
            if word_before {
                text.insert(0, ' ');
            }
        }
        if paste::is_large(&text) {
            let id = self.pastes.insert(text.clone());
            let marker = paste::marker_for(id, &text);
            self.insert_text_raw(&marker);
        } else if text.contains('\n') {
            self.insert_text_raw(&text);
        } else {
            for ch in text.chars() {
                self.lines[self.cursor_line].insert(self.cursor_col, ch);
                self.cursor_col += ch.len_utf8();
            }
        }
        self.last_action = LastAction::Other;
        self.history.go_live();
        self.refresh_autocomplete();
    }

    // ---- History ---------------------------------------

    fn history_older(&mut self) {
        self.push_undo_forced();
        if let Some(text) = self.history.older().map(str::to_string) {
            self.lines = text.split('\n').map(str::to_string).collect();
            self.cursor_line = self.lines.len() - 1;
            self.cursor_col = self.lines[self.cursor_line].len();
        } else {
            self.undo.undo();
        }
    }

    fn history_newer(&mut self) {
        self.push_undo_forced();
        match self.history.newer() {
            Some(text) => {
                let text = text.to_string();
                self.lines = text.split('\n').map(str::to_string).collect();
                self.cursor_line = self.lines.len() - 1;
                self.cursor_col = self.lines[self.cursor_line].len();
            }
            None => {
                self.lines = vec![String::new()];
                self.cursor_line = 0;
                self.cursor_col = 0;
            }
        }
    }

    // ---- Character jump --------------------------------

    /// Arm or cancel character-jump mode. Pressing the same direction's
    /// hotkey again while armed cancels it.
    pub fn toggle_jump(&mut self, direction: JumpDirection) {
        self.jump_mode = match self.jump_mode {
            JumpMode::Armed(d) if d == direction => JumpMode::None,
            _ => JumpMode::Armed(direction),
        };
    }

    /// Consume `target` as a jump target, moving the cursor to its next
    /// (forward) or previous (backward) occurrence, case-sensitive,
    /// multi-line, skipping the current cursor position. No-op (but still
    /// disarms) if no occurrence exists.
    fn consume_jump(&mut self, direction: JumpDirection, target: char) {
        self.jump_mode = JumpMode::None;
        match direction {
            JumpDirection::Forward => {
                let mut line = self.cursor_line;
                let mut search_from = self.cursor_col + self.grapheme_after_len(line, self.cursor_col).unwrap_or(1);
                loop {
                    if let Some(pos) = self.lines[line][search_from.min(self.lines[line].len())..]
                        .char_indices()
                        .find(|(_, c)| *c == target)
                        .map(|(i, _)| i + search_from)
                    {
                        self.cursor_line = line;
                        self.cursor_col = pos;
                        return;
                    }
                    if line + 1 >= self.lines.len() {
                        return;
                    }
                    line += 1;
                    search_from = 0;
                }
            }
            JumpDirection::Backward => {
                let mut line = self.cursor_line;
                let mut search_upto = self.cursor_col;
                loop {
                    if let Some(pos) = self.lines[line][..search_upto.min(self.lines[line].len())]
                        .char_indices()
                        .filter(|(_, c)| *c == target)
                        .next_back()
                        .map(|(i, _)| i)
                    {
                        self.cursor_line = line;
                        self.cursor_col = pos;
                        return;
                    }
                    if line == 0 {
                        return;
                    }
                    line -= 1;
                    search_upto = self.lines[line].len();
                }
            }
        }
        self.preferred_col = None;
    }

    // ---- Submission ----------------------------------------------------

    /// Trim visible text, re-inflate every paste marker to its stored
    /// content, push to history, and clear paste/history-browsing state.
    fn submit(&mut self) {
        let visible = self.text();
        let trimmed = visible.trim();
        let mut expanded = String::with_capacity(trimmed.len());
        let mut rest = trimmed;
        while let Some(start) = rest.find("[paste #") {
            expanded.push_str(&rest[..start]);
            let tail = &rest[start..];
            let Some(end) = tail.find(']') else {
                expanded.push_str(tail);
                rest = "";
                break;
            };
            let marker = &tail[..=end];
            let id: Option<u64> = marker
                .trim_start_matches("[paste #")
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok());
            match id.and_then(|id| self.pastes.get(id)) {
                Some(original) => expanded.push_str(original),
                None => expanded.push_str(marker),
            }
            rest = &tail[end + 1..];
        }
        expanded.push_str(rest);

        self.history.push(&expanded);
        self.history.go_live();
        self.pastes.clear();
        self.pending_submission = Some(expanded);

        self.lines = vec![String::new()];
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.preferred_col = None;
        self.last_action = LastAction::None;
        self.undo.clear();
    }

    // ---- Input dispatch -------------------

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
        self.dispatch_keys(&bytes);
    }

    fn dispatch_keys(&mut self, bytes: &[u8]) {
        let mut i = 0usize;
        while i < bytes.len() {
            i += self.dispatch_one(&bytes[i..]);
        }
    }

    /// Dispatch a single key/control sequence starting at `buf[0]`,
    /// returning the number of bytes consumed.
    fn dispatch_one(&mut self, buf: &[u8]) -> usize {
        if let JumpMode::Armed(dir) = self.jump_mode {
            if buf[0] == 0x1b {
                // A second control byte while armed: fall through below so
                // Escape itself (or a chord) still cancels/dispatches
                // normally rather than being swallowed as a jump target.
            } else if buf[0] >= 0x20 {
                if let Some((ch, len)) = decode_utf8_char(buf) {
                    self.consume_jump(dir, ch);
                    return len;
                }
            } else {
                self.jump_mode = JumpMode::None;
            }
        }

        if self.autocomplete.is_some() {
            if let Some(consumed) = self.dispatch_autocomplete_key(buf) {
                return consumed;
            }
        }

        match buf[0] {
            0x1b => self.dispatch_escape(buf),
            0x7f | 0x08 => {
                self.backspace();
                1
            }
            b'\r' | b'\n' => {
                self.on_enter();
                1
            }
            0x01 => {
                self.move_line_start();
                1
            }
            0x05 => {
                self.move_line_end();
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
                self.delete_to_line_end();
                1
            }
            0x15 => {
                self.delete_to_line_start();
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
            0x09 => {
                if !self.force_file_completion() {
                    self.insert_char('\t');
                }
                1
            }
            b if b >= 0x20 => {
                if let Some((ch, len)) = decode_utf8_char(buf) {
                    self.insert_char(ch);
                    len
                } else {
                    1
                }
            }
            _ => 1,
        }
    }

    fn dispatch_autocomplete_key(&mut self, buf: &[u8]) -> Option<usize> {
        match buf.first()? {
            0x1b if buf.get(1) == Some(&b'[') && buf.get(2) == Some(&b'A') => {
                if let Some(s) = self.autocomplete.as_mut() {
                    s.select_prev();
                }
                Some(3)
            }
            0x1b if buf.get(1) == Some(&b'[') && buf.get(2) == Some(&b'B') => {
                if let Some(s) = self.autocomplete.as_mut() {
                    s.select_next();
                }
                Some(3)
            }
            0x1b if buf.len() == 1 || buf.get(1) != Some(&b'[') => {
                self.autocomplete = None;
                Some(1)
            }
            0x09 => {
                self.accept_autocomplete();
                Some(1)
            }
            b'\r' | b'\n' => {
                let was_slash = self.autocomplete.as_ref().is_some_and(|s| s.prefix.starts_with('/'));
                self.accept_autocomplete();
                if was_slash {
                    self.on_enter();
                }
                Some(1)
            }
            _ => None,
        }
    }

    fn accept_autocomplete(&mut self) {
        let Some(session) = self.autocomplete.take() else { return };
        let Some(item) = session.selected_item() else { return };
        let Some(provider) = self.provider.as_ref() else { return };
        self.push_undo_forced();
        let applied = provider.apply_completion(&self.lines, self.cursor_line, self.cursor_col, item, &session.prefix);
        self.lines = applied.lines;
        self.cursor_line = applied.cursor_line;
        self.cursor_col = applied.cursor_col;
        self.last_action = LastAction::Other;
    }

    fn dispatch_escape(&mut self, buf: &[u8]) -> usize {
        if buf.len() == 1 {
            self.jump_mode = JumpMode::None;
            self.autocomplete = None;
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
            b'd' => {
                self.delete_word_forward();
                2
            }
            b'y' => {
                self.yank_pop();
                2
            }
            b'j' => {
                self.toggle_jump(JumpDirection::Forward);
                2
            }
            b'k' => {
                self.toggle_jump(JumpDirection::Backward);
                2
            }
            _ => 1,
        }
    }

    fn dispatch_csi(&mut self, buf: &[u8]) -> usize {
        // Find the final byte (0x40-0x7e) terminating the CSI sequence.
        let Some(final_pos) = buf.iter().skip(2).position(|&b| (0x40..=0x7e).contains(&b)).map(|p| p + 2) else {
            return buf.len();
        };
        let params = &buf[2..final_pos];
        let final_byte = buf[final_pos];
        let consumed = final_pos + 1;
        match final_byte {
            b'A' => {
                if !self.try_history_up(self.last_width) {
                    self.move_up(self.last_width);
                }
                consumed
            }
            b'B' => {
                if !self.try_history_down(self.last_width) {
                    self.move_down(self.last_width);
                }
                consumed
            }
            b'C' => {
                self.move_right();
                consumed
            }
            b'D' => {
                self.move_left();
                consumed
            }
            b'H' => {
                self.move_line_start();
                consumed
            }
            b'F' => {
                self.move_line_end();
                consumed
            }
            b'~' => {
                match params {
                    b"1" => self.move_line_start(),
                    b"4" => self.move_line_end(),
                    b"3" => self.delete_forward(),
                    b"5" => self.page_up(self.last_width, self.last_rows),
                    b"6" => self.page_down(self.last_width, self.last_rows),
                    _ => {}
                }
                consumed
            }
            _ => consumed,
        }
    }

    fn on_enter(&mut self) {
        if matches!(self.jump_mode, JumpMode::Armed(_)) {
            self.jump_mode = JumpMode::None;
        }
        // Submitting while browsing history clears the index and pastes
        // map per the Open Question resolution (DESIGN.md), regardless of
        // whether the index was live.
        self.submit();
    }

    /// Navigate submission history older (Up at the first visual line).
    /// Call when Up is pressed at the first visual line and no
    /// autocomplete session is active.
    pub fn try_history_up(&mut self, width: u16) -> bool {
        let layout = self.build_layout(self.content_width(width));
        let idx = self.visual_index_for_cursor(&layout);
        if idx == 0 && !self.history.is_empty() {
            self.history_older();
            true
        } else {
            false
        }
    }

    /// Navigate submission history newer (Down at the last visual line).
    /// Only fires while actually browsing history — at the bottom line of
    /// a live (non-browsing) buffer, Down falls through to normal cursor
    /// movement instead of clearing the buffer.
    pub fn try_history_down(&mut self, width: u16) -> bool {
        let layout = self.build_layout(self.content_width(width));
        let idx = self.visual_index_for_cursor(&layout);
        if idx + 1 >= layout.len() && !self.history.is_live() {
            self.history_newer();
            true
        } else {
            false
        }
    }

    // ---- Rendering ---------------------------------------

    fn max_visible_lines(rows: u16) -> usize {
        5usize.max((0.3 * rows as f64).floor() as usize)
    }
}

fn is_ws(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn is_punct(g: &str) -> bool {
    g.chars().all(|c| c.is_ascii_punctuation() && c != '_')
}

/// Decode the UTF-8 character starting at `buf[0]`, returning it and its
/// byte length, or `None` if `buf` doesn't start with a complete,
/// printable UTF-8 sequence.
fn decode_utf8_char(buf: &[u8]) -> Option<(char, usize)> {
    let len = utf8_len(buf[0])?;
    if buf.len() < len {
        return None;
    }
    std::str::from_utf8(&buf[..len]).ok()?.chars().next().map(|c| (c, len))
}

fn utf8_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7f => Some(1),
        0xc0..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf7 => Some(4),
        _ => None,
    }
}

impl Component for Editor {
    fn render(&mut self, width: u16) -> Vec<String> {
        self.last_width = width;
        let content_width = self.content_width(width);
        let layout = self.build_layout(content_width);
        let cursor_idx = self.visual_index_for_cursor(&layout);
        let max_visible = Self::max_visible_lines(self.last_rows).min(layout.len().max(1));

        if cursor_idx < self.scroll_offset {
            self.scroll_offset = cursor_idx;
        } else if cursor_idx >= self.scroll_offset + max_visible {
            self.scroll_offset = cursor_idx + 1 - max_visible;
        }
        let max_offset = layout.len().saturating_sub(max_visible);
        self.scroll_offset = self.scroll_offset.min(max_offset);

        let pad = " ".repeat(self.padding_x as usize);
        let mut out = Vec::new();

        let hidden_above = self.scroll_offset;
        if hidden_above > 0 {
            out.push(format!("{pad}\u{2191} {hidden_above} more lines"));
        } else {
            out.push(format!("\u{256d}{}\u{256e}", "\u{2500}".repeat(content_width.min(width as usize))));
        }

        let show_cursor_marker = self.focused && self.autocomplete.is_none();
        let end = (self.scroll_offset + max_visible).min(layout.len());
        for (i, v) in layout[self.scroll_offset..end].iter().enumerate() {
            let visual_idx = self.scroll_offset + i;
            let has_cursor = show_cursor_marker && visual_idx == cursor_idx;
            let mut line = format!("{pad}{}", v.text);
            if has_cursor {
                let col = self.visual_col_of_cursor(v);
                line = render_cursor_line(&pad, &v.text, col);
            }
            out.push(line);
        }

        let hidden_below = layout.len().saturating_sub(end);
        if hidden_below > 0 {
            out.push(format!("{pad}\u{2193} {hidden_below} more lines"));
        } else {
            out.push(format!("\u{2570}{}\u{256f}", "\u{2500}".repeat(content_width.min(width as usize))));
        }

        if let Some(session) = &self.autocomplete {
            let list = SelectList::new(&session.items, session.selected, 8);
            out.extend(list.render(width));
        }

        out
    }

    fn handle_input(&mut self, bytes: &[u8]) {
        self.handle_input_bytes(bytes);
    }

    fn invalidate(&mut self) {}

    fn set_rows_hint(&mut self, rows: u16) {
        self.last_rows = rows;
    }
}

impl Focusable for Editor {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

/// Render a single layout line with the cursor as an inverse-video glyph
/// over the grapheme at `visual_col`, or an inverse space at end-of-line.
fn render_cursor_line(pad: &str, text: &str, visual_col: usize) -> String {
    let mut out = String::new();
    out.push_str(pad);
    let mut col = 0usize;
    let mut placed = false;
    for g in graphemes(text) {
        if !placed && col == visual_col {
            out.push_str(CURSOR_MARKER);
            out.push_str("\x1b[7m");
            out.push_str(g.text);
            out.push_str("\x1b[27m");
            placed = true;
        } else {
            out.push_str(g.text);
        }
        col += g.width;
    }
    if !placed {
        out.push_str(CURSOR_MARKER);
        out.push_str("\x1b[7m \x1b[27m");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::{Applied, Suggestions};

    struct SlashProvider;
    impl AutocompleteProvider for SlashProvider {
        fn get_suggestions(&self, lines: &[String], cursor_line: usize, cursor_col: usize) -> Option<Suggestions> {
            let token = &lines[cursor_line][..cursor_col];
            if token.starts_with('/') {
                Some(Suggestions {
                    prefix: token.to_string(),
                    items: vec!["help".into(), "clear".into()],
                })
            } else {
                None
            }
        }

        fn apply_completion(&self, lines: &[String], cursor_line: usize, _cc: usize, selected: &str, _prefix: &str) -> Applied {
            let mut lines = lines.to_vec();
            lines[cursor_line] = format!("/{selected}");
            Applied {
                cursor_col: lines[cursor_line].len(),
                cursor_line,
                lines,
            }
        }
    }

    #[test]
    fn insert_and_cursor_bounds_invariant_2() {
        let mut ed = Editor::new();
        ed.insert_char('a');
        ed.insert_char('b');
        assert_eq!(ed.text(), "ab");
        let (line, col) = ed.cursor();
        assert!(line < ed.lines.len());
        assert!(col <= ed.lines[line].len());
    }

    #[test]
    fn backspace_merges_lines() {
        let mut ed = Editor::new();
        ed.insert_newline();
        ed.insert_char('x');
        ed.move_left();
        ed.backspace();
        assert_eq!(ed.text(), "x");
    }

    #[test]
    fn kill_yank_duality_scenario_c() {
        let mut ed = Editor::new();
        for ch in "hello world".chars() {
            ed.insert_char(ch);
        }
        ed.move_line_start();
        for _ in 0.."hello".len() {
            ed.move_right();
        }
        ed.delete_to_line_end();
        assert_eq!(ed.text(), "hello");
        ed.yank();
        assert_eq!(ed.text(), "hello world");
        let (_, col) = ed.cursor();
        assert_eq!(col, "hello world".len());
    }

    #[test]
    fn yank_pop_restores_earlier_kill() {
        let mut ed = Editor::new();
        for ch in "one two".chars() {
            ed.insert_char(ch);
        }
        ed.move_line_start();
        ed.delete_word_forward(); // kills "one "
        for ch in "two".chars() {
            ed.insert_char(ch);
        }
        ed.delete_word_backward(); // kills "two", separate ring entry
        ed.yank();
        assert!(ed.text().contains("two"));
        ed.yank_pop();
        assert!(ed.text().ends_with("one "));
    }

    #[test]
    fn undo_monotonicity_invariant_6() {
        let mut ed = Editor::new();
        let initial = ed.text();
        ed.insert_char(' ');
        ed.insert_char('a');
        ed.insert_char(' ');
        for _ in 0..3 {
            ed.undo();
        }
        assert_eq!(ed.text(), initial);
    }

    #[test]
    fn word_wrap_sticky_column_scenario_b() {
        let mut ed = Editor::new();
        ed.set_text("abcdefghij\nxy\nklmnop");
        ed.cursor_line = 0;
        ed.cursor_col = 9;
        ed.move_down(100);
        assert_eq!(ed.cursor(), (1, 2));
        assert_eq!(ed.preferred_col, Some(9));
        ed.move_down(100);
        assert_eq!(ed.cursor(), (2, 6));
        assert_eq!(ed.preferred_col, None);
    }

    #[test]
    fn large_paste_markerizes_and_resubmits_invariant_7() {
        let mut ed = Editor::new();
        let original: String = (0..12).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        ed.apply_paste(&original);
        assert!(ed.text().starts_with("[paste #1 +12 lines]"));
        ed.submit();
        let submitted = ed.take_submission().unwrap();
        assert_eq!(submitted, original);
    }

    #[test]
    fn slash_autocomplete_triggers_and_accepts() {
        let mut ed = Editor::new();
        ed.set_provider(Box::new(SlashProvider));
        ed.insert_char('/');
        assert!(ed.autocomplete.is_some());
        ed.dispatch_keys(b"\t");
        assert_eq!(ed.text(), "/help");
    }

    #[test]
    fn history_navigation_round_trip() {
        let mut ed = Editor::new();
        for ch in "first".chars() {
            ed.insert_char(ch);
        }
        ed.submit();
        ed.take_submission();
        for ch in "second".chars() {
            ed.insert_char(ch);
        }
        ed.submit();
        ed.take_submission();
        ed.history_older();
        assert_eq!(ed.text(), "second");
        ed.history_older();
        assert_eq!(ed.text(), "first");
        ed.history_newer();
        assert_eq!(ed.text(), "second");
    }

    #[test]
    fn character_jump_forward_moves_to_target() {
        let mut ed = Editor::new();
        ed.set_text("hello world");
        ed.cursor_line = 0;
        ed.cursor_col = 0;
        ed.toggle_jump(JumpDirection::Forward);
        ed.consume_jump(JumpDirection::Forward, 'o');
        assert_eq!(ed.cursor(), (0, 4));
        ed.toggle_jump(JumpDirection::Forward);
        ed.consume_jump(JumpDirection::Forward, 'o');
        assert_eq!(ed.cursor(), (0, 7));
    }

    #[test]
    fn no_over_width_lines_invariant_1() {
        let mut ed = Editor::new();
        ed.set_text("the quick brown fox jumps over the lazy dog and keeps going");
        for width in [10u16, 20, 40, 80] {
            let lines = ed.render(width);
            for line in &lines {
                assert!(visible_width(line) <= width as usize, "width {width}: {line:?}");
            }
        }
    }

    #[test]
    fn rows_hint_scales_max_visible_lines() {
        assert_eq!(Editor::max_visible_lines(24), 7);
        assert_eq!(Editor::max_visible_lines(50), 15);
        assert_eq!(Editor::max_visible_lines(10), 5);
    }

    #[test]
    fn set_rows_hint_changes_scroll_window_on_render() {
        let mut ed = Editor::new();
        for i in 0..20 {
            ed.insert_newline();
            ed.insert_char(char::from(b'a' + (i % 26) as u8));
        }

        ed.set_rows_hint(10);
        let short = ed.render(40);
        let short_visible = short.len() - 2; // minus top/bottom border or scroll-indicator rows

        ed.set_rows_hint(50);
        let tall = ed.render(40);
        let tall_visible = tall.len() - 2;

        assert!(tall_visible > short_visible, "tall={tall_visible} short={short_visible}");
    }

    #[test]
    fn page_down_key_uses_rows_hint_not_a_fixed_constant() {
        let mut ed = Editor::new();
        for i in 0..60 {
            ed.insert_newline();
            ed.insert_char(char::from(b'a' + (i % 26) as u8));
        }
        ed.cursor_line = 0;
        ed.cursor_col = 0;
        ed.set_rows_hint(50);

        ed.handle_input_bytes(b"\x1b[6~");
        assert_eq!(ed.cursor_line, Editor::max_visible_lines(50));
    }

    #[test]
    fn up_arrow_at_first_line_navigates_history() {
        let mut ed = Editor::new();
        for ch in "first".chars() {
            ed.insert_char(ch);
        }
        ed.submit();
        ed.take_submission();
        for ch in "second".chars() {
            ed.insert_char(ch);
        }
        ed.submit();
        ed.take_submission();

        ed.handle_input_bytes(b"\x1b[A");
        assert_eq!(ed.text(), "second");
        ed.handle_input_bytes(b"\x1b[A");
        assert_eq!(ed.text(), "first");
    }

    #[test]
    fn down_arrow_at_last_line_navigates_history_back_to_live() {
        let mut ed = Editor::new();
        for ch in "first".chars() {
            ed.insert_char(ch);
        }
        ed.submit();
        ed.take_submission();

        ed.handle_input_bytes(b"\x1b[A");
        assert_eq!(ed.text(), "first");
        ed.handle_input_bytes(b"\x1b[B");
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn down_arrow_at_last_line_of_live_buffer_does_not_clear_it() {
        let mut ed = Editor::new();
        for ch in "untouched".chars() {
            ed.insert_char(ch);
        }
        ed.handle_input_bytes(b"\x1b[B");
        assert_eq!(ed.text(), "untouched");
    }

    #[test]
    fn up_arrow_in_middle_of_multiline_buffer_moves_cursor_not_history() {
        let mut ed = Editor::new();
        ed.insert_char('a');
        ed.insert_newline();
        ed.insert_char('b');
        ed.submit();
        ed.take_submission();
        for ch in "xy".chars() {
            ed.insert_char(ch);
        }
        ed.insert_newline();
        for ch in "zz".chars() {
            ed.insert_char(ch);
        }
        assert_eq!(ed.cursor_line, 1);
        ed.handle_input_bytes(b"\x1b[A");
        assert_eq!(ed.text(), "xy\nzz");
        assert_eq!(ed.cursor_line, 0);
    }
}
