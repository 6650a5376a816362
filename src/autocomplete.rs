//! Autocomplete provider contract and the editor's autocomplete session
//! state.
//!
//! Candidate generation is delegated to an injected [`AutocompleteProvider`]
//! so the editor never depends on any particular completion source; fuzzy
//! ranking within a session uses the same matcher idiom as the rest of the
//! crate's list-filtering widgets.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Suggestions returned for the token under the cursor.
pub struct Suggestions {
    /// The prefix (e.g. `/foo` or `@bar`) the suggestions are scoped to.
    pub prefix: String,
    /// Candidate completion items, most-relevant first.
    pub items: Vec<String>,
}

/// The result of applying a completion: the full new buffer plus cursor
/// position.
pub struct Applied {
    /// The editor's full logical-line buffer after the completion.
    pub lines: Vec<String>,
    /// New cursor line index.
    pub cursor_line: usize,
    /// New cursor byte offset within `cursor_line`.
    pub cursor_col: usize,
}

/// Injected dependency the editor delegates candidate generation and
/// acceptance to.
pub trait AutocompleteProvider {
    /// Compute suggestions for the token under the cursor, or `None` if
    /// nothing should trigger.
    fn get_suggestions(&self, lines: &[String], cursor_line: usize, cursor_col: usize) -> Option<Suggestions>;

    /// Apply `selected_item` (one of the items previously returned for
    /// `prefix`) at the given cursor position.
    fn apply_completion(
        &self,
        lines: &[String],
        cursor_line: usize,
        cursor_col: usize,
        selected_item: &str,
        prefix: &str,
    ) -> Applied;

    /// Force-triggered file-path suggestions (`Tab` outside a slash-command
    /// context). Optional: default implementation offers none.
    fn get_force_file_suggestions(&self, _lines: &[String], _cursor_line: usize, _cursor_col: usize) -> Option<Suggestions> {
        None
    }

    /// Whether the force file-completion path should trigger at all,
    /// given the current cursor position.
    fn should_trigger_file_completion(&self, _lines: &[String], _cursor_line: usize, _cursor_col: usize) -> bool {
        false
    }
}

/// Which kind of autocomplete session is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Triggered by `/` or `@` context, as text is typed.
    Regular,
    /// Explicitly force-triggered (e.g. `Tab` for file completion).
    Force,
}

/// The editor's live autocomplete session: `{ mode, prefix, list }` plus a
/// selection cursor into the list.
pub struct Session {
    /// Which trigger produced this session.
    pub mode: Mode,
    /// The scoping prefix (e.g. `/` or `@foo`).
    pub prefix: String,
    /// Candidate items.
    pub items: Vec<String>,
    /// Index of the currently highlighted item.
    pub selected: usize,
}

impl Session {
    /// Start a new session from a provider's suggestions, re-ranking the
    /// candidates by fuzzy match against the typed query (the text after
    /// the triggering `/` or `@`): best `SkimMatcherV2` score first,
    /// non-matches dropped.
    pub fn new(mode: Mode, suggestions: Suggestions) -> Self {
        let query = suggestions.prefix.trim_start_matches(['/', '@']);
        let items = fuzzy_rank(suggestions.items, query);
        Self {
            mode,
            prefix: suggestions.prefix,
            items,
            selected: 0,
        }
    }

    /// Move the selection down, wrapping to the top.
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    /// Move the selection up, wrapping to the bottom.
    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + self.items.len() - 1) % self.items.len();
    }

    /// The currently selected item, if any.
    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Whether the prefix still has at least one matching item; if not,
    /// the caller should cancel the session and auto-cancel silently.
    pub fn has_matches(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Re-order `items` by `SkimMatcherV2` fuzzy-match score against `query`,
/// best match first, dropping items that don't match at all. An empty
/// query (nothing typed yet past the trigger character) keeps the
/// provider's original order, since there is nothing to rank against.
fn fuzzy_rank(items: Vec<String>, query: &str) -> Vec<String> {
    if query.is_empty() {
        return items;
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(String, i64)> = items
        .into_iter()
        .filter_map(|item| matcher.fuzzy_match(&item, query).map(|score| (item, score)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(item, _)| item).collect()
}
