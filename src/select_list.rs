//! A small scrollable, selection-highlighting list used to render the
//! editor's autocomplete pane.
//!
//! Pure rendering: selection index and scroll offset are supplied by the
//! caller each frame via the pull-based `render(width) -> lines` contract
//! the rest of the crate uses.

use crate::width::{truncate_to_width, visible_width, RESET_SENTINEL};

/// A read-only view used purely for rendering; selection/scrolling is
/// driven by [`crate::autocomplete::Session`], not owned here.
pub struct SelectList<'a> {
    items: &'a [String],
    selected: usize,
    max_visible: usize,
}

impl<'a> SelectList<'a> {
    /// Build a view over `items`, highlighting `selected`, showing at most
    /// `max_visible` rows (scrolling to keep the selection visible).
    pub fn new(items: &'a [String], selected: usize, max_visible: usize) -> Self {
        Self {
            items,
            selected,
            max_visible: max_visible.max(1),
        }
    }

    fn scroll_offset(&self) -> usize {
        if self.items.len() <= self.max_visible {
            return 0;
        }
        if self.selected < self.max_visible / 2 {
            0
        } else if self.selected >= self.items.len() - self.max_visible / 2 {
            self.items.len() - self.max_visible
        } else {
            self.selected - self.max_visible / 2
        }
    }

    /// Render the list at the given content width.
    pub fn render(&self, width: u16) -> Vec<String> {
        if self.items.is_empty() {
            return Vec::new();
        }
        let offset = self.scroll_offset();
        let end = (offset + self.max_visible).min(self.items.len());
        (offset..end)
            .map(|i| {
                let text = truncate_to_width(&self.items[i], width as usize);
                let padded = pad(&text, width as usize);
                if i == self.selected {
                    format!("\x1b[7m{padded}{RESET_SENTINEL}")
                } else {
                    padded
                }
            })
            .collect()
    }
}

fn pad(line: &str, width: usize) -> String {
    let w = visible_width(line);
    if w >= width {
        line.to_string()
    } else {
        format!("{line}{}", " ".repeat(width - w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_items_when_under_max_visible() {
        let items = vec!["a".to_string(), "b".to_string()];
        let list = SelectList::new(&items, 0, 10);
        let lines = list.render(10);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn selected_item_is_inverse_video() {
        let items = vec!["a".to_string(), "b".to_string()];
        let list = SelectList::new(&items, 1, 10);
        let lines = list.render(5);
        assert!(lines[1].starts_with("\x1b[7m"));
        assert!(!lines[0].starts_with("\x1b[7m"));
    }

    #[test]
    fn scrolls_to_keep_selection_visible() {
        let items: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let list = SelectList::new(&items, 19, 5);
        let lines = list.render(5);
        assert_eq!(lines.len(), 5);
        // The selected item (19, inverse-video) must be among the rendered rows.
        assert!(lines.iter().any(|l| l.contains("\x1b[7m")));
    }

    #[test]
    fn rows_never_exceed_width() {
        let items = vec!["a very very long item that overflows".to_string()];
        let list = SelectList::new(&items, 0, 5);
        let lines = list.render(10);
        for line in &lines {
            assert!(visible_width(line) <= 10);
        }
    }
}
