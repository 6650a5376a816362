//! Bounded kill ring: emacs-style rotating buffer of killed text fragments.
//!
//! Capped and oldest-dropped like [`crate::undo::UndoStack`], applied here
//! to killed text instead of undo snapshots.

const DEFAULT_CAPACITY: usize = 60;

/// A bounded ordered sequence of killed text fragments supporting yank and
/// yank-pop.
pub struct KillRing {
    entries: Vec<String>,
    capacity: usize,
}

impl KillRing {
    /// Create an empty kill ring with the default capacity.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Push a killed fragment. If `accumulate` is set and the ring is
    /// non-empty, the fragment is merged into the most-recent entry
    /// instead of becoming a new one — `prepend` controls which side of
    /// the existing entry it joins (backwards deletes prepend, forward
    /// deletes append).
    pub fn push(&mut self, text: &str, prepend: bool, accumulate: bool) {
        if text.is_empty() {
            return;
        }
        if accumulate {
            if let Some(top) = self.entries.last_mut() {
                if prepend {
                    top.insert_str(0, text);
                } else {
                    top.push_str(text);
                }
                return;
            }
        }
        self.entries.push(text.to_string());
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    /// The most-recently killed entry, if any.
    pub fn peek(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Rotate the ring: move the most-recent entry to the front, so the
    /// next `peek` returns the second-most-recent entry.
    pub fn rotate(&mut self) {
        if let Some(top) = self.entries.pop() {
            self.entries.insert(0, top);
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_peek() {
        let mut ring = KillRing::new();
        ring.push("abc", false, false);
        assert_eq!(ring.peek(), Some("abc"));
    }

    #[test]
    fn accumulate_appends_when_not_prepend() {
        let mut ring = KillRing::new();
        ring.push("foo", false, false);
        ring.push("bar", false, true);
        assert_eq!(ring.peek(), Some("foobar"));
    }

    #[test]
    fn accumulate_prepends_for_backward_kills() {
        let mut ring = KillRing::new();
        ring.push("bar", true, false);
        ring.push("foo", true, true);
        assert_eq!(ring.peek(), Some("foobar"));
    }

    #[test]
    fn rotate_cycles_yank_pop_target() {
        let mut ring = KillRing::new();
        ring.push("first", false, false);
        ring.push("second", false, false);
        assert_eq!(ring.peek(), Some("second"));
        ring.rotate();
        assert_eq!(ring.peek(), Some("first"));
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut ring = KillRing::new();
        for i in 0..DEFAULT_CAPACITY + 5 {
            ring.push(&format!("entry{i}"), false, false);
        }
        assert_eq!(ring.len(), DEFAULT_CAPACITY);
        assert_eq!(ring.peek(), Some(format!("entry{}", DEFAULT_CAPACITY + 4).as_str()));
    }

    #[test]
    fn kill_yank_duality_scenario_c() {
        // hello world, cursor after "hello": delete_to_line_end kills
        // " world"; yank restores it.
        let mut ring = KillRing::new();
        let mut text = "hello world".to_string();
        let killed = text.split_off(5);
        ring.push(&killed, false, false);
        assert_eq!(text, "hello");
        text.push_str(ring.peek().unwrap());
        assert_eq!(text, "hello world");
    }
}
