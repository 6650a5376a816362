//! Bounded undo stack of immutable editor-state snapshots.
//!
//! Stores whole-state snapshots rather than invertible deltas, and is
//! undo-only — there is no redo stack.

const DEFAULT_CAPACITY: usize = 200;

/// A bounded LIFO stack of immutable state snapshots.
pub struct UndoStack<T> {
    snapshots: Vec<T>,
    capacity: usize,
}

impl<T> UndoStack<T> {
    /// Create an empty stack with the default capacity.
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Push a snapshot, taken *before* a coalescable mutation. Drops the
    /// oldest snapshot if the stack is at capacity.
    pub fn push(&mut self, snapshot: T) {
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
    }

    /// Pop the most recent snapshot, restoring it as the caller's current
    /// state. Returns `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<T> {
        self.snapshots.pop()
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Discard all snapshots.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_undo_restores_snapshot() {
        let mut stack: UndoStack<String> = UndoStack::new();
        stack.push("before".to_string());
        assert_eq!(stack.undo(), Some("before".to_string()));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn undo_is_lifo() {
        let mut stack: UndoStack<i32> = UndoStack::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.undo(), Some(3));
        assert_eq!(stack.undo(), Some(2));
        assert_eq!(stack.undo(), Some(1));
    }

    #[test]
    fn undo_monotonicity_invariant_6() {
        let mut stack: UndoStack<i32> = UndoStack::new();
        let initial = 0;
        let mut state = initial;
        for n in 1..=5 {
            stack.push(state);
            state = n;
        }
        for _ in 0..5 {
            state = stack.undo().unwrap();
        }
        assert_eq!(state, initial);
    }

    #[test]
    fn capacity_drops_oldest_snapshot() {
        let mut stack: UndoStack<usize> = UndoStack::new();
        for i in 0..DEFAULT_CAPACITY + 10 {
            stack.push(i);
        }
        assert_eq!(stack.len(), DEFAULT_CAPACITY);
        // The ten oldest snapshots (0..10) were dropped.
        let mut popped = Vec::new();
        while let Some(v) = stack.undo() {
            popped.push(v);
        }
        assert_eq!(*popped.last().unwrap(), 10);
    }
}
