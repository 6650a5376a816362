//! The component contract the engine renders and dispatches input to.
//!
//! Components are pull-based and byte-oriented: they are asked for lines on
//! demand rather than mutated in place, and receive raw input bytes so
//! implementations can handle protocol-level concerns (bracketed paste,
//! Kitty key release) without the engine pre-parsing them away.

/// Reserved, opaque, zero-width sentinel a focused component emits inside
/// its rendered output to mark where the hardware cursor belongs. The
/// engine is the only code that scans for and strips this token; every
/// other consumer must treat it as an uninterpreted byte sequence.
///
/// Modeled as an APC (Application Program Command) string, a class of
/// escape sequence real terminals universally ignore.
pub const CURSOR_MARKER: &str = "\x1b_tuicore:cursor\x1b\\";

/// A value the engine can render and, if focused, forward input to.
///
/// `render` must be pure and synchronous for a given `(state, width)`: the
/// engine may call it multiple times per tick and relies on referential
/// transparency to decide whether a redraw is needed.
pub trait Component {
    /// Project current state to a sequence of styled text rows sized to
    /// `width` visible columns. Must not exceed `width` per emitted line.
    fn render(&mut self, width: u16) -> Vec<String>;

    /// Handle a chunk of raw input bytes. Only invoked while this
    /// component is focused. Default: ignore.
    fn handle_input(&mut self, _bytes: &[u8]) {}

    /// Clear any cached render so the next `render` call recomputes from
    /// scratch.
    fn invalidate(&mut self) {}

    /// Whether this component wants Kitty-protocol key-release events
    /// forwarded to `handle_input`. By default the engine filters them.
    fn wants_key_release(&self) -> bool {
        false
    }

    /// Hint the component about the terminal's current row count. Called by
    /// the engine once per tick, before `render`, on every child and
    /// overlay. `render` itself stays width-only so this stays a separate,
    /// ignorable hook rather than widening the dispatch boundary for every
    /// component; only ones whose layout depends on viewport height (e.g.
    /// a multi-line editor's visible-line window) need to override it.
    fn set_rows_hint(&mut self, _rows: u16) {}
}

/// A component that can hold the engine's focus and place the hardware
/// cursor. The engine owns `focused`; components must never set it
/// themselves outside of the engine's focus-transition code path.
pub trait Focusable: Component {
    /// Whether this component currently holds engine focus.
    fn is_focused(&self) -> bool;

    /// Set or clear focus. Called only by the engine during a focus
    /// transition.
    fn set_focused(&mut self, focused: bool);
}

/// Owns an ordered sequence of child components; rendering concatenates
/// the children's rendered lines in order.
#[derive(Default)]
pub struct Container {
    children: Vec<Box<dyn Component>>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Append a child component.
    pub fn push(&mut self, child: Box<dyn Component>) {
        self.children.push(child);
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterate over children.
    pub fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    /// Mutably iterate over children.
    pub fn children_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.children
    }
}

impl Component for Container {
    fn render(&mut self, width: u16) -> Vec<String> {
        let mut lines = Vec::new();
        for child in &mut self.children {
            lines.extend(child.render(width));
        }
        lines
    }

    fn invalidate(&mut self) {
        for child in &mut self.children {
            child.invalidate();
        }
    }

    fn set_rows_hint(&mut self, rows: u16) {
        for child in &mut self.children {
            child.set_rows_hint(rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<String>);

    impl Component for Fixed {
        fn render(&mut self, _width: u16) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn container_concatenates_children() {
        let mut c = Container::new();
        c.push(Box::new(Fixed(vec!["a".into(), "b".into()])));
        c.push(Box::new(Fixed(vec!["c".into()])));
        assert_eq!(c.render(80), vec!["a", "b", "c"]);
    }

    #[test]
    fn cursor_marker_is_not_empty_and_not_visible() {
        use crate::width::visible_width;
        assert!(!CURSOR_MARKER.is_empty());
        assert_eq!(visible_width(CURSOR_MARKER), 0);
    }
}
