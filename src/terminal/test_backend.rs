//! In-memory terminal backend for tests.
//!
//! Records every byte written so assertions can inspect the exact escape
//! sequences the engine produced, and lets tests drive input/resize
//! callbacks directly instead of going through a real tty.

use std::sync::{Arc, Mutex};

use super::{InputCallback, ResizeCallback, Terminal};
use crate::error::Result;

/// A terminal double that records writes and exposes hooks to simulate
/// input and resize events.
pub struct TestTerminal {
    columns: u16,
    rows: u16,
    written: Arc<Mutex<Vec<u8>>>,
    on_input: Option<InputCallback>,
    on_resize: Option<ResizeCallback>,
    cursor_visible: bool,
    started: bool,
}

impl TestTerminal {
    /// Create a test terminal with the given initial size.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            written: Arc::new(Mutex::new(Vec::new())),
            on_input: None,
            on_resize: None,
            cursor_visible: true,
            started: false,
        }
    }

    /// All bytes written to the terminal since creation, as a lossy string.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }

    /// Clear recorded output without affecting terminal state.
    pub fn clear_output(&self) {
        self.written.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Whether the hardware cursor is currently shown.
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Feed raw bytes into the started input callback, as if typed.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        if let Some(cb) = self.on_input.as_mut() {
            cb(bytes);
        }
    }

    /// Simulate a resize, invoking the started resize callback.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        if let Some(cb) = self.on_resize.as_mut() {
            cb(columns, rows);
        }
    }

    /// A cloneable handle onto this terminal's recorded output, retained by
    /// a caller after the terminal itself has been moved into an `Engine`.
    pub fn output_handle(&self) -> OutputHandle {
        OutputHandle(Arc::clone(&self.written))
    }
}

/// A handle to a [`TestTerminal`]'s recorded output that outlives the
/// terminal's move into an `Engine`.
#[derive(Clone)]
pub struct OutputHandle(Arc<Mutex<Vec<u8>>>);

impl OutputHandle {
    /// Recorded bytes as a lossy string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }

    /// Clear recorded output.
    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Terminal for TestTerminal {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn start(&mut self, on_input: InputCallback, on_resize: ResizeCallback) -> Result<()> {
        self.on_input = Some(on_input);
        self.on_resize = Some(on_resize);
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.on_input = None;
        self.on_resize = None;
        self.started = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.cursor_visible = true;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.cursor_visible = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes() {
        let mut term = TestTerminal::new(80, 24);
        term.write(b"hello").unwrap();
        assert_eq!(term.output(), "hello");
    }

    #[test]
    fn feeds_input_after_start() {
        let mut term = TestTerminal::new(80, 24);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        term.start(
            Box::new(move |bytes| seen2.lock().unwrap_or_else(|e| e.into_inner()).extend_from_slice(bytes)),
            Box::new(|_, _| {}),
        )
        .unwrap();
        term.feed_input(b"abc");
        assert_eq!(&*seen.lock().unwrap_or_else(|e| e.into_inner()), b"abc");
    }

    #[test]
    fn resize_updates_dimensions() {
        let mut term = TestTerminal::new(80, 24);
        term.start(Box::new(|_| {}), Box::new(|_, _| {})).unwrap();
        term.resize(100, 40);
        assert_eq!(term.columns(), 100);
        assert_eq!(term.rows(), 40);
    }

    #[test]
    fn cursor_visibility_toggles() {
        let mut term = TestTerminal::new(80, 24);
        term.hide_cursor().unwrap();
        assert!(!term.cursor_visible());
        term.show_cursor().unwrap();
        assert!(term.cursor_visible());
    }
}
