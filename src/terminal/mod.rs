//! The terminal driver: the engine's only collaborator that touches the tty.
//!
//! A [`Terminal`] owns raw-mode toggling, current dimensions, writing raw
//! bytes, and forwarding input/resize notifications. It holds no UI state
//! of its own.

mod crossterm_backend;
#[cfg(any(test, feature = "test-backend"))]
mod test_backend;

pub use crossterm_backend::CrosstermTerminal;
#[cfg(any(test, feature = "test-backend"))]
pub use test_backend::{OutputHandle, TestTerminal};

use crate::error::Result;

/// Callback invoked with a chunk of raw input bytes.
pub type InputCallback = Box<dyn FnMut(&[u8]) + Send>;
/// Callback invoked with the new `(columns, rows)` on resize.
pub type ResizeCallback = Box<dyn FnMut(u16, u16) + Send>;

/// Abstraction over the tty. Implementations deliver raw byte input and
/// resize events to the engine and carry raw bytes to the device; they
/// never interpret UI semantics.
pub trait Terminal: Send {
    /// Current terminal width in columns.
    fn columns(&self) -> u16;

    /// Current terminal height in rows.
    fn rows(&self) -> u16;

    /// Write raw bytes to the terminal, unbuffered beyond the OS write.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush any OS-level output buffering.
    fn flush(&mut self) -> Result<()>;

    /// Begin delivering input and resize events to the given callbacks.
    /// Must put the terminal in raw mode and enable bracketed paste.
    fn start(&mut self, on_input: InputCallback, on_resize: ResizeCallback) -> Result<()>;

    /// Stop delivering events and restore the terminal's prior mode.
    fn stop(&mut self) -> Result<()>;

    /// Show the hardware cursor.
    fn show_cursor(&mut self) -> Result<()>;

    /// Hide the hardware cursor.
    fn hide_cursor(&mut self) -> Result<()>;
}
