//! Crossterm-backed terminal driver.
//!
//! Raw mode, alternate-screen, and bracketed paste are managed through
//! crossterm, but input is read as raw bytes off stdin rather than through
//! crossterm's parsed event stream: the engine needs the exact byte
//! sequences of bracketed-paste payloads, Kitty key-release events, and the
//! cell-size probe response, none of which survive crossterm's `KeyEvent`
//! parsing intact.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::terminal;

use super::{InputCallback, ResizeCallback, Terminal};
use crate::error::{Result, TuiError};

/// Terminal backend using crossterm for raw-mode/alternate-screen control
/// and a dedicated reader thread for raw stdin bytes.
pub struct CrosstermTerminal {
    raw_mode: bool,
    running: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
    resizer: Option<thread::JoinHandle<()>>,
}

impl CrosstermTerminal {
    /// Create a new, not-yet-started crossterm terminal driver.
    pub fn new() -> Self {
        Self {
            raw_mode: false,
            running: Arc::new(AtomicBool::new(false)),
            reader: None,
            resizer: None,
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn columns(&self) -> u16 {
        terminal::size().map(|(w, _)| w).unwrap_or(80)
    }

    fn rows(&self) -> u16 {
        terminal::size().map(|(_, h)| h).unwrap_or(24)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        io::stdout().write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn start(&mut self, mut on_input: InputCallback, mut on_resize: ResizeCallback) -> Result<()> {
        if self.raw_mode {
            return Ok(());
        }
        terminal::enable_raw_mode().map_err(|e| TuiError::Terminal(e.to_string()))?;
        // Bracketed paste: CSI ?2004h. Synchronized output and bracketed
        // paste are both opt-in modes the terminal may ignore silently.
        io::stdout().write_all(b"\x1b[?2004h")?;
        io::stdout().flush()?;
        self.raw_mode = true;
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        self.reader = Some(thread::spawn(move || {
            let mut stdin = io::stdin();
            let mut buf = [0u8; 4096];
            while running.load(Ordering::SeqCst) {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => on_input(&buf[..n]),
                    Err(_) => break,
                }
            }
        }));

        let running = Arc::clone(&self.running);
        let mut last = terminal::size().unwrap_or((80, 24));
        self.resizer = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(50));
                if let Ok(size) = terminal::size() {
                    if size != last {
                        last = size;
                        on_resize(size.0, size.1);
                    }
                }
            }
        }));

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.raw_mode {
            return Ok(());
        }
        self.running.store(false, Ordering::SeqCst);
        io::stdout().write_all(b"\x1b[?2004l")?;
        io::stdout().flush()?;
        terminal::disable_raw_mode().map_err(|e| TuiError::Terminal(e.to_string()))?;
        self.raw_mode = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        io::stdout().write_all(b"\x1b[?25h")?;
        io::stdout().flush()?;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        io::stdout().write_all(b"\x1b[?25l")?;
        io::stdout().flush()?;
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
