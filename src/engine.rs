//! The TUI engine: a `Container` plus render/focus/overlay orchestration.
//!
//! Owns a single focus slot over the `Container`'s children plus the
//! overlay stack, synchronized-output framing, the full-vs-incremental
//! redraw decision, and crash-log-on-overflow teardown.

use std::collections::VecDeque;
use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::component::{Component, Container, CURSOR_MARKER};
use crate::compositor::composite;
use crate::error::{Result, TuiError};
use crate::overlay::{resolve_position, resolve_size, OverlayEntry, OverlayHandle, OverlayOptions};
use crate::terminal::Terminal;
use crate::width::{graphemes, visible_width, RESET_SENTINEL};

/// Environment-sourced engine configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    /// `HARDWARE_CURSOR=1`: render the hardware cursor as an additional
    /// visual indicator even when a component already draws one inline.
    pub hardware_cursor: bool,
    /// `CLEAR_ON_SHRINK=1`: force a full redraw when content height shrinks
    /// and no overlay is active.
    pub clear_on_shrink: bool,
    /// `DEBUG_REDRAW=1`: log the reason for each full redraw.
    pub debug_redraw: bool,
    /// `TUI_DEBUG=1`: dump per-render state via `tracing` at `debug` level.
    pub tui_debug: bool,
}

impl EngineConfig {
    /// Read configuration from the four documented environment variables.
    /// Unset or non-`"1"` values default to `false`. Read once at engine
    /// construction, not per tick.
    pub fn from_env() -> Self {
        let is_set = |name: &str| std::env::var(name).as_deref() == Ok("1");
        Self {
            hardware_cursor: is_set("HARDWARE_CURSOR"),
            clear_on_shrink: is_set("CLEAR_ON_SHRINK"),
            debug_redraw: is_set("DEBUG_REDRAW"),
            tui_debug: is_set("TUI_DEBUG"),
        }
    }
}

/// Why a full redraw was chosen, for `DEBUG_REDRAW` logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FullRedrawReason {
    FirstRender,
    WidthChanged,
    ShrankBelowWorkingArea,
    ChangeAboveViewport,
}

impl std::fmt::Display for FullRedrawReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FirstRender => "first render",
            Self::WidthChanged => "width changed",
            Self::ShrankBelowWorkingArea => "content shrank below working area",
            Self::ChangeAboveViewport => "first changed line above viewport",
        };
        f.write_str(s)
    }
}

/// State of the one-shot cell-size probe (`CSI 16 t` → `CSI 6;h;w t`).
#[derive(Default)]
struct CellProbe {
    in_flight: bool,
    resolved: Option<(u16, u16)>,
}

/// The TUI engine: owns the terminal, the component tree, the overlay
/// stack, and focus.
pub struct Engine {
    terminal: Box<dyn Terminal>,
    root: Container,
    overlays: Vec<OverlayEntry>,
    /// `Some(index)` focuses a root child; `None` with a nonempty overlay
    /// stack means the topmost visible overlay holds focus; `None` with no
    /// overlays means nothing is focused.
    focus: Option<usize>,
    prev_lines: Vec<String>,
    prev_width: u16,
    max_working_height: u16,
    /// The row, among `prev_lines`, the real hardware cursor currently sits
    /// on. Tracked explicitly rather than assumed to be `prev_lines.len() -
    /// 1`, since `position_hardware_cursor` may leave it parked on an
    /// interior row (the extracted cursor-marker location).
    physical_cursor_row: usize,
    render_pending: bool,
    force_next_render: bool,
    config: EngineConfig,
    cell_probe: CellProbe,
    next_overlay_id: u64,
    debug_shortcut: Option<Box<dyn FnMut() + Send>>,
    crash_log_dir: Option<std::path::PathBuf>,
    started: bool,
    /// Input chunks handed off from the terminal driver's (possibly
    /// background-threaded) `on_input` callback. Drained into
    /// `handle_input` from `tick()` so state mutation stays on the single
    /// cooperative event-loop thread even though the crossterm backend's
    /// reader thread delivers bytes asynchronously.
    pending_input: Arc<Mutex<VecDeque<Vec<u8>>>>,
    /// Most recent resize seen by the `on_resize` callback, drained the
    /// same way; the actual dimensions are re-read from the terminal at
    /// render time, so this only needs to know *that* a resize happened.
    pending_resize: Arc<Mutex<Option<(u16, u16)>>>,
}

impl Engine {
    /// Construct an engine over `terminal`, initially empty and unfocused.
    pub fn new(terminal: Box<dyn Terminal>, config: EngineConfig) -> Self {
        Self {
            terminal,
            root: Container::new(),
            overlays: Vec::new(),
            focus: None,
            prev_lines: Vec::new(),
            prev_width: 0,
            max_working_height: 0,
            physical_cursor_row: 0,
            render_pending: true,
            force_next_render: true,
            config,
            cell_probe: CellProbe::default(),
            next_overlay_id: 1,
            debug_shortcut: None,
            crash_log_dir: None,
            started: false,
            pending_input: Arc::new(Mutex::new(VecDeque::new())),
            pending_resize: Arc::new(Mutex::new(None)),
        }
    }

    /// Directory crash/debug logs are written to, an operator-chosen
    /// location. Defaults to the current directory if unset.
    pub fn set_crash_log_dir(&mut self, dir: impl Into<std::path::PathBuf>) {
        self.crash_log_dir = Some(dir.into());
    }

    /// Install the callback for the engine's global debug shortcut
    /// (`Shift+Ctrl+D`).
    pub fn set_debug_shortcut(&mut self, callback: Box<dyn FnMut() + Send>) {
        self.debug_shortcut = Some(callback);
    }

    /// Append a root-level child to the component tree.
    pub fn push_child(&mut self, child: Box<dyn Component>) {
        self.root.push(child);
    }

    /// Number of root-level children.
    pub fn child_count(&self) -> usize {
        self.root.len()
    }

    // ---- Render request coalescing ----------------------

    /// Mark a render as needed. The actual render happens on the next call
    /// to [`Engine::tick`]; multiple calls before the next tick collapse
    /// into one render. `force=true` clears the previous-lines cache so the
    /// next render is unconditionally a full redraw.
    pub fn request_render(&mut self, force: bool) {
        self.render_pending = true;
        if force {
            self.force_next_render = true;
        }
    }

    /// Run one cooperative tick: drain any input/resize events the
    /// terminal driver handed off since the last tick, then, if a render
    /// is pending, perform it.
    pub fn tick(&mut self) -> Result<()> {
        self.drain_pending_events();
        if !self.render_pending {
            return Ok(());
        }
        self.render_pending = false;
        self.render()
    }

    /// Move queued input chunks and the latest resize, if any, from the
    /// terminal driver's callbacks onto the event-loop thread, dispatching
    /// each input chunk through `handle_input` in delivery order.
    fn drain_pending_events(&mut self) {
        let chunks: Vec<Vec<u8>> = {
            let mut queue = self.pending_input.lock().unwrap_or_else(|e| e.into_inner());
            queue.drain(..).collect()
        };
        for chunk in chunks {
            self.handle_input(&chunk);
        }
        let resized = self.pending_resize.lock().unwrap_or_else(|e| e.into_inner()).take();
        if resized.is_some() {
            self.request_render(false);
        }
    }

    // ---- Focus ------------------------------------------

    /// Set focus to root child `index`, clearing focus elsewhere and
    /// requesting a render.
    ///
    /// `Container` holds `Box<dyn Component>`, not `Box<dyn Focusable>` —
    /// `Component` is the engine's dispatch boundary, and not every
    /// component needs a `focused` flag. The engine therefore tracks
    /// *which* index holds focus but cannot itself toggle a child's
    /// `Focusable::set_focused`; an embedder holding a concrete `Editor`/
    /// `Input` handle alongside the one pushed into the tree calls
    /// `set_focused` on it directly in response to this same transition.
    pub fn set_focus(&mut self, index: usize) {
        self.focus = Some(index);
        self.request_render(false);
    }

    /// Show `component` as a new topmost overlay, capturing current focus
    /// as `pre_focus` and focusing the overlay if it is currently visible.
    /// Returns a handle the caller can use to hide it.
    pub fn show_overlay(&mut self, component: Box<dyn Component>, options: OverlayOptions) -> OverlayHandle {
        let id = self.next_overlay_id;
        self.next_overlay_id += 1;
        let pre_focus = self.focus;
        let entry = OverlayEntry::new(id, component, options, pre_focus);
        let handle = entry.handle();
        self.overlays.push(entry);
        self.focus = None; // overlay stack now owns focus implicitly (topmost visible)
        self.request_render(false);
        handle
    }

    /// Hide the overlay identified by `handle`. Focus is restored to the
    /// next topmost still-visible overlay, else to the overlay's captured
    /// `pre_focus`.
    pub fn hide_overlay(&mut self, handle: &OverlayHandle) {
        handle.hide();
        if let Some(idx) = self.overlays.iter().position(|o| o.id == handle.id) {
            let pre_focus = self.overlays[idx].pre_focus;
            if !self.overlays.iter().any(|o| !o.is_hidden()) {
                self.focus = pre_focus;
            }
        }
        self.request_render(false);
    }

    /// Drop fully-hidden overlays that will never be shown again. Call
    /// periodically; the engine never does this implicitly since a handle
    /// may still toggle `set_hidden(false)` later.
    pub fn remove_overlay(&mut self, handle: &OverlayHandle) {
        self.overlays.retain(|o| o.id != handle.id);
        self.request_render(false);
    }

    fn reconcile_focus(&mut self, cols: u16, rows: u16) {
        let focused_overlay_visible = self
            .overlays
            .last()
            .is_some_and(|o| !o.is_hidden() && o.options.is_visible(cols, rows));
        if self.focus.is_none() && !focused_overlay_visible {
            // Topmost visible overlay, scanning from the top of the stack.
            if let Some(visible) = self
                .overlays
                .iter()
                .rev()
                .find(|o| !o.is_hidden() && o.options.is_visible(cols, rows))
            {
                let _ = visible.id;
                // Topmost visible overlay already implicitly holds focus
                // (self.focus stays None, meaning "overlay owns it");
                // nothing further to do.
            } else if let Some(top) = self.overlays.last() {
                self.focus = top.pre_focus;
            }
        }
    }

    // ---- Input dispatch ----------------------------------

    /// Dispatch one chunk of raw input bytes.
    pub fn handle_input(&mut self, bytes: &[u8]) {
        if is_debug_shortcut(bytes) {
            if let Some(cb) = self.debug_shortcut.as_mut() {
                cb();
            }
            return;
        }

        let bytes = if self.cell_probe.in_flight {
            match strip_cell_probe_response(bytes) {
                Some((dims, rest)) => {
                    self.cell_probe.in_flight = false;
                    self.cell_probe.resolved = Some(dims);
                    debug!(height = dims.0, width = dims.1, "cell-size probe resolved");
                    self.invalidate_tree();
                    self.request_render(false);
                    rest
                }
                None => bytes.to_vec(),
            }
        } else {
            bytes.to_vec()
        };
        if bytes.is_empty() {
            return;
        }

        let (cols, rows) = (self.terminal.columns(), self.terminal.rows());
        self.reconcile_focus(cols, rows);

        if is_key_release(&bytes) {
            let wants = self.focused_component_wants_key_release();
            if !wants {
                return;
            }
        }

        if let Some(idx) = self.focus {
            if let Some(child) = self.root.children_mut().get_mut(idx) {
                child.handle_input(&bytes);
            }
        } else if let Some(top) = self.overlays.iter_mut().rev().find(|o| !o.is_hidden()) {
            top.component.handle_input(&bytes);
        }
        self.request_render(false);
    }

    fn focused_component_wants_key_release(&self) -> bool {
        if let Some(idx) = self.focus {
            return self
                .root
                .children()
                .get(idx)
                .is_some_and(|c| c.wants_key_release());
        }
        self.overlays
            .iter()
            .rev()
            .find(|o| !o.is_hidden())
            .is_some_and(|o| o.component.wants_key_release())
    }

    fn invalidate_tree(&mut self) {
        self.root.invalidate();
        for overlay in &mut self.overlays {
            overlay.component.invalidate();
        }
    }

    // ---- Lifecycle ------------------------

    /// Attach the terminal driver, hide the cursor, issue the one-shot
    /// cell-size probe, and request the first render.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        let pending_input = Arc::clone(&self.pending_input);
        let pending_resize = Arc::clone(&self.pending_resize);
        self.terminal.start(
            Box::new(move |bytes: &[u8]| {
                pending_input
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push_back(bytes.to_vec());
            }),
            Box::new(move |cols: u16, rows: u16| {
                *pending_resize.lock().unwrap_or_else(|e| e.into_inner()) = Some((cols, rows));
            }),
        )?;
        self.terminal.hide_cursor()?;
        self.terminal.write(b"\x1b[16t")?;
        self.terminal.flush()?;
        self.cell_probe.in_flight = true;
        self.force_next_render = true;
        self.request_render(false);
        self.started = true;
        Ok(())
    }

    /// Reposition the cursor past the rendered content, show the cursor,
    /// and detach the driver. Always restores terminal state, even if a
    /// caller invokes this from a panic-unwind or overflow-guard path.
    pub fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        let last_row = self.prev_lines.len().saturating_sub(1);
        if last_row > self.physical_cursor_row {
            let down = (last_row - self.physical_cursor_row) as u16;
            let _ = self.terminal.write(format!("\x1b[{down}B").as_bytes());
        }
        let _ = self.terminal.write(b"\r\n");
        let _ = self.terminal.show_cursor();
        let _ = self.terminal.flush();
        let _ = self.terminal.stop();
        self.pending_input.lock().unwrap_or_else(|e| e.into_inner()).clear();
        *self.pending_resize.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.started = false;
        Ok(())
    }

    // ---- Render pipeline ---------------------------------

    fn render(&mut self) -> Result<()> {
        let cols = self.terminal.columns();
        let rows = self.terminal.rows();
        self.reconcile_focus(cols, rows);

        self.root.set_rows_hint(rows);
        for overlay in &mut self.overlays {
            overlay.component.set_rows_hint(rows);
        }

        let mut lines = self.root.render(cols);
        self.composite_overlays(&mut lines, cols, rows);

        let (cursor_pos, lines) = extract_cursor_marker(lines, rows as usize);
        let lines: Vec<String> = lines.into_iter().map(|l| format!("{l}{RESET_SENTINEL}")).collect();

        if let Some(err) = self.check_overflow(&lines, cols) {
            self.write_crash_log(&lines, cols);
            let _ = self.stop();
            return Err(err);
        }

        let full = self.force_next_render || self.decide_full_redraw(&lines, cols, rows);
        if full {
            self.write_full_redraw(&lines)?;
        } else {
            self.write_incremental(&lines)?;
        }
        self.force_next_render = false;

        self.max_working_height = self.max_working_height.max(lines.len() as u16);
        self.prev_lines = lines;
        self.prev_width = cols;

        self.position_hardware_cursor(cursor_pos)?;

        if self.config.tui_debug {
            debug!(lines = self.prev_lines.len(), width = cols, height = rows, "render complete");
        }

        Ok(())
    }

    fn decide_full_redraw(&self, lines: &[String], cols: u16, _rows: u16) -> bool {
        let reason = if self.prev_lines.is_empty() {
            Some(FullRedrawReason::FirstRender)
        } else if cols != self.prev_width {
            Some(FullRedrawReason::WidthChanged)
        } else if self.config.clear_on_shrink
            && (lines.len() as u16) < self.max_working_height
            && self.overlays.iter().all(|o| o.is_hidden())
        {
            Some(FullRedrawReason::ShrankBelowWorkingArea)
        } else {
            let first_changed = first_diff_index(&self.prev_lines, lines);
            let viewport_start = self.prev_lines.len().saturating_sub(self.max_working_height as usize);
            match first_changed {
                Some(idx) if idx < viewport_start => Some(FullRedrawReason::ChangeAboveViewport),
                _ => None,
            }
        };
        if let Some(reason) = reason {
            if self.config.debug_redraw {
                warn!(%reason, "full redraw");
            }
            true
        } else {
            false
        }
    }

    fn write_full_redraw(&mut self, lines: &[String]) -> Result<()> {
        let mut out = Vec::new();
        out.extend_from_slice(b"\x1b[?2026h");
        out.extend_from_slice(b"\x1b[3J\x1b[2J\x1b[H");
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(b"\r\n");
            }
            out.extend_from_slice(line.as_bytes());
        }
        out.extend_from_slice(b"\x1b[?2026l");
        self.terminal.write(&out)?;
        self.terminal.flush()?;
        self.physical_cursor_row = lines.len().saturating_sub(1);
        Ok(())
    }

    fn write_incremental(&mut self, lines: &[String]) -> Result<()> {
        let Some((bytes, new_row)) = diff_render_bytes(&self.prev_lines, lines, self.physical_cursor_row) else {
            return Ok(());
        };
        self.terminal.write(&bytes)?;
        self.terminal.flush()?;
        self.physical_cursor_row = new_row;
        Ok(())
    }

    /// Move the hardware cursor to the extracted marker location, or hide it
    /// if no component emitted one this frame. Leaves the cursor parked
    /// exactly at `(row, col)` — callers must not assume it snaps back to
    /// the bottom row afterwards — and updates `physical_cursor_row` so the
    /// next tick's incremental diff starts its relative move from the real
    /// position.
    fn position_hardware_cursor(&mut self, cursor_pos: Option<(usize, usize)>) -> Result<()> {
        match cursor_pos {
            Some((row, col)) => {
                let current_row = self.physical_cursor_row;
                let mut seq = String::new();
                if current_row > row {
                    seq.push_str(&format!("\x1b[{}A", current_row - row));
                } else if row > current_row {
                    seq.push_str(&format!("\x1b[{}B", row - current_row));
                }
                seq.push_str(&format!("\x1b[{}G", col + 1));
                self.terminal.write(seq.as_bytes())?;
                self.terminal.show_cursor()?;
                self.physical_cursor_row = row;
            }
            None => {
                self.terminal.hide_cursor()?;
            }
        }
        self.terminal.flush()?;
        Ok(())
    }

    fn check_overflow(&self, lines: &[String], cols: u16) -> Option<TuiError> {
        for (i, line) in lines.iter().enumerate() {
            let w = visible_width(line);
            if w > cols as usize {
                return Some(TuiError::Overflow(format!("line {i} has width {w} > columns {cols}")));
            }
        }
        None
    }

    fn write_crash_log(&self, lines: &[String], cols: u16) {
        let dir = self.crash_log_dir.clone().unwrap_or_else(|| std::path::PathBuf::from("."));
        let ts = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let path = dir.join(format!("tuicore-crash-{ts}.log"));
        let mut body = format!("overflow guard tripped: columns={cols}\n");
        for (i, line) in lines.iter().enumerate() {
            body.push_str(&format!("{i}: width={} {line:?}\n", visible_width(line)));
        }
        if let Ok(mut f) = std::fs::File::create(&path) {
            let _ = f.write_all(body.as_bytes());
        }
    }

    // ---- Overlay compositing -----------------------------

    fn composite_overlays(&mut self, lines: &mut Vec<String>, cols: u16, rows: u16) {
        for overlay in &mut self.overlays {
            if overlay.is_hidden() || !overlay.options.is_visible(cols, rows) {
                continue;
            }
            let (width, max_height) = resolve_size(&overlay.options, cols, rows);
            let mut rendered = overlay.component.render(width);
            rendered.truncate(max_height as usize);
            let height = rendered.len() as u16;
            let (row, col) = resolve_position(&overlay.options, width, height, cols, rows);
            composite(lines, &rendered, row, col, width, height, cols);
        }
    }
}

/// Locate and strip the cursor marker from the last `viewport` lines,
/// returning its `(row, col)` (computed from the visible width of the
/// prefix preceding the marker) and the marker-stripped lines.
fn extract_cursor_marker(mut lines: Vec<String>, viewport: usize) -> (Option<(usize, usize)>, Vec<String>) {
    let start = lines.len().saturating_sub(viewport);
    let mut found = None;
    for (i, line) in lines.iter_mut().enumerate().skip(start) {
        if let Some(pos) = line.find(CURSOR_MARKER) {
            let prefix = &line[..pos];
            let col = visible_width(prefix);
            let mut stripped = String::with_capacity(line.len() - CURSOR_MARKER.len());
            stripped.push_str(&line[..pos]);
            stripped.push_str(&line[pos + CURSOR_MARKER.len()..]);
            *line = stripped;
            found = Some((i, col));
            break;
        }
    }
    (found, lines)
}

/// Index of the first logical line at which `a` and `b` differ, or `None`
/// if `b` is a line-for-line extension/match of `a`'s common prefix with
/// no differing line within the shared range.
fn first_diff_index(a: &[String], b: &[String]) -> Option<usize> {
    a.iter().zip(b.iter()).position(|(x, y)| x != y)
}

/// Compute the incremental-render byte sequence for changing `prev` into
/// `next`, wrapped in synchronized-output begin/end, given the row the
/// hardware cursor actually sits on before this write. Pure and directly
/// unit-testable without a terminal. Returns `None` if there is nothing to
/// redraw, else the bytes plus the row the cursor ends up on (the last
/// changed line, which already covers dropped trailing lines: a shrink from
/// `prev` to a shorter `next` always marks every index beyond `next.len()`
/// as changed, since `next.get(i)` is `None` there).
fn diff_render_bytes(prev: &[String], next: &[String], cursor_row: usize) -> Option<(Vec<u8>, usize)> {
    let max_len = prev.len().max(next.len());
    let mut first_changed = None;
    let mut last_changed = None;
    for i in 0..max_len {
        if prev.get(i) != next.get(i) {
            first_changed.get_or_insert(i);
            last_changed = Some(i);
        }
    }
    let (first_changed, last_changed) = (first_changed?, last_changed?);

    let mut out = Vec::new();
    out.extend_from_slice(b"\x1b[?2026h");

    if cursor_row > first_changed {
        out.extend_from_slice(format!("\x1b[{}A", cursor_row - first_changed).as_bytes());
    } else if first_changed > cursor_row {
        out.extend_from_slice(format!("\x1b[{}B", first_changed - cursor_row).as_bytes());
    }
    out.push(b'\r');

    for row in first_changed..=last_changed {
        if row > first_changed {
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\x1b[2K");
        if let Some(line) = next.get(row) {
            out.extend_from_slice(line.as_bytes());
        }
    }

    out.extend_from_slice(b"\x1b[?2026l");
    Some((out, last_changed))
}

const DEBUG_SHORTCUT: &[u8] = b"\x1b[90;6u"; // Kitty-protocol Shift+Ctrl+D, CSI u form.

fn is_debug_shortcut(bytes: &[u8]) -> bool {
    bytes == DEBUG_SHORTCUT
}

/// Kitty keyboard protocol key-release events terminate a `CSI u` sequence
/// with `;1:3u`-style event-type `3`. Heuristic: scan for the `:3u` event
/// marker immediately before the final `u`.
fn is_key_release(bytes: &[u8]) -> bool {
    bytes.ends_with(b":3u") || bytes.windows(4).any(|w| w == b":3u\x1b")
}

/// Strip a matching `CSI 6 ; height ; width t` cell-size-probe response
/// from the front of `bytes`, returning `(height, width)` and the
/// remaining bytes, or `None` if no such response is present.
fn strip_cell_probe_response(bytes: &[u8]) -> Option<((u16, u16), Vec<u8>)> {
    let prefix = b"\x1b[6;";
    if !bytes.starts_with(prefix) {
        return None;
    }
    let rest = &bytes[prefix.len()..];
    let end = rest.iter().position(|&b| b == b't')?;
    let body = std::str::from_utf8(&rest[..end]).ok()?;
    let mut parts = body.split(';');
    let height: u16 = parts.next()?.parse().ok()?;
    let width: u16 = parts.next()?.parse().ok()?;
    Some(((height, width), rest[end + 1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TestTerminal;

    struct Fixed(Vec<String>);
    impl Component for Fixed {
        fn render(&mut self, _w: u16) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn overflow_guard_trips_on_over_width_line() {
        let term = TestTerminal::new(5, 24);
        let mut engine = Engine::new(Box::new(term), EngineConfig::default());
        engine.push_child(Box::new(Fixed(vec!["way too wide for five".to_string()])));
        engine.start().unwrap();
        let result = engine.tick();
        assert!(result.is_err());
    }

    #[test]
    fn scenario_f_incremental_redraw_touches_only_changed_line() {
        let prev = vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string(), "e".to_string()];
        let mut next = prev.clone();
        next[2] = "B".to_string();
        let (bytes, new_row) = diff_render_bytes(&prev, &next, 4).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("\x1b[?2026h"));
        assert!(text.ends_with("\x1b[?2026l"));
        assert!(text.contains("\x1b[2K"));
        assert!(text.contains('B'));
        assert!(!text.contains("\x1b[2Kd"));
        assert!(!text.contains("\x1b[2Ke"));
        assert_eq!(new_row, 2);
    }

    #[test]
    fn diff_render_bytes_returns_none_when_unchanged() {
        let prev = vec!["a".to_string(), "b".to_string()];
        let next = prev.clone();
        assert!(diff_render_bytes(&prev, &next, 1).is_none());
    }

    #[test]
    fn cursor_marker_extraction_computes_column() {
        let lines = vec![format!("ab{CURSOR_MARKER}c")];
        let (pos, stripped) = extract_cursor_marker(lines, 24);
        assert_eq!(pos, Some((0, 2)));
        assert_eq!(stripped[0], "abc");
    }

    #[test]
    fn no_cursor_marker_returns_none() {
        let lines = vec!["plain".to_string()];
        let (pos, stripped) = extract_cursor_marker(lines, 24);
        assert_eq!(pos, None);
        assert_eq!(stripped[0], "plain");
    }

    #[test]
    fn cell_probe_response_is_parsed_and_stripped() {
        let (dims, rest) = strip_cell_probe_response(b"\x1b[6;20;8tX").unwrap();
        assert_eq!(dims, (20, 8));
        assert_eq!(rest, b"X");
    }

    #[test]
    fn config_from_env_reads_toggles() {
        std::env::set_var("DEBUG_REDRAW", "1");
        let cfg = EngineConfig::from_env();
        assert!(cfg.debug_redraw);
        std::env::remove_var("DEBUG_REDRAW");
    }

    struct MarkerLine(Vec<String>);
    impl Component for MarkerLine {
        fn render(&mut self, _w: u16) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn hardware_cursor_ends_at_marker_not_bottom_row() {
        let term = TestTerminal::new(20, 24);
        let output = term.output_handle();
        let mut engine = Engine::new(Box::new(term), EngineConfig::default());
        engine.push_child(Box::new(MarkerLine(vec![
            format!("a{CURSOR_MARKER}b"),
            "second line".to_string(),
        ])));
        engine.start().unwrap();
        engine.tick().unwrap();

        assert_eq!(engine.physical_cursor_row, 0);
        let text = output.text();
        assert!(text.ends_with("\x1b[1A\x1b[2G"));
    }

    #[test]
    fn hardware_cursor_tracks_marker_across_incremental_redraws() {
        let lines = std::sync::Arc::new(std::sync::Mutex::new(vec![
            format!("a{CURSOR_MARKER}b"),
            "second line".to_string(),
            "third line".to_string(),
        ]));

        struct Shared(std::sync::Arc<std::sync::Mutex<Vec<String>>>);
        impl Component for Shared {
            fn render(&mut self, _w: u16) -> Vec<String> {
                self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
            }
        }

        let term = TestTerminal::new(20, 24);
        let mut engine = Engine::new(Box::new(term), EngineConfig::default());
        engine.push_child(Box::new(Shared(std::sync::Arc::clone(&lines))));
        engine.start().unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.physical_cursor_row, 0);

        {
            let mut l = lines.lock().unwrap();
            l[2] = format!("third{CURSOR_MARKER} line");
        }
        engine.request_render(false);
        engine.tick().unwrap();
        assert_eq!(engine.physical_cursor_row, 2);
    }

    #[test]
    fn overlay_non_interference_invariant_8() {
        let term = TestTerminal::new(20, 24);
        let mut engine = Engine::new(Box::new(term), EngineConfig::default());
        engine.push_child(Box::new(Fixed(vec!["0123456789ABCDEFGHIJ".to_string()])));
        let handle = engine.show_overlay(
            Box::new(Fixed(vec!["XX".to_string()])),
            OverlayOptions {
                width: crate::overlay::Measure::Cells(2),
                max_height: crate::overlay::Measure::Cells(1),
                position: crate::overlay::Position::Explicit {
                    row: crate::overlay::Measure::Cells(0),
                    col: crate::overlay::Measure::Cells(4),
                },
                ..Default::default()
            },
        );
        engine.start().unwrap();
        engine.tick().unwrap();
        assert!(engine.prev_lines[0].starts_with("0123"));
        assert!(engine.prev_lines[0].ends_with(&format!("89ABCDEFGHIJ{RESET_SENTINEL}")));
        handle.hide();
    }
}
