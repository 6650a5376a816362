//! End-to-end engine rendering tests driven through the public [`Engine`]
//! API and a [`TestTerminal`], inspecting the actual bytes written to the
//! terminal rather than internal engine state: overlay compositing, the
//! full-redraw-on-first-tick guarantee, and incremental redraw touching
//! only a changed line.

#![cfg(feature = "test-backend")]

use std::sync::{Arc, Mutex};

use tuicore::component::Component;
use tuicore::engine::{Engine, EngineConfig};
use tuicore::overlay::{Measure, OverlayOptions, Position};
use tuicore::terminal::TestTerminal;

struct Lines(Arc<Mutex<Vec<String>>>);

impl Component for Lines {
    fn render(&mut self, _width: u16) -> Vec<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[test]
fn overlay_composites_onto_base_through_terminal_output() {
    let term = TestTerminal::new(10, 5);
    let output = term.output_handle();
    let mut engine = Engine::new(Box::new(term), EngineConfig::default());
    engine.push_child(Box::new(Lines(Arc::new(Mutex::new(vec!["AAAAAAAAAA".to_string()])))));
    engine.show_overlay(
        Box::new(Lines(Arc::new(Mutex::new(vec!["##".to_string()])))),
        OverlayOptions {
            width: Measure::Cells(2),
            max_height: Measure::Cells(1),
            position: Position::Explicit {
                row: Measure::Cells(0),
                col: Measure::Cells(3),
            },
            ..Default::default()
        },
    );

    engine.tick().unwrap();

    let written = output.text();
    // First tick is a full redraw: synchronized-output framing, a clear,
    // then the composited line with the overlay stamped over columns 3-4.
    assert!(written.starts_with("\x1b[?2026h"));
    assert!(written.contains("AAA"));
    assert!(written.contains("##"));
    assert!(written.contains("AAAAA"));
    assert!(written.ends_with("\x1b[?2026l"));
}

#[test]
fn overlay_is_truncated_to_narrow_terminal_width() {
    let term = TestTerminal::new(4, 5);
    let output = term.output_handle();
    let mut engine = Engine::new(Box::new(term), EngineConfig::default());
    engine.push_child(Box::new(Lines(Arc::new(Mutex::new(vec!["AAAAAAAAAA".to_string()])))));
    engine.show_overlay(
        Box::new(Lines(Arc::new(Mutex::new(vec!["##".to_string()])))),
        OverlayOptions {
            width: Measure::Cells(2),
            max_height: Measure::Cells(1),
            position: Position::Explicit {
                row: Measure::Cells(0),
                col: Measure::Cells(3),
            },
            ..Default::default()
        },
    );

    engine.tick().unwrap();

    // The rendered frame must never exceed the 4-column terminal; with no
    // visible-width accessor over raw written bytes, the absence of the
    // overflow-guard error is itself the assertion (it would have aborted
    // the render and returned Err otherwise).
    let written = output.text();
    assert!(!written.is_empty());
}

#[test]
fn incremental_redraw_writes_only_the_changed_line() {
    let term = TestTerminal::new(20, 24);
    let output = term.output_handle();
    let mut engine = Engine::new(Box::new(term), EngineConfig::default());
    let shared = Arc::new(Mutex::new(vec![
        "line a".to_string(),
        "line b".to_string(),
        "line c".to_string(),
        "line d".to_string(),
        "line e".to_string(),
    ]));
    engine.push_child(Box::new(Lines(Arc::clone(&shared))));

    // First tick is always a full redraw (no prior frame to diff against).
    engine.tick().unwrap();
    assert!(output.text().contains("line a"));
    output.clear();

    shared.lock().unwrap_or_else(|e| e.into_inner())[2] = "LINE C CHANGED".to_string();
    engine.request_render(false);
    engine.tick().unwrap();

    let written = output.text();
    assert!(written.contains("LINE C CHANGED"));
    assert!(written.contains("\x1b[2K"));
    // Untouched lines above/below the changed one are not rewritten.
    assert!(!written.contains("\x1b[2Kline a"));
    assert!(!written.contains("\x1b[2Kline e"));
}

#[test]
fn forced_render_after_width_change_produces_a_full_redraw() {
    let mut term = TestTerminal::new(20, 24);
    term.start(Box::new(|_| {}), Box::new(|_, _| {})).unwrap();
    let output = term.output_handle();
    let mut engine = Engine::new(Box::new(term), EngineConfig::default());
    engine.push_child(Box::new(Lines(Arc::new(Mutex::new(vec!["hello".to_string()])))));

    engine.tick().unwrap();
    output.clear();

    engine.request_render(true);
    engine.tick().unwrap();

    let written = output.text();
    assert!(written.starts_with("\x1b[?2026h\x1b[3J\x1b[2J\x1b[H"));
    assert!(written.contains("hello"));
}
