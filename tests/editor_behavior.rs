//! End-to-end behavioral tests for the multi-line editor: kill/yank
//! duality, undo monotonicity, large-paste markerization and
//! re-inflation, and the sticky-column vertical-navigation scenario.

use tuicore::Editor;

fn type_str(editor: &mut Editor, s: &str) {
    for ch in s.chars() {
        editor.insert_char(ch);
    }
}

#[test]
fn kill_then_yank_restores_original_text() {
    let mut editor = Editor::new();
    type_str(&mut editor, "hello world");
    editor.move_line_start();
    for _ in 0..5 {
        editor.move_right();
    }
    assert_eq!(editor.cursor(), (0, 5));

    editor.delete_to_line_end();
    assert_eq!(editor.text(), "hello");

    editor.yank();
    assert_eq!(editor.text(), "hello world");
    assert_eq!(editor.cursor(), (0, 11));
}

#[test]
fn kill_kill_yank_yank_pop_cycles_ring() {
    let mut editor = Editor::new();
    type_str(&mut editor, "first");
    editor.move_line_start();
    editor.delete_to_line_end(); // kill_1 = "first"
    type_str(&mut editor, "second");
    editor.move_line_start();
    editor.delete_to_line_end(); // kill_2 = "second"

    editor.yank();
    assert_eq!(editor.text(), "second");

    editor.yank_pop();
    assert_eq!(editor.text(), "first");
}

#[test]
fn undo_is_monotonic_over_n_operations() {
    let mut editor = Editor::new();
    let initial = editor.text();

    type_str(&mut editor, "ab cd ef");
    editor.insert_newline();
    type_str(&mut editor, "gh");
    editor.backspace();
    editor.delete_to_line_start();

    let mut undone = 0;
    while editor.text() != initial && undone < 100 {
        editor.undo();
        undone += 1;
    }
    assert_eq!(editor.text(), initial);
}

#[test]
fn large_paste_markerizes_then_reinflates_on_submit() {
    let mut editor = Editor::new();
    let block: String = (0..12).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");

    let mut paste_bytes = Vec::new();
    paste_bytes.extend_from_slice(b"\x1b[200~");
    paste_bytes.extend_from_slice(block.as_bytes());
    paste_bytes.extend_from_slice(b"\x1b[201~");
    editor.handle_input_bytes(&paste_bytes);

    assert!(editor.text().contains("[paste #1"));
    assert!(editor.text().contains("+12 lines"));
    assert!(!editor.text().contains("line 0"));

    editor.handle_input_bytes(b"\r");
    let submitted = editor.take_submission().expect("submission");
    assert_eq!(submitted, block);
}

#[test]
fn small_single_line_paste_is_inserted_verbatim() {
    let mut editor = Editor::new();
    type_str(&mut editor, "see ");
    let mut paste_bytes = Vec::new();
    paste_bytes.extend_from_slice(b"\x1b[200~");
    paste_bytes.extend_from_slice(b"patch.rs");
    paste_bytes.extend_from_slice(b"\x1b[201~");
    editor.handle_input_bytes(&paste_bytes);
    assert_eq!(editor.text(), "see patch.rs");
}

#[test]
fn sticky_column_scenario_b() {
    // Lines: "abcdefghij" (10 cols), "xy" (2 cols), "klmnop" (6 cols).
    let mut editor = Editor::new();
    type_str(&mut editor, "abcdefghij");
    editor.insert_newline();
    type_str(&mut editor, "xy");
    editor.insert_newline();
    type_str(&mut editor, "klmnop");

    // Walk the cursor back up to line 0, landing at column 0 each hop so
    // sticky-column state from the walk itself never leaks into the
    // scenario below.
    editor.move_line_start();
    editor.move_up(80);
    editor.move_line_start();
    editor.move_up(80);
    editor.move_line_start();
    for _ in 0..9 {
        editor.move_right();
    }
    assert_eq!(editor.cursor(), (0, 9));

    editor.move_down(80);
    assert_eq!(editor.cursor(), (1, 2));

    editor.move_down(80);
    assert_eq!(editor.cursor(), (2, 6));
}

#[test]
fn cursor_stays_on_grapheme_boundaries_with_emoji() {
    let mut editor = Editor::new();
    type_str(&mut editor, "a");
    editor.insert_char('\u{1F600}'); // emoji grapheme
    type_str(&mut editor, "b");
    // Cursor is at end; move left twice should land before the emoji and
    // before 'a', never splitting the emoji's byte sequence.
    editor.move_left();
    let (_, col) = editor.cursor();
    assert!(editor.text().is_char_boundary(col));
    editor.move_left();
    let (_, col) = editor.cursor();
    assert!(editor.text().is_char_boundary(col));
}
