//! Overlay compositing: stamps one overlay's rendered lines onto a base
//! frame's lines, using visible-column math so wide characters never split
//! across a boundary.
//!
//! Overlays are composited one at a time, LIFO, each pass writing directly
//! onto the previous pass's output via a single extract-before / overlay /
//! extract-after cut per line.

use crate::width::{extract_segments, truncate_to_width, visible_width, RESET_SENTINEL};

/// Composite `overlay_lines` onto `base` at `(row, col)`, sized
/// `(width, height)`. Returns the indices of base lines that were modified
/// so the caller can re-verify only those for over-width violations.
///
/// `base` is grown with blank lines if the overlay extends past its
/// current length.
pub fn composite(
    base: &mut Vec<String>,
    overlay_lines: &[String],
    row: u16,
    col: u16,
    width: u16,
    height: u16,
    terminal_width: u16,
) -> Vec<usize> {
    let mut touched = Vec::new();
    let needed = row as usize + height as usize;
    while base.len() < needed {
        base.push(String::new());
    }

    for (i, overlay_line) in overlay_lines.iter().take(height as usize).enumerate() {
        let idx = row as usize + i;
        let base_line = base[idx].clone();
        let a = col as usize;
        let b = col as usize + width as usize;
        let ((before, _), (_, _), (after, _)) = extract_segments(&base_line, a, b);

        let mut composite = String::new();
        composite.push_str(&before);
        if visible_width(&before) < a {
            composite.push_str(&" ".repeat(a - visible_width(&before)));
        }
        composite.push_str(RESET_SENTINEL);
        composite.push_str(overlay_line);
        let overlay_w = visible_width(overlay_line);
        if overlay_w < width as usize {
            composite.push_str(&" ".repeat(width as usize - overlay_w));
        }
        composite.push_str(RESET_SENTINEL);
        composite.push_str(&after);

        let truncated = truncate_to_width(&composite, terminal_width as usize);
        base[idx] = truncated;
        touched.push(idx);
    }

    touched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_e_basic_overlay() {
        let mut base = vec!["AAAAAAAAAA".to_string()];
        composite(&mut base, &["##".to_string()], 0, 3, 2, 1, 10);
        assert_eq!(base[0], format!("AAA{RESET_SENTINEL}##{RESET_SENTINEL}AAAAA"));
    }

    #[test]
    fn scenario_e_truncation_to_narrow_terminal() {
        let mut base = vec!["AAAAAAAAAA".to_string()];
        composite(&mut base, &["##".to_string()], 0, 3, 2, 1, 4);
        assert!(visible_width(&base[0]) <= 4);
    }

    #[test]
    fn extends_base_downward_when_overlay_below_content() {
        let mut base = vec!["only line".to_string()];
        let touched = composite(&mut base, &["x".to_string()], 3, 0, 1, 1, 20);
        assert_eq!(base.len(), 4);
        assert_eq!(touched, vec![3]);
    }

    #[test]
    fn non_overlay_columns_are_unchanged_invariant_8() {
        let base_line = "0123456789";
        let mut base = vec![base_line.to_string()];
        composite(&mut base, &["XX".to_string()], 0, 4, 2, 1, 10);
        // Columns [0,4) and [6,10) are untouched (invariant 8, modulo the
        // reset sentinel injected around the overlay).
        assert!(base[0].starts_with("0123"));
        assert!(base[0].ends_with("6789"));
    }

    #[test]
    fn overlay_wider_than_content_pads_with_spaces() {
        let mut base = vec!["ab".to_string()];
        let touched = composite(&mut base, &["x".to_string()], 0, 0, 5, 1, 20);
        assert_eq!(touched, vec![0]);
        assert!(visible_width(&base[0]) >= 5);
    }
}
