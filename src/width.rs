//! Grapheme segmentation and visible-width measurement for ANSI-styled lines.
//!
//! Every function here is pure and treats malformed escape sequences as
//! inert bytes measured at zero width rather than failing — the editor and
//! the engine's diff renderer both lean on that guarantee.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// SGR reset plus an OSC-8 hyperlink close, appended to every non-image
/// line the engine writes so that color or link state never bleeds across
/// rows.
pub const RESET_SENTINEL: &str = "\x1b[0m\x1b]8;;\x1b\\";

/// A single grapheme cluster, reported with its visible width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grapheme<'a> {
    /// The grapheme's text.
    pub text: &'a str,
    /// The byte offset at which this grapheme starts in the source string.
    pub byte_start: usize,
    /// Visible width in terminal cells (0, 1, or 2).
    pub width: usize,
}

/// One token of a tokenized styled string: either plain text or an inert
/// escape sequence (CSI/OSC).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Split a styled string into text and escape-sequence tokens.
///
/// Recognizes CSI sequences (`ESC [ ... final-byte`), OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`), and APC sequences
/// (`ESC _ ... ESC \`, used for the cursor marker). Anything else starting
/// with `ESC` that doesn't match any of these shapes is treated as a
/// one-byte inert escape so a stray `ESC` can never corrupt width
/// measurement.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut text_start = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b {
            if text_start < i {
                tokens.push(Token::Text(&s[text_start..i]));
            }
            let start = i;
            i += 1;
            if i < bytes.len() && bytes[i] == b'[' {
                i += 1;
                while i < bytes.len() && !(0x40..=0x7e).contains(&bytes[i]) {
                    i += 1;
                }
                if i < bytes.len() {
                    i += 1; // consume final byte
                }
            } else if i < bytes.len() && bytes[i] == b']' {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'\\' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            } else if i < bytes.len() && bytes[i] == b'_' {
                // APC: ESC _ ... ST (ESC \). Used for the cursor marker.
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'\\' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            } else if i < bytes.len() {
                i += 1;
            }
            tokens.push(Token::Escape(&s[start..i]));
            text_start = i;
        } else {
            i += 1;
        }
    }
    if text_start < bytes.len() {
        tokens.push(Token::Text(&s[text_start..]));
    }
    tokens
}

/// Split a string into extended grapheme clusters, skipping escape
/// sequences entirely (they carry no graphemes of their own).
pub fn graphemes(s: &str) -> Vec<Grapheme<'_>> {
    let mut out = Vec::new();
    for token in tokenize(s) {
        if let Token::Text(text) = token {
            let base = text.as_ptr() as usize - s.as_ptr() as usize;
            for (offset, g) in text.grapheme_indices(true) {
                out.push(Grapheme {
                    text: g,
                    byte_start: base + offset,
                    width: grapheme_width(g),
                });
            }
        }
    }
    out
}

/// Visible width in terminal cells of a single grapheme cluster: wide
/// East-Asian/emoji clusters count as 2, zero-width combining marks as 0.
fn grapheme_width(g: &str) -> usize {
    let w = UnicodeWidthStr::width(g);
    if w > 0 {
        w
    } else if g.chars().all(|c| c == '\u{200d}' || unicode_width::UnicodeWidthChar::width(c).is_none() || unicode_width::UnicodeWidthChar::width(c) == Some(0))
    {
        0
    } else {
        w
    }
}

/// Visible width of a styled string: escape sequences are zero-width,
/// wide characters count 2, combining marks count 0.
pub fn visible_width(s: &str) -> usize {
    tokenize(s)
        .into_iter()
        .map(|t| match t {
            Token::Text(text) => UnicodeWidthStr::width(text),
            Token::Escape(_) => 0,
        })
        .sum()
}

/// One chunk of a word-wrapped logical line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapChunk {
    /// The chunk's text (no leading/trailing wrap whitespace).
    pub text: String,
    /// Byte offset of the chunk's start in the original line.
    pub start_index: usize,
    /// Byte offset one past the chunk's last byte in the original line.
    pub end_index: usize,
}

/// Word-wrap a single logical line to chunks of visible width `<= max_width`.
///
/// Wraps at the last whitespace-to-non-whitespace transition that fits.
/// Multiple spaces never break between themselves. A single grapheme
/// cluster wider than `max_width` is never split; it forms its own chunk,
/// the one case where a chunk may exceed `max_width`.
pub fn word_wrap_line(line: &str, max_width: usize) -> Vec<WrapChunk> {
    if max_width == 0 {
        return vec![WrapChunk {
            text: line.to_string(),
            start_index: 0,
            end_index: line.len(),
        }];
    }
    let gs = graphemes(line);
    if gs.is_empty() {
        return vec![WrapChunk {
            text: String::new(),
            start_index: 0,
            end_index: line.len(),
        }];
    }

    let mut chunks = Vec::new();
    let mut chunk_start = 0usize; // grapheme index
    let mut width = 0usize;
    let mut last_break: Option<usize> = None; // grapheme index of a ws->non-ws boundary

    let mut i = 0usize;
    while i < gs.len() {
        let g = &gs[i];
        // Track break opportunities: a transition from whitespace to
        // non-whitespace marks the start of the next word.
        if i > 0 && is_ws(gs[i - 1].text) && !is_ws(g.text) {
            last_break = Some(i);
        }

        if width + g.width > max_width && i > chunk_start {
            let break_at = last_break.filter(|&b| b > chunk_start).unwrap_or(i);
            push_chunk(&mut chunks, line, &gs, chunk_start, break_at);
            chunk_start = break_at;
            width = gs[chunk_start..i].iter().map(|g| g.width).sum::<usize>() + g.width;
            last_break = None;
            i += 1;
            continue;
        }

        width += g.width;
        i += 1;
    }
    push_chunk(&mut chunks, line, &gs, chunk_start, gs.len());
    chunks
}

fn is_ws(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn push_chunk(chunks: &mut Vec<WrapChunk>, line: &str, gs: &[Grapheme<'_>], start: usize, end: usize) {
    if start >= end {
        return;
    }
    // Trim leading whitespace from the chunk (it was the wrap separator)
    // except for the very first chunk.
    let mut s = start;
    if !chunks.is_empty() {
        while s < end && is_ws(gs[s].text) {
            s += 1;
        }
    }
    if s >= end {
        return;
    }
    // Trailing whitespace is dropped from the visible text but stays part
    // of the original line's span so concatenation round-trips.
    let mut e = end;
    while e > s && is_ws(gs[e - 1].text) {
        e -= 1;
    }
    let byte_start = gs[s].byte_start;
    let byte_end = if e < gs.len() {
        gs[e].byte_start
    } else {
        line.len()
    };
    let text_end = if e < gs.len() {
        gs[e].byte_start
    } else {
        line.len()
    };
    chunks.push(WrapChunk {
        text: line[byte_start..text_end].to_string(),
        start_index: byte_start,
        end_index: byte_end,
    });
}

/// Extract a substring spanning visual columns `[a, b)` from a styled
/// string. In `strict` mode a wide character whose cell would straddle a
/// boundary is dropped (and the gap padded with a space) rather than
/// rendered half-cut, which is required when compositing overlays.
pub fn slice_by_column(s: &str, a: usize, b: usize, strict: bool) -> String {
    if b <= a {
        return String::new();
    }
    let mut out = String::new();
    let mut col = 0usize;
    for g in graphemes(s) {
        if col >= b {
            break;
        }
        let next = col + g.width;
        if next <= a {
            col = next;
            continue;
        }
        if col >= a && next <= b {
            out.push_str(g.text);
            col = next;
            continue;
        }
        // Straddles a or b.
        if strict {
            let overlap_start = col.max(a);
            let overlap_end = next.min(b);
            out.push_str(&" ".repeat(overlap_end - overlap_start));
        } else {
            out.push_str(g.text);
        }
        col = next;
    }
    out
}

/// Split a styled line at two column boundaries `a <= b`, returning the
/// three segments `(before, middle, after)` and their measured visible
/// widths, in one pass. Used by the overlay compositor.
pub fn extract_segments(s: &str, a: usize, b: usize) -> ((String, usize), (String, usize), (String, usize)) {
    let before = slice_by_column(s, 0, a, true);
    let middle = slice_by_column(s, a, b, true);
    let after = slice_by_column(s, b, usize::MAX, true);
    let bw = visible_width(&before);
    let mw = visible_width(&middle);
    let aw = visible_width(&after);
    ((before, bw), (middle, mw), (after, aw))
}

/// Wrap a styled string at `width` columns, re-opening any SGR/hyperlink
/// context that was active at each wrap boundary so every resulting line
/// is independently well-formed.
pub fn wrap_text_with_ansi(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut col = 0usize;
    let mut active_escapes: Vec<String> = Vec::new();

    for token in tokenize(s) {
        match token {
            Token::Escape(e) => {
                current.push_str(e);
                track_escape(&mut active_escapes, e);
            }
            Token::Text(text) => {
                for g in text.graphemes(true) {
                    let gw = UnicodeWidthStr::width(g);
                    if col + gw > width && col > 0 {
                        lines.push(current.clone());
                        current.clear();
                        for e in &active_escapes {
                            current.push_str(e);
                        }
                        col = 0;
                    }
                    current.push_str(g);
                    col += gw;
                }
            }
        }
    }
    lines.push(current);
    lines
}

/// Track active SGR/hyperlink state so wrapped continuation lines reopen
/// it. A reset clears all tracked state; any other SGR/OSC-8 sequence is
/// remembered until reset.
fn track_escape(active: &mut Vec<String>, escape: &str) {
    if escape == "\x1b[0m" || escape.starts_with("\x1b[0;") {
        active.clear();
    } else {
        active.push(escape.to_string());
    }
}

/// Pad a styled line to `width` visible columns using `bg` to style the
/// padding, a caller-supplied function from "number of padding columns"
/// to a styled padding string of that visible width.
pub fn apply_background_to_line(line: &str, width: usize, bg: impl Fn(usize) -> String) -> String {
    let w = visible_width(line);
    if w >= width {
        return line.to_string();
    }
    let mut out = line.to_string();
    out.push_str(&bg(width - w));
    out
}

/// Shorten a styled line to exactly `width` visible columns, preserving
/// escape sequences and appending the reset sentinel only if content was
/// actually cut.
pub fn truncate_to_width(line: &str, width: usize) -> String {
    if visible_width(line) <= width {
        return line.to_string();
    }
    let mut out = String::new();
    let mut col = 0usize;
    for token in tokenize(line) {
        match token {
            Token::Escape(e) => out.push_str(e),
            Token::Text(text) => {
                for g in text.graphemes(true) {
                    let gw = UnicodeWidthStr::width(g);
                    if col + gw > width {
                        if col < width {
                            out.push_str(&" ".repeat(width - col));
                        }
                        return out;
                    }
                    out.push_str(g);
                    col += gw;
                }
            }
        }
    }
    out
}
