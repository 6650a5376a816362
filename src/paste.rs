//! Bracketed-paste detection, normalization, and markerization.
//!
//! Scans raw input bytes directly for the `CSI 200 ~` / `CSI 201 ~`
//! bracketed-paste markers rather than relying on a pre-parsed paste event,
//! so callers only need to forward raw terminal bytes.

const BEGIN_MARKER: &[u8] = b"\x1b[200~";
const END_MARKER: &[u8] = b"\x1b[201~";

const LARGE_PASTE_LINES: usize = 10;
const LARGE_PASTE_CHARS: usize = 1000;

/// Mapping from an integer paste-id to the full original pasted text.
#[derive(Default)]
pub struct PasteStore {
    next_id: u64,
    pastes: Vec<(u64, String)>,
}

impl PasteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pastes: Vec::new(),
        }
    }

    /// Store `text` under a new id and return it.
    pub fn insert(&mut self, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pastes.push((id, text));
        id
    }

    /// Look up a stored paste's full text.
    pub fn get(&self, id: u64) -> Option<&str> {
        self.pastes
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, text)| text.as_str())
    }

    /// Clear all stored pastes, done once submission has re-inflated every
    /// marker back to its original text.
    pub fn clear(&mut self) {
        self.pastes.clear();
    }

    /// Whether any pastes are currently stored.
    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }
}

/// Incrementally scans raw input bytes for bracketed-paste markers,
/// accumulating the bytes between them.
#[derive(Default)]
pub struct PasteScanner {
    buffer: Option<Vec<u8>>,
}

/// The outcome of feeding one chunk of bytes into a [`PasteScanner`].
pub enum ScanResult {
    /// No paste markers involved; forward these bytes as normal input.
    PassThrough(Vec<u8>),
    /// A paste began and/or is still being accumulated; nothing to
    /// forward yet.
    Accumulating,
    /// A paste ended; here is its normalized text, plus any trailing
    /// bytes after the end marker to forward as normal input.
    Complete { text: String, trailing: Vec<u8> },
}

impl PasteScanner {
    /// Create a scanner with no paste in flight.
    pub fn new() -> Self {
        Self { buffer: None }
    }

    /// Whether a paste is currently being accumulated.
    pub fn in_paste(&self) -> bool {
        self.buffer.is_some()
    }

    /// Feed a chunk of raw input bytes.
    pub fn feed(&mut self, bytes: &[u8]) -> ScanResult {
        if let Some(buf) = self.buffer.as_mut() {
            if let Some(pos) = find(bytes, END_MARKER) {
                buf.extend_from_slice(&bytes[..pos]);
                let raw = std::mem::take(buf);
                self.buffer = None;
                let trailing = bytes[pos + END_MARKER.len()..].to_vec();
                return ScanResult::Complete {
                    text: normalize(&String::from_utf8_lossy(&raw)),
                    trailing,
                };
            }
            buf.extend_from_slice(bytes);
            return ScanResult::Accumulating;
        }

        match find(bytes, BEGIN_MARKER) {
            None => ScanResult::PassThrough(bytes.to_vec()),
            Some(pos) => {
                let mut buf = Vec::new();
                let after_begin = &bytes[pos + BEGIN_MARKER.len()..];
                if let Some(end_pos) = find(after_begin, END_MARKER) {
                    let text = normalize(&String::from_utf8_lossy(&after_begin[..end_pos]));
                    let trailing = after_begin[end_pos + END_MARKER.len()..].to_vec();
                    return ScanResult::Complete { text, trailing };
                }
                buf.extend_from_slice(after_begin);
                self.buffer = Some(buf);
                ScanResult::Accumulating
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Normalize pasted text: CRLF/CR to LF, tabs expanded to four spaces,
/// non-printable bytes other than newlines stripped.
fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .chars()
        .map(|c| if c == '\t' { "    ".to_string() } else { c.to_string() })
        .collect::<Vec<_>>()
        .join("")
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Whether `text` begins with a path-like character (`/`, `~`, `.`), used
/// to decide whether a leading space should be inserted for readability.
pub fn looks_path_like(text: &str) -> bool {
    matches!(text.chars().next(), Some('/') | Some('~') | Some('.'))
}

/// Whether a normalized paste should be markerized rather than inserted
/// inline: at least 10 lines or at least 1000 characters.
pub fn is_large(text: &str) -> bool {
    text.lines().count() >= LARGE_PASTE_LINES || text.chars().count() >= LARGE_PASTE_CHARS
}

/// The visible marker text for a large paste.
pub fn marker_for(id: u64, text: &str) -> String {
    let lines = text.lines().count();
    if lines > 1 {
        format!("[paste #{id} +{lines} lines]")
    } else {
        format!("[paste #{id} {} chars]", text.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_paste_round_trips() {
        let mut scanner = PasteScanner::new();
        let mut input = Vec::new();
        input.extend_from_slice(BEGIN_MARKER);
        input.extend_from_slice(b"hello\r\nworld");
        input.extend_from_slice(END_MARKER);
        match scanner.feed(&input) {
            ScanResult::Complete { text, trailing } => {
                assert_eq!(text, "hello\nworld");
                assert!(trailing.is_empty());
            }
            _ => panic!("expected Complete"),
        }
    }

    #[test]
    fn paste_split_across_chunks_accumulates() {
        let mut scanner = PasteScanner::new();
        let mut begin = Vec::new();
        begin.extend_from_slice(BEGIN_MARKER);
        begin.extend_from_slice(b"part1");
        assert!(matches!(scanner.feed(&begin), ScanResult::Accumulating));
        assert!(scanner.in_paste());

        let mut end = b"part2".to_vec();
        end.extend_from_slice(END_MARKER);
        match scanner.feed(&end) {
            ScanResult::Complete { text, .. } => assert_eq!(text, "part1part2"),
            _ => panic!("expected Complete"),
        }
        assert!(!scanner.in_paste());
    }

    #[test]
    fn tabs_expand_to_four_spaces() {
        assert_eq!(normalize("a\tb"), "a    b");
    }

    #[test]
    fn control_bytes_other_than_newline_are_stripped() {
        assert_eq!(normalize("a\u{7}b"), "ab");
    }

    #[test]
    fn large_paste_detection_by_line_count() {
        let text = (0..10).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        assert!(is_large(&text));
    }

    #[test]
    fn large_paste_detection_by_char_count() {
        let text = "x".repeat(1000);
        assert!(is_large(&text));
    }

    #[test]
    fn small_single_line_paste_is_not_large() {
        assert!(!is_large("hi there"));
    }

    #[test]
    fn marker_and_store_round_trip_invariant_7() {
        let mut store = PasteStore::new();
        let original = (0..12).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let id = store.insert(original.clone());
        let marker = marker_for(id, &original);
        assert!(marker.starts_with("[paste #1 +12 lines]"));
        assert_eq!(store.get(id), Some(original.as_str()));
    }

    #[test]
    fn looks_path_like_detection() {
        assert!(looks_path_like("/usr/bin"));
        assert!(looks_path_like("~/dotfiles"));
        assert!(looks_path_like("./relative"));
        assert!(!looks_path_like("hello"));
    }
}
