//! Byte-stream to line conversion and connection-status scraping.
//!
//! Child output arrives as arbitrary byte chunks; a line (or a multi-byte
//! character) can be split across reads. `LineAssembler` reassembles chunks
//! into whole lines and `StatusPattern` recognizes connection-status markers
//! in completed lines. Scraping is observational: a matched line is still
//! delivered to the host unmodified.

/// Incremental splitter from raw byte chunks to decoded lines.
///
/// Bytes are held until a `\n` completes the line, so partial UTF-8
/// sequences at chunk boundaries are never decoded early. Decoding is lossy
/// per completed line. Trailing `\r` is stripped (CRLF output on Windows).
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                lines.push(self.drain_pending());
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush an unterminated trailing fragment at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.drain_pending())
        }
    }

    fn drain_pending(&mut self) -> String {
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

/// Delimiter pair recognizing connection-status lines.
///
/// A pattern like `##Sublime{|}##` is split on its rightmost `|`; the line
/// `##Sublime{SCOTT@ORCL}##` then yields the status `SCOTT@ORCL`.
#[derive(Debug, Clone)]
pub struct StatusPattern {
    left: String,
    right: String,
}

impl StatusPattern {
    /// Split a pattern on its rightmost `|` into left and right delimiters.
    ///
    /// Returns `None` (scraping disabled) for patterns without a `|` or with
    /// an empty left delimiter.
    pub fn parse(pattern: &str) -> Option<Self> {
        let (left, right) = pattern.rsplit_once('|')?;
        if left.is_empty() {
            return None;
        }
        Some(Self {
            left: left.to_string(),
            right: right.to_string(),
        })
    }

    /// Capture the status between the last occurrence of the left delimiter
    /// and the last following occurrence of the right one.
    pub fn extract(&self, line: &str) -> Option<String> {
        let start = line.rfind(&self.left)? + self.left.len();
        let rest = &line[start..];
        let end = rest.rfind(&self.right)?;
        Some(rest[..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lines_within_one_chunk() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push(b"one\ntwo\n"), vec!["one", "two"]);
        assert_eq!(asm.finish(), None);
    }

    #[test]
    fn buffers_fragment_across_chunks() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push(b"hel"), Vec::<String>::new());
        assert_eq!(asm.push(b"lo\nwor"), vec!["hello"]);
        assert_eq!(asm.push(b"ld\n"), vec!["world"]);
    }

    #[test]
    fn reassembles_split_multibyte_sequence() {
        let bytes = "héllo\n".as_bytes();
        // Split in the middle of the two-byte 'é'.
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push(&bytes[..2]), Vec::<String>::new());
        assert_eq!(asm.push(&bytes[2..]), vec!["héllo"]);
    }

    #[test]
    fn strips_carriage_return() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push(b"dos line\r\n"), vec!["dos line"]);
    }

    #[test]
    fn finish_flushes_unterminated_tail() {
        let mut asm = LineAssembler::new();
        assert!(asm.push(b"no newline").is_empty());
        assert_eq!(asm.finish(), Some("no newline".to_string()));
        assert_eq!(asm.finish(), None);
    }

    #[test]
    fn default_pattern_extracts_status() {
        let pattern = StatusPattern::parse("##Sublime{|}##").unwrap();
        assert_eq!(
            pattern.extract("##Sublime{SCOTT@ORCL}##"),
            Some("SCOTT@ORCL".to_string())
        );
    }

    #[test]
    fn extract_uses_last_occurrence() {
        let pattern = StatusPattern::parse("<<|>>").unwrap();
        assert_eq!(
            pattern.extract("noise <<old>> more <<new>>"),
            Some("new".to_string())
        );
    }

    #[test]
    fn non_matching_lines_yield_none() {
        let pattern = StatusPattern::parse("##Sublime{|}##").unwrap();
        assert_eq!(pattern.extract("plain output"), None);
        assert_eq!(pattern.extract("##Sublime{unterminated"), None);
    }

    #[test]
    fn degenerate_patterns_disable_scraping() {
        assert!(StatusPattern::parse("").is_none());
        assert!(StatusPattern::parse("no delimiter").is_none());
        assert!(StatusPattern::parse("|right-only").is_none());
    }
}
