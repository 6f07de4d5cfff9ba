//! Incremental line splitter for chunked response bodies
//!
//! Works on raw bytes and only decodes a line once its terminator has been
//! seen. `\n` never occurs inside a multi-byte UTF-8 sequence, so a fragment
//! that ends halfway through a character simply stays buffered until the
//! rest of it arrives.

/// Line terminator of the streaming response body
const TERMINATOR: u8 = b'\n';

/// Accumulates fragments and hands out complete lines
///
/// Invariant: `buf` holds exactly the bytes received since the last
/// terminator and never contains one itself.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return every line it completed, in order
    ///
    /// Returned lines exclude the terminator and are not trimmed.
    pub fn feed(&mut self, fragment: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        // Only the new bytes can contain a terminator
        let mut line_start = 0;
        let mut pending = std::mem::take(&mut self.buf);

        for (offset, _) in fragment
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == TERMINATOR)
        {
            pending.extend_from_slice(&fragment[line_start..offset]);
            lines.push(String::from_utf8_lossy(&pending).into_owned());
            pending.clear();
            line_start = offset + 1;
        }

        pending.extend_from_slice(&fragment[line_start..]);
        self.buf = pending;

        lines
    }

    /// Return the unterminated remainder as a final line, once
    ///
    /// Called at end of stream because the server sends no terminator after
    /// the last record. Whitespace-only remainders yield nothing.
    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&rest);
        if line.trim().is_empty() {
            None
        } else {
            Some(line.into_owned())
        }
    }

    /// Bytes currently waiting for a terminator
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
