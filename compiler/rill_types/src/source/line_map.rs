//! Line map for byte-offset to line/column conversion.

/// Pre-computed line start offsets of one file.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// `line_starts[0]` is always 0; `line_starts[n]` is the offset of line n+1.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Create a line map from source text.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to (line, column), both 1-indexed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn offset_to_line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx] + 1;

        (line, col)
    }

    /// Number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
