//! Source positions.
//!
//! A [`Pos`] is a compact offset into a [`FileSet`]: every registered file
//! occupies a contiguous range of positions starting at its base, so a single
//! `u32` identifies both the file and the byte offset within it. `Pos::NONE`
//! (zero) is never inside a file.

mod line_map;

pub use line_map::LineMap;

/// A position in the file set. Zero means "no position".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Pos(u32);

impl Pos {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Identity of a registered source file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A resolved position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    /// `None` when the position is not inside any registered file.
    pub file: Option<FileId>,
    /// Empty when `file` is `None`.
    pub filename: String,
    /// 1-based, 0 when unknown.
    pub line: u32,
    /// 1-based, 0 when unknown.
    pub column: u32,
}

#[derive(Debug)]
struct SourceFile {
    name: String,
    base: u32,
    size: u32,
    lines: LineMap,
}

/// The set of source files of one compilation.
#[derive(Debug)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: u32,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            // Base 1 keeps Pos::NONE outside every file.
            next_base: 1,
        }
    }

    /// Register a file and its contents.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_file(&mut self, name: impl Into<String>, source: &str) -> FileId {
        let id = FileId(self.files.len() as u32);
        let size = source.len() as u32;
        let base = self.next_base;
        self.files.push(SourceFile {
            name: name.into(),
            base,
            size,
            lines: LineMap::new(source),
        });
        // +1 so that the end-of-file offset still maps into this file.
        self.next_base = base + size + 1;
        id
    }

    /// Position of byte `offset` within `file`.
    pub fn pos(&self, file: FileId, offset: u32) -> Pos {
        let f = &self.files[file.0 as usize];
        debug_assert!(offset <= f.size, "offset {offset} past end of {}", f.name);
        Pos(f.base + offset)
    }

    /// Files in registration order.
    pub fn iter(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len()).map(|i| FileId(i as u32))
    }

    pub fn name(&self, file: FileId) -> &str {
        &self.files[file.0 as usize].name
    }

    /// The file containing `pos`, if any.
    pub fn file(&self, pos: Pos) -> Option<FileId> {
        if !pos.is_valid() {
            return None;
        }
        let i = match self.files.binary_search_by(|f| f.base.cmp(&pos.0)) {
            Ok(i) => i,
            Err(0) => return None,
            Err(i) => i - 1,
        };
        let f = &self.files[i];
        (pos.0 <= f.base + f.size).then_some(FileId(i as u32))
    }

    /// Line of `pos`, or 0 when it is not inside a registered file.
    pub fn line(&self, pos: Pos) -> u32 {
        self.position(pos).line
    }

    /// Resolve `pos` to file, line and column.
    pub fn position(&self, pos: Pos) -> Position {
        let Some(id) = self.file(pos) else {
            return Position::default();
        };
        let f = &self.files[id.0 as usize];
        let (line, column) = f.lines.offset_to_line_col(pos.0 - f.base);
        Position {
            file: Some(id),
            filename: f.name.clone(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests;
