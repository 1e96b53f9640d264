use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A single location within a source file: a 1-based line and column.
///
/// Columns advance by one for every non-newline character consumed; a `\n`
/// resets the column to 1 and advances the line by one. Positions are
/// produced by the character stream as it reads and never move backwards
/// within a single read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePosition {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl FilePosition {
    /// The position at the very start of `file`: line 1, column 1.
    pub fn start_of(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into(), line: 1, column: 1 }
    }

    /// The position after consuming `c`, per the advance rule above.
    pub fn advance(&self, c: char) -> Self {
        if c == '\n' {
            Self { file: self.file.clone(), line: self.line + 1, column: 1 }
        } else {
            Self { file: self.file.clone(), line: self.line, column: self.column + 1 }
        }
    }
}

impl fmt::Display for FilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A half-open range between two [`FilePosition`]s within the same file.
///
/// Formed by consuming some image of source text starting from a start
/// position; `end` is the position immediately after the last character of
/// that image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRange {
    pub start: FilePosition,
    pub end: FilePosition,
}

impl FileRange {
    pub fn new(start: FilePosition, end: FilePosition) -> Self {
        debug_assert_eq!(start.file, end.file, "a range must not span files");
        Self { start, end }
    }

    /// A zero-width range at `pos` (used for EOF tokens and synthetic spans).
    pub fn empty_at(pos: FilePosition) -> Self {
        Self { end: pos.clone(), start: pos }
    }

    pub fn file(&self) -> &Path {
        &self.start.file
    }

    /// The smallest range that contains both `self` and `other`.
    ///
    /// Used by `left_recursive` suffix composition (§4.3) to widen a node's
    /// range as suffixes fold onto its base.
    pub fn merge(&self, other: &FileRange) -> FileRange {
        let start = if (self.start.line, self.start.column) <= (other.start.line, other.start.column) {
            self.start.clone()
        } else {
            other.start.clone()
        };
        let end = if (self.end.line, self.end.column) >= (other.end.line, other.end.column) {
            self.end.clone()
        } else {
            other.end.clone()
        };
        FileRange { start, end }
    }
}

impl fmt::Display for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.start.file.display(),
            self.start.line,
            self.start.column,
            self.end.line,
            self.end.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_non_newline_moves_column() {
        let p = FilePosition::start_of("a.lang");
        let p = p.advance('x');
        assert_eq!(p.line, 1);
        assert_eq!(p.column, 2);
    }

    #[test]
    fn advance_newline_resets_column() {
        let p = FilePosition::start_of("a.lang");
        let p = p.advance('\n');
        assert_eq!(p.line, 2);
        assert_eq!(p.column, 1);
    }

    #[test]
    fn merge_widens_to_cover_both() {
        let file = "a.lang";
        let a = FileRange::new(
            FilePosition { file: file.into(), line: 1, column: 1 },
            FilePosition { file: file.into(), line: 1, column: 5 },
        );
        let b = FileRange::new(
            FilePosition { file: file.into(), line: 1, column: 3 },
            FilePosition { file: file.into(), line: 2, column: 2 },
        );
        let merged = a.merge(&b);
        assert_eq!(merged.start.column, 1);
        assert_eq!(merged.end.line, 2);
        assert_eq!(merged.end.column, 2);
    }

    #[test]
    fn empty_at_has_zero_width() {
        let pos = FilePosition { file: "a.lang".into(), line: 3, column: 4 };
        let range = FileRange::empty_at(pos.clone());
        assert_eq!(range.start, pos.clone());
        assert_eq!(range.end, pos);
    }
}
