use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::Serialize;

use crate::span::FileRange;

/// Severity of a [`Diagnostic`] (§3 Data Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single diagnostic produced anywhere in the frontend: lexing, parsing,
/// name resolution, or type checking (§7 Error Handling Design).
///
/// Every diagnostic names the file and source range it concerns, so the
/// same type serves lex/parse failures (fatal for their module) and
/// resolution/type errors (collected, non-fatal).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: FileRange,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: FileRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range }
    }

    pub fn warning(message: impl Into<String>, range: FileRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range }
    }

    pub fn info(message: impl Into<String>, range: FileRange) -> Self {
        Self { severity: Severity::Info, message: message.into(), range }
    }

    /// Render this diagnostic as a human-readable, source-annotated report.
    ///
    /// `source` must be the full text of `self.range.file()`. Byte offsets
    /// are not tracked on `FileRange`, so the line containing the range is
    /// used as the labeled span; this is sufficient for terminal display
    /// and keeps `Diagnostic` itself free of an offset field nothing else
    /// needs.
    pub fn render(&self, source: &str) -> String {
        let file = self.range.file().display().to_string();
        let line_no = self.range.start.line as usize;
        let (line_start, line_end) = line_bounds(source, line_no);
        let col_start = line_start + (self.range.start.column as usize - 1).min(line_end - line_start);
        let col_end = if self.range.end.line == self.range.start.line {
            (line_start + (self.range.end.column as usize - 1)).clamp(col_start, line_end)
        } else {
            line_end
        };
        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };
        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Blue,
        };

        let mut out = Vec::new();
        let report = Report::build(kind, (file.clone(), col_start..col_end.max(col_start + 1)))
            .with_message(&self.message)
            .with_label(
                Label::new((file.clone(), col_start..col_end.max(col_start + 1)))
                    .with_message(&self.message)
                    .with_color(color),
            )
            .finish();
        let _ = report.write((file, Source::from(source)), &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Byte offsets `[start, end)` of the `line_no`-th (1-based) line of `source`.
fn line_bounds(source: &str, line_no: usize) -> (usize, usize) {
    let mut current = 1usize;
    let mut start = 0usize;
    for (i, b) in source.bytes().enumerate() {
        if current == line_no && start == 0 && (i == 0 || source.as_bytes()[i - 1] == b'\n') {
            start = i;
        }
        if b == b'\n' {
            if current == line_no {
                return (start, i);
            }
            current += 1;
        }
    }
    if current == line_no {
        (start, source.len())
    } else {
        (0, 0)
    }
}

/// A lexer error (§7 Lex errors). Fatal for the offending module: lexing
/// halts and the loader retains the module with an empty body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub range: FileRange,
}

impl LexError {
    pub fn new(kind: LexErrorKind, range: FileRange) -> Self {
        Self { kind, range }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.kind.to_string(), self.range)
    }
}

/// The specific kind of lexer error, matching the §7 catalogue exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    InvalidCharacter(char),
    UnterminatedString,
    UnterminatedCharacter,
    EmptyCharacterLiteral,
    UnterminatedComment,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter(c) => write!(f, "invalid character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedCharacter => write!(f, "unterminated character literal"),
            Self::EmptyCharacterLiteral => write!(f, "empty character literal"),
            Self::UnterminatedComment => write!(f, "unterminated comment"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FilePosition;

    fn range(file: &str) -> FileRange {
        let start = FilePosition::start_of(file);
        let end = start.advance('x');
        FileRange::new(start, end)
    }

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::InvalidCharacter('@'), range("a.lang"));
        assert_eq!(err.to_string(), "invalid character: '@'");
    }

    #[test]
    fn lex_error_kind_display_all_variants() {
        assert_eq!(LexErrorKind::UnterminatedString.to_string(), "unterminated string literal");
        assert_eq!(LexErrorKind::UnterminatedCharacter.to_string(), "unterminated character literal");
        assert_eq!(LexErrorKind::EmptyCharacterLiteral.to_string(), "empty character literal");
        assert_eq!(LexErrorKind::UnterminatedComment.to_string(), "unterminated comment");
    }

    #[test]
    fn into_diagnostic_preserves_message_and_range() {
        let r = range("a.lang");
        let diag = LexError::new(LexErrorKind::UnterminatedString, r.clone()).into_diagnostic();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.range, r);
        assert_eq!(diag.message, "unterminated string literal");
    }

    #[test]
    fn render_includes_message() {
        let r = FileRange::new(
            FilePosition { file: "a.lang".into(), line: 1, column: 1 },
            FilePosition { file: "a.lang".into(), line: 1, column: 2 },
        );
        let diag = Diagnostic::error("bad thing", r);
        let rendered = diag.render("x = 1\n");
        assert!(rendered.contains("bad thing"));
    }
}
