use std::fmt;

use langc_common::{Diagnostic, FileRange};

/// A parse error (§7 Parse errors): fatal for the production it occurs in.
///
/// The grammar's first-diagnostic-per-production policy means a module's
/// parser ever produces at most one of these; the offending declaration is
/// dropped and the module keeps whatever declarations parsed before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub range: FileRange,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: FileRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.message, self.range)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.range)
    }
}

impl std::error::Error for ParseError {}
