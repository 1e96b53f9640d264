//! Resolution and type errors (§7): the non-fatal half of the diagnostic
//! catalogue. Unlike [`langc_parser::error::ParseError`], a [`CheckError`]
//! never halts anything — the offending node is typed `Unknown` and
//! checking continues (§7 policy).

use std::fmt;

use langc_common::{Diagnostic, FileRange};
use langc_types::Type;

/// One entry of the §7 "Resolution errors" / "Type errors" catalogues, plus
/// a stable code so diagnostics can be matched across runs (P8).
#[derive(Debug, Clone, PartialEq)]
pub enum CheckErrorKind {
    ModuleNotFound { module_name: String },
    ModuleDoesNotExportName { module_name: String, name: String },
    ExportNameClash { name: String },
    NameNotDefined { name: String },
    TypeNotDefined { name: String },
    NotANamespace { name: String },
    TypeMismatch { expected: Type, found: Type },
    NotGeneric { found: Type },
    NotGenericFunction { found: Type },
    NotArray { found: Type },
    NotStruct { found: Type },
    NotInvokable { found: Type },
    InvalidTypeArgCount { expected: usize, found: usize },
    InvalidArgCount { expected: usize, found: usize },
    InvalidTypeArg { constraint: Type, found: Type },
    InvalidOperator { symbol: String, operand_a: Type, operand_b: Option<Type> },
    InvalidBreakOutsideLoop,
    InvalidContinueOutsideLoop,
    InvalidLoopNumber,
    NoSuchField { ty: Type, field: String },
}

impl fmt::Display for CheckErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleNotFound { module_name } => write!(f, "module not found: \"{module_name}\""),
            Self::ModuleDoesNotExportName { module_name, name } => {
                write!(f, "module \"{module_name}\" does not export `{name}`")
            }
            Self::ExportNameClash { name } => write!(f, "export name clash: `{name}` is exported more than once"),
            Self::NameNotDefined { name } => write!(f, "name not defined: `{name}`"),
            Self::TypeNotDefined { name } => write!(f, "type not defined: `{name}`"),
            Self::NotANamespace { name } => write!(f, "`{name}` is not a namespace"),
            Self::TypeMismatch { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::NotGeneric { found } => write!(f, "{found} is not generic"),
            Self::NotGenericFunction { found } => write!(f, "{found} is not a generic function"),
            Self::NotArray { found } => write!(f, "{found} is not an array"),
            Self::NotStruct { found } => write!(f, "{found} is not a struct"),
            Self::NotInvokable { found } => write!(f, "{found} is not invokable"),
            Self::InvalidTypeArgCount { expected, found } => {
                write!(f, "expected {expected} type argument(s), found {found}")
            }
            Self::InvalidArgCount { expected, found } => write!(f, "expected {expected} argument(s), found {found}"),
            Self::InvalidTypeArg { constraint, found } => {
                write!(f, "type argument {found} violates constraint {constraint}")
            }
            Self::InvalidOperator { symbol, operand_a, operand_b: Some(b) } => {
                write!(f, "invalid operator `{symbol}` for operands {operand_a}, {b}")
            }
            Self::InvalidOperator { symbol, operand_a, operand_b: None } => {
                write!(f, "invalid operator `{symbol}` for operand {operand_a}")
            }
            Self::InvalidBreakOutsideLoop => write!(f, "`break` used outside a loop"),
            Self::InvalidContinueOutsideLoop => write!(f, "`continue` used outside a loop"),
            Self::InvalidLoopNumber => write!(f, "invalid loop target"),
            Self::NoSuchField { ty, field } => write!(f, "{ty} has no field `{field}`"),
        }
    }
}

/// Stable error code (§7, modeled on the teacher's `diagnostics.rs`
/// catalogue) so the same mistake always renders under the same code.
fn error_code(kind: &CheckErrorKind) -> &'static str {
    match kind {
        CheckErrorKind::ModuleNotFound { .. } => "R0001",
        CheckErrorKind::ModuleDoesNotExportName { .. } => "R0002",
        CheckErrorKind::ExportNameClash { .. } => "R0003",
        CheckErrorKind::NameNotDefined { .. } => "R0004",
        CheckErrorKind::TypeNotDefined { .. } => "R0005",
        CheckErrorKind::NotANamespace { .. } => "R0006",
        CheckErrorKind::TypeMismatch { .. } => "T0001",
        CheckErrorKind::NotGeneric { .. } => "T0002",
        CheckErrorKind::NotGenericFunction { .. } => "T0003",
        CheckErrorKind::NotArray { .. } => "T0004",
        CheckErrorKind::NotStruct { .. } => "T0005",
        CheckErrorKind::NotInvokable { .. } => "T0006",
        CheckErrorKind::InvalidTypeArgCount { .. } => "T0007",
        CheckErrorKind::InvalidArgCount { .. } => "T0008",
        CheckErrorKind::InvalidTypeArg { .. } => "T0009",
        CheckErrorKind::InvalidOperator { .. } => "T0010",
        CheckErrorKind::InvalidBreakOutsideLoop => "T0011",
        CheckErrorKind::InvalidContinueOutsideLoop => "T0012",
        CheckErrorKind::InvalidLoopNumber => "T0013",
        CheckErrorKind::NoSuchField { .. } => "T0014",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckError {
    pub kind: CheckErrorKind,
    pub range: FileRange,
}

impl CheckError {
    pub fn new(kind: CheckErrorKind, range: FileRange) -> Self {
        Self { kind, range }
    }

    pub fn code(&self) -> &'static str {
        error_code(&self.kind)
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let code = self.code();
        Diagnostic::error(format!("[{code}] {}", self.kind), self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_common::FilePosition;
    use langc_types::{IntSize, Type};

    fn range() -> FileRange {
        let start = FilePosition::start_of("a.lang");
        FileRange::new(start.clone(), start.advance('x'))
    }

    #[test]
    fn type_mismatch_renders_with_stable_code() {
        let err = CheckError::new(
            CheckErrorKind::TypeMismatch { expected: Type::Bool, found: Type::integer(IntSize::S32, true) },
            range(),
        );
        assert_eq!(err.code(), "T0001");
        let diag = err.into_diagnostic();
        assert!(diag.message.contains("[T0001]"));
        assert!(diag.message.contains("expected bool, found i32"));
    }

    #[test]
    fn name_not_defined_renders() {
        let err = CheckError::new(CheckErrorKind::NameNotDefined { name: "foo".into() }, range());
        assert_eq!(err.code(), "R0004");
        assert_eq!(err.kind.to_string(), "name not defined: `foo`");
    }
}
