use langc_common::FileRange;

use crate::ast::{Expression, Ident, Param, TypeSlot};

/// A `Statement` production node (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block { statements: Vec<Statement>, range: FileRange, resolved: TypeSlot },
    ExpressionStatement { expr: Expression, range: FileRange },
    For { binding: Ident, iterable: Expression, body: Box<Statement>, range: FileRange },
    While { condition: Expression, body: Box<Statement>, range: FileRange },
    DoWhile { body: Box<Statement>, condition: Expression, range: FileRange },
    TryCatch {
        try_block: Box<Statement>,
        catch_param: Option<Param>,
        catch_block: Box<Statement>,
        finally_block: Option<Box<Statement>>,
        range: FileRange,
    },
    Return { value: Option<Expression>, range: FileRange },
    Throw { value: Expression, range: FileRange },
    Break { range: FileRange },
    Continue { range: FileRange },
}

impl Statement {
    pub fn range(&self) -> &FileRange {
        match self {
            Statement::Block { range, .. }
            | Statement::ExpressionStatement { range, .. }
            | Statement::For { range, .. }
            | Statement::While { range, .. }
            | Statement::DoWhile { range, .. }
            | Statement::TryCatch { range, .. }
            | Statement::Return { range, .. }
            | Statement::Throw { range, .. }
            | Statement::Break { range }
            | Statement::Continue { range } => range,
        }
    }
}
