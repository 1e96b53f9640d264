use langc_common::FileRange;

use crate::ast::{Ident, Param, Statement, TypeNode, TypeSlot};

/// The body of a function, lambda, or `FunctionBody` production: `Block |
/// Expression | Statement` (§4.4), tried in that order so an empty block
/// `{}` is disambiguated from an empty struct literal.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Statement),
    Expression(Expression),
    Statement(Statement),
}

/// A lambda's parameter list: either the shorthand single untyped
/// parameter (`x => x + 1`) or a fully named, typed list (`(i32 x) => x`).
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaParams {
    Shorthand(Ident),
    Named(Vec<Param>),
}

/// An `Expression` production node (§4.4): `Base Suffix*`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntegerLiteral { value: i128, range: FileRange, resolved: TypeSlot },
    FloatLiteral { value: f64, range: FileRange, resolved: TypeSlot },
    CharLiteral { value: char, range: FileRange, resolved: TypeSlot },
    BoolLiteral { value: bool, range: FileRange, resolved: TypeSlot },
    StringLiteral { value: String, range: FileRange, resolved: TypeSlot },
    StructLiteral { fields: Vec<(Ident, Expression)>, range: FileRange, resolved: TypeSlot },
    TupleLiteral { members: Vec<Expression>, range: FileRange, resolved: TypeSlot },
    ArrayLiteral { elements: Vec<Expression>, range: FileRange, resolved: TypeSlot },
    Identifier { name: Ident, resolved: TypeSlot },
    Parenthesized { inner: Box<Expression>, range: FileRange },
    /// `Ident '=' Expression`: introduces a new binding in the enclosing
    /// scope and evaluates to the bound value.
    VarDeclaration { name: Ident, value: Box<Expression>, range: FileRange, resolved: TypeSlot },
    Unary { op: String, operand: Box<Expression>, is_postfix: bool, range: FileRange, resolved: TypeSlot },
    Binary { op: String, left: Box<Expression>, right: Box<Expression>, range: FileRange, resolved: TypeSlot },
    Call {
        callee: Box<Expression>,
        type_args: Option<Vec<TypeNode>>,
        args: Vec<Expression>,
        range: FileRange,
        resolved: TypeSlot,
    },
    ArrayAccess { base: Box<Expression>, index: Box<Expression>, range: FileRange, resolved: TypeSlot },
    FieldAccess { base: Box<Expression>, field: Ident, range: FileRange, resolved: TypeSlot },
    IfElse {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
        range: FileRange,
        resolved: TypeSlot,
    },
    Lambda { params: LambdaParams, body: Box<FunctionBody>, range: FileRange, resolved: TypeSlot },
    /// A brace-delimited sequence of statements used as an expression (an
    /// `if`/`else` branch body). The block's value is its last statement's
    /// value when that statement is an [`crate::ast::Statement::ExpressionStatement`];
    /// the checker is responsible for that rule, not the parser.
    Block { statements: Vec<Statement>, range: FileRange, resolved: TypeSlot },
}

impl Expression {
    pub fn range(&self) -> &FileRange {
        match self {
            Expression::IntegerLiteral { range, .. }
            | Expression::FloatLiteral { range, .. }
            | Expression::CharLiteral { range, .. }
            | Expression::BoolLiteral { range, .. }
            | Expression::StringLiteral { range, .. }
            | Expression::StructLiteral { range, .. }
            | Expression::TupleLiteral { range, .. }
            | Expression::ArrayLiteral { range, .. }
            | Expression::Parenthesized { range, .. }
            | Expression::VarDeclaration { range, .. }
            | Expression::Unary { range, .. }
            | Expression::Binary { range, .. }
            | Expression::Call { range, .. }
            | Expression::ArrayAccess { range, .. }
            | Expression::FieldAccess { range, .. }
            | Expression::IfElse { range, .. }
            | Expression::Lambda { range, .. }
            | Expression::Block { range, .. } => range,
            Expression::Identifier { name, .. } => &name.range,
        }
    }
}
