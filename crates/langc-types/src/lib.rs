//! The type algebra: the fourteen-variant `Type` value and its constructors.
//!
//! Type operations (assignability, specification, inference, the general
//! type, and the behavioral queries) live in [`ops`], implemented as
//! pattern-matching methods on `Type` rather than per-type overrides, per
//! the visitor-pattern design note: one operation, one entry point, one
//! match arm per variant.

pub mod ops;

use std::fmt;

use indexmap::IndexMap;

/// How a type parameter's subtyping direction relates to its container's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Covariant,
    Contravariant,
    Invariant,
}

/// The width of an `Integer` type. `Unbounded` backs literals and constant
/// folding that haven't been narrowed to a machine width yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntSize {
    S8,
    S16,
    S32,
    S64,
    Unbounded,
}

impl IntSize {
    pub fn bits(self) -> u8 {
        match self {
            IntSize::S8 => 8,
            IntSize::S16 => 16,
            IntSize::S32 => 32,
            IntSize::S64 => 64,
            IntSize::Unbounded => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FloatSize {
    S32,
    S64,
}

/// The id of a `TypeDeclaration`, used by [`Type::Recursive`] instead of a
/// pointer so that cyclic type definitions don't require cyclic ownership.
/// Resolved back to a `Type` through a [`ops::DeclResolver`] supplied by the
/// checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

/// A declared type parameter: a name, its variance, and its upper-bound
/// constraint (defaults to `Any` when the source has none).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub variance: Variance,
    pub constraint: Box<Type>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>, variance: Variance, constraint: Type) -> Self {
        Self { name: name.into(), variance, constraint: Box::new(constraint) }
    }
}

/// The type-algebra value (§3 Data Model). Immutable after construction;
/// every operation that "changes" a type produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer { size: IntSize, signed: bool },
    Float(FloatSize),
    Char,
    Bool,
    Array(Box<Type>),
    Struct(IndexMap<String, Type>),
    Tuple(Vec<Type>),
    Function { params: Vec<Type>, ret: Box<Type>, type_params: IndexMap<String, TypeParam> },
    /// A type-parameterized definition before any type arguments are applied.
    Generic { type_params: IndexMap<String, TypeParam>, body: Box<Type> },
    /// A reference to a type parameter by name, in scope within a `Generic`
    /// or `Function`'s body.
    Param { name: String, variance: Variance, constraint: Box<Type> },
    /// A type parameter after substitution (`specify`); still carries its
    /// variance so assignability can consult it.
    Arg { variance: Variance, underlying: Box<Type> },
    Union(Vec<Type>),
    Any,
    Never,
    /// Error sentinel: behaves as `Never` for assignability, never surfaced
    /// to users (formatted as a placeholder).
    Unknown,
    Recursive(DeclId),
    /// Placeholder for a lambda parameter/return type before the call site
    /// fills it in.
    Inferred,
    Namespace { module_id: u32, exports: IndexMap<String, Type> },
}

impl Type {
    pub fn integer(size: IntSize, signed: bool) -> Self {
        Type::Integer { size, signed }
    }

    pub fn float(size: FloatSize) -> Self {
        Type::Float(size)
    }

    pub fn function(params: Vec<Type>, ret: Type, type_params: IndexMap<String, TypeParam>) -> Self {
        Type::Function { params, ret: Box::new(ret), type_params }
    }

    pub fn generic(type_params: IndexMap<String, TypeParam>, body: Type) -> Self {
        Type::Generic { type_params, body: Box::new(body) }
    }

    pub fn param(name: impl Into<String>, variance: Variance, constraint: Type) -> Self {
        Type::Param { name: name.into(), variance, constraint: Box::new(constraint) }
    }

    pub fn arg(variance: Variance, underlying: Type) -> Self {
        Type::Arg { variance, underlying: Box::new(underlying) }
    }

    /// Whether this is one of the three error/bottom sentinels that short
    /// circuit assignability regardless of target (§4.7).
    pub fn is_bottom_like(&self) -> bool {
        matches!(self, Type::Never | Type::Unknown | Type::Inferred)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer { size, signed } => {
                let prefix = if *signed { 'i' } else { 'u' };
                match size {
                    IntSize::S8 => write!(f, "{prefix}8"),
                    IntSize::S16 => write!(f, "{prefix}16"),
                    IntSize::S32 => write!(f, "{prefix}32"),
                    IntSize::S64 => write!(f, "{prefix}64"),
                    IntSize::Unbounded => write!(f, "{prefix}nteger"),
                }
            }
            Type::Float(FloatSize::S32) => write!(f, "f32"),
            Type::Float(FloatSize::S64) => write!(f, "f64"),
            Type::Char => write!(f, "char"),
            Type::Bool => write!(f, "bool"),
            Type::Array(elem) => write!(f, "{elem}[]"),
            Type::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, " }}")
            }
            Type::Tuple(members) => {
                write!(f, "(")?;
                for (i, ty) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            Type::Function { params, ret, .. } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") => {ret}")
            }
            Type::Generic { type_params, body } => {
                write!(f, "<")?;
                for (i, name) in type_params.keys().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}")?;
                }
                write!(f, ">{body}")
            }
            Type::Param { name, .. } => write!(f, "{name}"),
            Type::Arg { underlying, .. } => write!(f, "{underlying}"),
            Type::Union(members) => {
                for (i, ty) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{ty}")?;
                }
                Ok(())
            }
            Type::Any => write!(f, "any"),
            Type::Never => write!(f, "never"),
            Type::Unknown => write!(f, "<unknown>"),
            Type::Recursive(_) => write!(f, "<recursive>"),
            Type::Inferred => write!(f, "<inferred>"),
            Type::Namespace { .. } => write!(f, "<namespace>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_integer() {
        assert_eq!(Type::integer(IntSize::S8, false).to_string(), "u8");
        assert_eq!(Type::integer(IntSize::S64, true).to_string(), "i64");
    }

    #[test]
    fn display_function() {
        let t = Type::function(vec![Type::Bool, Type::Char], Type::Any, IndexMap::new());
        assert_eq!(t.to_string(), "(bool, char) => any");
    }

    #[test]
    fn is_bottom_like_covers_never_unknown_inferred() {
        assert!(Type::Never.is_bottom_like());
        assert!(Type::Unknown.is_bottom_like());
        assert!(Type::Inferred.is_bottom_like());
        assert!(!Type::Any.is_bottom_like());
    }
}
