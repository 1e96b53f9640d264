//! Type operations: assignability, specification, inference, the general
//! type, and the behavioral queries (§4.7).
//!
//! Each operation is one entry point on [`Type`] that matches on the
//! variant; there is no per-variant override mechanism to keep in sync.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::{DeclId, FloatSize, Type, TypeParam, Variance};

/// Resolves a [`DeclId`] back to the type it points at, so `Recursive`
/// doesn't need to own a cyclic reference to its declaration.
pub trait DeclResolver {
    fn resolve_recursive(&self, id: DeclId) -> Type;
}

/// A resolver for contexts with no declaration table (tests, `general`'s
/// internal merges): every recursive type degrades to `Unknown`.
pub struct NoRecursion;

impl DeclResolver for NoRecursion {
    fn resolve_recursive(&self, _id: DeclId) -> Type {
        Type::Unknown
    }
}

/// Errors from the behavioral-query getters (§7 type-error catalogue).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeOpError {
    NotArray,
    NotStruct,
    NotFunction,
    NotGeneric,
    NotTuple,
    NotNumeric,
    NoSuchField(String),
}

impl Type {
    /// `to.assignable_from(from)`: a value of type `from` is valid where
    /// `to` is expected.
    pub fn assignable_from(&self, from: &Type, resolver: &dyn DeclResolver) -> bool {
        if from.is_bottom_like() {
            return true;
        }
        match self {
            Type::Integer { size: sz_to, signed: signed_to } => match from {
                Type::Integer { size: sz_from, signed: signed_from } => {
                    sz_to >= sz_from
                        && !(!signed_to && *signed_from)
                        && !(sz_to == sz_from && *signed_to && !signed_from)
                }
                _ => false,
            },
            Type::Float(sz_to) => matches!(from, Type::Float(sz_from) if sz_to >= sz_from),
            Type::Char => matches!(from, Type::Char),
            Type::Bool => matches!(from, Type::Bool),
            Type::Array(a) => match from {
                Type::Array(b) => a.assignable_from(b, resolver),
                _ => false,
            },
            Type::Struct(to_fields) => match from {
                Type::Struct(from_fields) => to_fields.iter().all(|(name, to_ty)| {
                    from_fields.get(name).is_some_and(|from_ty| to_ty.assignable_from(from_ty, resolver))
                }),
                _ => false,
            },
            Type::Tuple(to_members) => match from {
                Type::Tuple(from_members) => {
                    to_members.len() == from_members.len()
                        && to_members.iter().zip(from_members).all(|(t, f)| t.assignable_from(f, resolver))
                }
                _ => false,
            },
            Type::Function { params: to_params, ret: to_ret, .. } => match from {
                Type::Function { params: from_params, ret: from_ret, .. } => {
                    to_params.len() == from_params.len()
                        && to_ret.assignable_from(from_ret, resolver)
                        && to_params.iter().zip(from_params).all(|(tp, fp)| tp.assignable_from(fp, resolver))
                }
                _ => false,
            },
            Type::Param { constraint, .. } => constraint.assignable_from(from, resolver),
            Type::Arg { variance, underlying } => match variance {
                Variance::Covariant => underlying.assignable_from(from, resolver),
                Variance::Contravariant => from.assignable_from(underlying, resolver),
                Variance::Invariant => {
                    underlying.assignable_from(from, resolver) && from.assignable_from(underlying, resolver)
                }
            },
            Type::Union(to_members) => match from {
                Type::Union(from_members) => {
                    from_members.iter().all(|fm| to_members.iter().any(|tm| tm.assignable_from(fm, resolver)))
                }
                _ => to_members.iter().any(|tm| tm.assignable_from(from, resolver)),
            },
            Type::Any => true,
            Type::Unknown | Type::Inferred => true,
            Type::Never => false,
            Type::Recursive(id) => resolver.resolve_recursive(*id).assignable_from(from, resolver),
            Type::Generic { .. } => false,
            Type::Namespace { .. } => matches!(from, Type::Namespace { module_id, .. } if self.namespace_id() == Some(*module_id)),
        }
    }

    fn namespace_id(&self) -> Option<u32> {
        match self {
            Type::Namespace { module_id, .. } => Some(*module_id),
            _ => None,
        }
    }

    /// `t.specify(bindings)`: substitute every `Param(name)` with
    /// `bindings[name]`, recursing into every component type. Primitive and
    /// sentinel variants clone themselves unchanged (P5).
    pub fn specify(&self, bindings: &FxHashMap<String, Type>) -> Type {
        match self {
            Type::Param { name, .. } => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Array(elem) => Type::Array(Box::new(elem.specify(bindings))),
            Type::Struct(fields) => {
                Type::Struct(fields.iter().map(|(name, ty)| (name.clone(), ty.specify(bindings))).collect())
            }
            Type::Tuple(members) => Type::Tuple(members.iter().map(|ty| ty.specify(bindings)).collect()),
            Type::Function { params, ret, type_params } => Type::Function {
                params: params.iter().map(|ty| ty.specify(bindings)).collect(),
                ret: Box::new(ret.specify(bindings)),
                type_params: type_params.clone(),
            },
            Type::Generic { type_params, body } => {
                Type::Generic { type_params: type_params.clone(), body: Box::new(body.specify(bindings)) }
            }
            Type::Arg { variance, underlying } => {
                Type::Arg { variance: *variance, underlying: Box::new(underlying.specify(bindings)) }
            }
            Type::Union(members) => Type::Union(members.iter().map(|ty| ty.specify(bindings)).collect()),
            other => other.clone(),
        }
    }

    /// `f.infer_type_arguments(arg_types)`: only meaningful when `self` is a
    /// `Function`; any other variant yields empty bindings.
    pub fn infer_type_arguments(&self, arg_types: &[Type]) -> IndexMap<String, Type> {
        match self {
            Type::Function { params, type_params, .. } => infer_type_arguments(params, type_params, arg_types),
            _ => IndexMap::new(),
        }
    }

    // ── Behavioral queries ──────────────────────────────────────────────

    pub fn is_integer(&self) -> bool {
        match self {
            Type::Integer { .. } | Type::Never => true,
            Type::Union(members) => members.iter().all(Type::is_integer),
            _ => false,
        }
    }

    pub fn is_function(&self) -> bool {
        match self {
            Type::Function { .. } | Type::Never => true,
            Type::Union(members) => members.iter().all(Type::is_function),
            _ => false,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        match self {
            Type::Struct(fields) => fields.contains_key(name),
            Type::Never => true,
            Type::Union(members) => members.iter().all(|m| m.has_field(name)),
            _ => false,
        }
    }

    pub fn get_base_type(&self) -> Result<Type, TypeOpError> {
        match self {
            Type::Array(elem) => Ok((**elem).clone()),
            Type::Never => Ok(Type::Never),
            Type::Union(members) => Ok(Type::Union(collect_member_results(members, Type::get_base_type)?)),
            _ => Err(TypeOpError::NotArray),
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Type, TypeOpError> {
        match self {
            Type::Struct(fields) => {
                fields.get(name).cloned().ok_or_else(|| TypeOpError::NoSuchField(name.to_string()))
            }
            Type::Never => Err(TypeOpError::NotStruct),
            Type::Union(members) => Ok(Type::Union(collect_member_results(members, |m| m.get_field(name))?)),
            _ => Err(TypeOpError::NotStruct),
        }
    }

    pub fn get_params(&self) -> Result<Vec<Type>, TypeOpError> {
        match self {
            Type::Function { params, .. } => Ok(params.clone()),
            Type::Never => Err(TypeOpError::NotFunction),
            Type::Union(members) => {
                let per_member = collect_member_results(members, Type::get_params)?;
                Ok(merge_parallel(per_member))
            }
            _ => Err(TypeOpError::NotFunction),
        }
    }

    pub fn get_return_type(&self) -> Result<Type, TypeOpError> {
        match self {
            Type::Function { ret, .. } => Ok((**ret).clone()),
            Type::Never => Ok(Type::Never),
            Type::Union(members) => Ok(Type::Union(collect_member_results(members, Type::get_return_type)?)),
            _ => Err(TypeOpError::NotFunction),
        }
    }

    pub fn get_type_params(&self) -> Result<IndexMap<String, TypeParam>, TypeOpError> {
        match self {
            Type::Generic { type_params, .. } | Type::Function { type_params, .. } => Ok(type_params.clone()),
            _ => Err(TypeOpError::NotGeneric),
        }
    }

    pub fn get_tuple_types(&self) -> Result<Vec<Type>, TypeOpError> {
        match self {
            Type::Tuple(members) => Ok(members.clone()),
            Type::Never => Err(TypeOpError::NotTuple),
            Type::Union(members) => {
                let per_member = collect_member_results(members, Type::get_tuple_types)?;
                Ok(merge_parallel(per_member))
            }
            _ => Err(TypeOpError::NotTuple),
        }
    }

    pub fn get_size(&self) -> Result<u8, TypeOpError> {
        match self {
            Type::Integer { size, .. } => Ok(size.bits()),
            Type::Float(FloatSize::S32) => Ok(32),
            Type::Float(FloatSize::S64) => Ok(64),
            _ => Err(TypeOpError::NotNumeric),
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Type::Integer { signed: true, .. })
    }
}

/// Map a fallible per-member query over a union's members, short-circuiting
/// on the first failure (a union satisfies a query only if every member
/// does).
fn collect_member_results<T>(members: &[Type], f: impl Fn(&Type) -> Result<T, TypeOpError>) -> Result<Vec<T>, TypeOpError> {
    members.iter().map(f).collect()
}

/// Merge parallel vectors (one per union member) positionally via `general`,
/// for getters like `get_params`/`get_tuple_types` that return a list.
fn merge_parallel(per_member: Vec<Vec<Type>>) -> Vec<Type> {
    let arity = per_member.first().map(Vec::len).unwrap_or(0);
    let mut merged = vec![Type::Never; arity];
    for member in &per_member {
        for (slot, ty) in merged.iter_mut().zip(member) {
            *slot = general(slot, ty);
        }
    }
    merged
}

/// `general(a, b)`: the narrowest type assignable from both, or `Any` if
/// neither is assignable from the other.
pub fn general(a: &Type, b: &Type) -> Type {
    let resolver = NoRecursion;
    let b_into_a = a.assignable_from(b, &resolver);
    let a_into_b = b.assignable_from(a, &resolver);
    match (b_into_a, a_into_b) {
        (true, false) => a.clone(),
        (false, true) => b.clone(),
        (false, false) => Type::Any,
        (true, true) => a.clone(),
    }
}

/// Infer type-parameter bindings by walking `params` and `arg_types` in
/// parallel, starting every parameter bound to `Never` (§4.6).
fn infer_type_arguments(params: &[Type], type_params: &IndexMap<String, TypeParam>, arg_types: &[Type]) -> IndexMap<String, Type> {
    let mut bindings: IndexMap<String, Type> = type_params.keys().map(|name| (name.clone(), Type::Never)).collect();
    for (param_ty, arg_ty) in params.iter().zip(arg_types) {
        bind_from_param(param_ty, arg_ty, &mut bindings);
    }
    bindings
}

fn bind_from_param(param_ty: &Type, arg_ty: &Type, bindings: &mut IndexMap<String, Type>) {
    match param_ty {
        Type::Param { name, .. } => {
            if let Some(current) = bindings.get(name) {
                let widened = general(current, arg_ty);
                bindings.insert(name.clone(), widened);
            }
        }
        Type::Array(elem) => {
            if let Type::Array(arg_elem) = arg_ty {
                bind_from_param(elem, arg_elem, bindings);
            }
        }
        Type::Tuple(members) => {
            if let Type::Tuple(arg_members) = arg_ty {
                for (m, a) in members.iter().zip(arg_members) {
                    bind_from_param(m, a, bindings);
                }
            }
        }
        Type::Function { params, ret, .. } => {
            if let Type::Function { params: arg_params, ret: arg_ret, .. } = arg_ty {
                for (p, a) in params.iter().zip(arg_params) {
                    bind_from_param(p, a, bindings);
                }
                bind_from_param(ret, arg_ret, bindings);
            }
        }
        Type::Struct(fields) => {
            if let Type::Struct(arg_fields) = arg_ty {
                for (name, ty) in fields {
                    if let Some(a) = arg_fields.get(name) {
                        bind_from_param(ty, a, bindings);
                    }
                }
            }
        }
        Type::Arg { underlying, .. } => bind_from_param(underlying, arg_ty, bindings),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntSize;

    fn i(size: IntSize, signed: bool) -> Type {
        Type::integer(size, signed)
    }

    #[test]
    fn p4_assignability_is_reflexive() {
        let resolver = NoRecursion;
        for t in [Type::Bool, Type::Char, i(IntSize::S32, true), Type::Any] {
            assert!(t.assignable_from(&t, &resolver));
        }
    }

    #[test]
    fn p4_assignability_is_transitive_for_integers() {
        let resolver = NoRecursion;
        let a = i(IntSize::S64, true);
        let b = i(IntSize::S32, true);
        let c = i(IntSize::S8, true);
        assert!(a.assignable_from(&b, &resolver));
        assert!(b.assignable_from(&c, &resolver));
        assert!(a.assignable_from(&c, &resolver));
    }

    #[test]
    fn unsigned_does_not_accept_signed_same_width() {
        let resolver = NoRecursion;
        assert!(!i(IntSize::S32, false).assignable_from(&i(IntSize::S32, true), &resolver));
        assert!(i(IntSize::S32, true).assignable_from(&i(IntSize::S32, false), &resolver));
    }

    #[test]
    fn function_assignability_is_contravariant_in_params() {
        let resolver = NoRecursion;
        let narrow = Type::function(vec![i(IntSize::S32, true), i(IntSize::S32, true)], Type::Float(FloatSize::S32), IndexMap::new());
        let wide = Type::function(vec![i(IntSize::S64, true), i(IntSize::S64, true)], Type::Float(FloatSize::S64), IndexMap::new());
        assert!(wide.assignable_from(&narrow, &resolver));
        assert!(!narrow.assignable_from(&wide, &resolver));
    }

    #[test]
    fn union_assignability_matches_scenario_5() {
        let resolver = NoRecursion;
        let union = Type::Union(vec![i(IntSize::S32, true), Type::Bool]);
        assert!(union.assignable_from(&i(IntSize::S8, true), &resolver));
        assert!(!union.assignable_from(&Type::Char, &resolver));
    }

    #[test]
    fn p5_specify_with_empty_bindings_is_identity() {
        let t = Type::function(vec![Type::param("T", Variance::Invariant, Type::Any)], Type::Bool, IndexMap::new());
        let bindings = FxHashMap::default();
        assert_eq!(t.specify(&bindings), t);
    }

    #[test]
    fn specify_substitutes_param_with_binding() {
        let t = Type::param("T", Variance::Invariant, Type::Any);
        let mut bindings = FxHashMap::default();
        bindings.insert("T".to_string(), Type::arg(Variance::Invariant, i(IntSize::S32, true)));
        assert_eq!(t.specify(&bindings), Type::arg(Variance::Invariant, i(IntSize::S32, true)));
    }

    #[test]
    fn general_picks_the_wider_assignable_type() {
        assert_eq!(general(&i(IntSize::S64, true), &i(IntSize::S8, true)), i(IntSize::S64, true));
        assert_eq!(general(&Type::Bool, &Type::Char), Type::Any);
    }

    #[test]
    fn p6_inference_matches_scenario_4() {
        let mut type_params = IndexMap::new();
        type_params.insert("T".to_string(), TypeParam::new("T", Variance::Invariant, Type::Any));
        let identity = Type::function(vec![Type::param("T", Variance::Invariant, Type::Any)], Type::param("T", Variance::Invariant, Type::Any), type_params);
        let bindings = identity.infer_type_arguments(&[i(IntSize::S8, false)]);
        assert_eq!(bindings.get("T"), Some(&i(IntSize::S8, false)));
    }

    #[test]
    fn never_satisfies_every_is_query_but_errors_on_most_getters() {
        assert!(Type::Never.is_integer());
        assert!(Type::Never.is_function());
        assert_eq!(Type::Never.get_base_type(), Ok(Type::Never));
        assert_eq!(Type::Never.get_return_type(), Ok(Type::Never));
        assert!(Type::Never.get_field("x").is_err());
    }

    #[test]
    fn any_fails_every_is_query() {
        assert!(!Type::Any.is_integer());
        assert!(!Type::Any.is_function());
        assert!(!Type::Any.has_field("x"));
    }
}
