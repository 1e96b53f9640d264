//! The operator table (§4.6, §9 "Operator table should be data, not code"):
//! a fixed list of `(symbol, fixity, operand-type-predicate) -> result-type`
//! entries, consulted in order. The first matching entry wins; no match is
//! an "invalid operator for operands" diagnostic naming the operator.

use langc_types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Binary,
    Prefix,
    Postfix,
}

/// One operator table entry. `resolve` inspects the operand type(s) and
/// returns the operator's `function_type` result, or `None` if this entry
/// doesn't apply to these operands — letting a later entry (or ultimately
/// nothing) match instead.
struct OperatorEntry {
    symbol: &'static str,
    fixity: Fixity,
    resolve: fn(&Type, Option<&Type>) -> Option<Type>,
}

fn numeric(t: &Type) -> bool {
    t.is_integer() || matches!(t, Type::Float(_))
}

fn arithmetic(a: &Type, b: Option<&Type>) -> Option<Type> {
    let b = b?;
    if numeric(a) && numeric(b) {
        Some(langc_types::ops::general(a, b))
    } else {
        None
    }
}

fn comparison(a: &Type, b: Option<&Type>) -> Option<Type> {
    let b = b?;
    let comparable = (numeric(a) && numeric(b)) || matches!((a, b), (Type::Char, Type::Char)) || matches!((a, b), (Type::Bool, Type::Bool));
    comparable.then_some(Type::Bool)
}

fn logical(a: &Type, b: Option<&Type>) -> Option<Type> {
    let b = b?;
    matches!((a, b), (Type::Bool, Type::Bool)).then_some(Type::Bool)
}

fn prefix_sign(a: &Type, b: Option<&Type>) -> Option<Type> {
    if b.is_some() {
        return None;
    }
    numeric(a).then(|| a.clone())
}

fn prefix_not(a: &Type, b: Option<&Type>) -> Option<Type> {
    if b.is_some() {
        return None;
    }
    matches!(a, Type::Bool).then_some(Type::Bool)
}

fn step(a: &Type, b: Option<&Type>) -> Option<Type> {
    if b.is_some() {
        return None;
    }
    a.is_integer().then(|| a.clone())
}

/// The fixed table (§9): arithmetic/comparison/logical binary operators,
/// sign/not prefix unary operators, and increment/decrement postfix unary
/// operators. `OPER` runs longer than these (§4.2 rule 8) simply fail to
/// match any entry and are reported as invalid.
const TABLE: &[OperatorEntry] = &[
    OperatorEntry { symbol: "+", fixity: Fixity::Binary, resolve: arithmetic },
    OperatorEntry { symbol: "-", fixity: Fixity::Binary, resolve: arithmetic },
    OperatorEntry { symbol: "*", fixity: Fixity::Binary, resolve: arithmetic },
    OperatorEntry { symbol: "/", fixity: Fixity::Binary, resolve: arithmetic },
    OperatorEntry { symbol: "%", fixity: Fixity::Binary, resolve: arithmetic },
    OperatorEntry { symbol: "==", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: "!=", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: "<", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: "<=", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: ">", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: ">=", fixity: Fixity::Binary, resolve: comparison },
    OperatorEntry { symbol: "&&", fixity: Fixity::Binary, resolve: logical },
    OperatorEntry { symbol: "||", fixity: Fixity::Binary, resolve: logical },
    OperatorEntry { symbol: "+", fixity: Fixity::Prefix, resolve: prefix_sign },
    OperatorEntry { symbol: "-", fixity: Fixity::Prefix, resolve: prefix_sign },
    OperatorEntry { symbol: "!", fixity: Fixity::Prefix, resolve: prefix_not },
    OperatorEntry { symbol: "++", fixity: Fixity::Postfix, resolve: step },
    OperatorEntry { symbol: "--", fixity: Fixity::Postfix, resolve: step },
];

/// Look up a binary operator's result type for the given operand types.
pub fn resolve_binary(symbol: &str, left: &Type, right: &Type) -> Option<Type> {
    TABLE.iter().filter(|e| e.symbol == symbol && e.fixity == Fixity::Binary).find_map(|e| (e.resolve)(left, Some(right)))
}

/// Look up a unary operator's result type (prefix or postfix) for the
/// given operand type.
pub fn resolve_unary(symbol: &str, is_postfix: bool, operand: &Type) -> Option<Type> {
    let fixity = if is_postfix { Fixity::Postfix } else { Fixity::Prefix };
    TABLE.iter().filter(|e| e.symbol == symbol && e.fixity == fixity).find_map(|e| (e.resolve)(operand, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_types::IntSize;

    fn i32() -> Type {
        Type::integer(IntSize::S32, true)
    }

    #[test]
    fn arithmetic_widens_to_the_general_type() {
        let wide = resolve_binary("+", &i32(), &Type::integer(IntSize::S8, true));
        assert_eq!(wide, Some(i32()));
    }

    #[test]
    fn comparison_always_yields_bool() {
        assert_eq!(resolve_binary("==", &i32(), &i32()), Some(Type::Bool));
    }

    #[test]
    fn logical_rejects_non_bool_operands() {
        assert_eq!(resolve_binary("&&", &i32(), &i32()), None);
    }

    #[test]
    fn prefix_not_requires_bool() {
        assert_eq!(resolve_unary("!", false, &Type::Bool), Some(Type::Bool));
        assert_eq!(resolve_unary("!", false, &i32()), None);
    }

    #[test]
    fn postfix_step_requires_integer() {
        assert_eq!(resolve_unary("++", true, &i32()), Some(i32()));
        assert_eq!(resolve_unary("++", true, &Type::Bool), None);
    }

    #[test]
    fn unknown_symbol_matches_nothing() {
        assert_eq!(resolve_binary("**", &i32(), &i32()), None);
    }
}
