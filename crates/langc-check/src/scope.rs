//! The checker's context (§4.6): a stack of scope frames, each holding a
//! value symbol table, a type-param table, and a loop-depth counter.
//!
//! The previous implementation kept one active context and overwrote it on
//! function/lambda entry, losing the enclosing scope (§9 redesign note).
//! Here entering a function, lambda, catch clause, or for-body pushes a
//! fresh frame; leaving pops it, restoring whatever was visible before —
//! the context is replaced, not mutated, across siblings.

use rustc_hash::FxHashMap;

use langc_types::Type;

#[derive(Debug, Default)]
struct Frame {
    values: FxHashMap<String, Type>,
    type_params: FxHashMap<String, Type>,
    /// Set when this frame is a loop body, so `break`/`continue` validation
    /// (§4.6) doesn't have to walk outward past non-loop frames that don't
    /// themselves open a new loop.
    is_loop: bool,
}

/// A stack of [`Frame`]s. Index 0 is the module-level (outermost) scope.
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    /// Push a fresh frame (function/lambda/catch/for-body entry).
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Push a fresh loop-body frame, incrementing the loop-depth count seen
    /// by `in_loop`.
    pub fn push_loop(&mut self) {
        self.frames.push(Frame { is_loop: true, ..Frame::default() });
    }

    /// Pop the current frame, restoring the enclosing scope.
    ///
    /// # Panics
    /// Panics if called with only the module-level frame remaining.
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the module-level scope");
        self.frames.pop();
    }

    pub fn declare_value(&mut self, name: impl Into<String>, ty: Type) {
        self.frames.last_mut().expect("scope stack is never empty").values.insert(name.into(), ty);
    }

    pub fn declare_type_param(&mut self, name: impl Into<String>, ty: Type) {
        self.frames.last_mut().expect("scope stack is never empty").type_params.insert(name.into(), ty);
    }

    pub fn lookup_value(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.values.get(name))
    }

    pub fn lookup_type_param(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.type_params.get(name))
    }

    /// Whether a `break`/`continue` at this point is valid (§4.6, §7
    /// "invalid break/continue outside a loop").
    pub fn in_loop(&self) -> bool {
        self.frames.iter().rev().any(|frame| frame.is_loop)
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langc_types::IntSize;

    #[test]
    fn lookup_finds_value_in_enclosing_scope() {
        let mut scope = ScopeStack::new();
        scope.declare_value("x", Type::Bool);
        scope.push();
        assert_eq!(scope.lookup_value("x"), Some(&Type::Bool));
    }

    #[test]
    fn push_pop_restores_enclosing_scope_not_mutates_it() {
        let mut scope = ScopeStack::new();
        scope.declare_value("x", Type::Bool);
        scope.push();
        scope.declare_value("x", Type::integer(IntSize::S32, true));
        assert_eq!(scope.lookup_value("x"), Some(&Type::integer(IntSize::S32, true)));
        scope.pop();
        assert_eq!(scope.lookup_value("x"), Some(&Type::Bool));
    }

    #[test]
    fn in_loop_is_false_outside_any_loop_frame() {
        let mut scope = ScopeStack::new();
        assert!(!scope.in_loop());
        scope.push();
        assert!(!scope.in_loop());
    }

    #[test]
    fn in_loop_is_true_inside_a_loop_frame_even_through_nested_scopes() {
        let mut scope = ScopeStack::new();
        scope.push_loop();
        scope.push();
        assert!(scope.in_loop());
    }

    #[test]
    #[should_panic(expected = "cannot pop the module-level scope")]
    fn pop_module_scope_panics() {
        let mut scope = ScopeStack::new();
        scope.pop();
    }
}
