// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What a name is bound to. `Placeholder` is the sentinel a `letrec`,
/// top-level `define` group, or internal `begin`-define group installs
/// before its right-hand side has been evaluated (see §3.2/§4.D).
#[derive(Debug, Clone)]
enum Cell {
    Placeholder,
    Value(Value),
}

/// The result of looking a name up in an environment.
pub enum Lookup {
    Found(Value),
    /// Bound, but the cell still holds the `letrec`/`define` placeholder.
    Placeholder,
    Unbound,
}

/// A single frame in the lexical chain. A frame may bind more than one
/// name (e.g. all the bindings of one `let`), but the chain as a whole
/// still walks newest-frame-first, matching §3.2.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Rc<RefCell<Cell>>>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// The empty root environment, per §3.2 `empty()`.
    pub fn root() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// A new frame extending `parent`.
    pub fn child(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` to `value` in this frame, overwriting any existing
    /// binding of the same name in this frame only.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Rc::new(RefCell::new(Cell::Value(value))));
    }

    /// Reserves `name` in this frame with the placeholder sentinel,
    /// without evaluating anything yet. Used by `letrec` and define-groups.
    pub fn define_placeholder(&self, name: &str) {
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Rc::new(RefCell::new(Cell::Placeholder)));
    }

    /// Walks the chain newest-to-oldest looking for `name`.
    pub fn get(&self, name: &str) -> Lookup {
        if let Some(cell) = self.bindings.borrow().get(name) {
            return match &*cell.borrow() {
                Cell::Placeholder => Lookup::Placeholder,
                Cell::Value(v) => Lookup::Found(v.clone()),
            };
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => Lookup::Unbound,
        }
    }

    /// True if `name` is bound anywhere in the chain, placeholder or not.
    /// Used by the parser's shadowing rule (§4.C rule 2): a user binding,
    /// even one not yet initialized, shadows a primitive or reserved word.
    pub fn is_bound(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.is_bound(name),
            None => false,
        }
    }

    /// `modify(name, value, env)` from §3.2: mutates the cell of the
    /// innermost frame binding `name`. Returns `false` if `name` is unbound
    /// anywhere in the chain — callers (`set!`) must treat that as an error.
    pub fn modify(&self, name: &str, value: Value) -> bool {
        if let Some(cell) = self.bindings.borrow().get(name) {
            *cell.borrow_mut() = Cell::Value(value);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.modify(name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::root();
        env.define("x", Value::Integer(42));
        match env.get("x") {
            Lookup::Found(Value::Integer(n)) => assert_eq!(n, 42),
            _ => panic!("expected Found(Integer(42))"),
        }
    }

    #[test]
    fn unbound_name_is_unbound() {
        let env = Environment::root();
        assert!(matches!(env.get("y"), Lookup::Unbound));
        assert!(!env.is_bound("y"));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::root();
        parent.define("x", Value::Integer(1));
        let child = Environment::child(parent);
        child.define("x", Value::Integer(2));
        match child.get("x") {
            Lookup::Found(Value::Integer(n)) => assert_eq!(n, 2),
            _ => panic!("expected shadowed value"),
        }
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::root();
        parent.define("x", Value::Integer(1));
        let child = Environment::child(parent);
        match child.get("x") {
            Lookup::Found(Value::Integer(n)) => assert_eq!(n, 1),
            _ => panic!("expected parent value"),
        }
    }

    #[test]
    fn placeholder_is_distinguishable_from_a_value() {
        let env = Environment::root();
        env.define_placeholder("f");
        assert!(matches!(env.get("f"), Lookup::Placeholder));
        assert!(env.is_bound("f"));
    }

    #[test]
    fn modify_mutates_innermost_binding_frame() {
        let parent = Environment::root();
        parent.define("x", Value::Integer(1));
        let child = Environment::child(parent.clone());
        assert!(child.modify("x", Value::Integer(99)));
        match parent.get("x") {
            Lookup::Found(Value::Integer(n)) => assert_eq!(n, 99),
            _ => panic!("expected mutated value visible through parent"),
        }
    }

    #[test]
    fn modify_unbound_name_fails() {
        let env = Environment::root();
        assert!(!env.modify("nope", Value::Integer(1)));
    }

    #[test]
    fn closures_observe_mutation_through_shared_frame() {
        // A later define/set! on a captured environment must be visible
        // to a closure that captured the environment before the mutation.
        let env = Environment::root();
        env.define("x", Value::Integer(1));
        let captured = env.clone();
        env.define("x", Value::Integer(42));
        match captured.get("x") {
            Lookup::Found(Value::Integer(n)) => assert_eq!(n, 42),
            _ => panic!("expected the captured env to see the new binding"),
        }
    }
}
