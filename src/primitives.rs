// ABOUTME: The primitive operator table shared by the parser, evaluator, and builtins

/// How many operands a primitive accepts, per §4.E and the Scheme-convention
/// arities spelled out in §4.C rule 3 (`(+) -> 0`, `(- x) -> -x`, comparisons
/// require at least 2, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }

    pub fn describe(self) -> String {
        match self {
            Arity::Exact(1) => "1".to_string(),
            Arity::Exact(k) => k.to_string(),
            Arity::AtLeast(k) => format!("at least {k}"),
        }
    }
}

/// Every primitive operator, reified as a first-class `Value::Primitive`
/// when referenced as a variable (§3.1, §4.D Var, design note in §9 — this
/// crate takes the "unify Procedure and Primitive" alternative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    Quotient,
    Modulo,
    Expt,
    Lt,
    Le,
    NumEq,
    Ge,
    Gt,
    Cons,
    Car,
    Cdr,
    SetCar,
    SetCdr,
    List,
    PairP,
    NullP,
    ListP,
    ProcedureP,
    BooleanP,
    SymbolP,
    StringP,
    NumberP,
    EqP,
    Not,
    Display,
    Void,
    Exit,
}

/// `(name, op, arity)` — the single source of truth the parser uses to
/// resolve an operator position (§4.C rule 3) and the evaluator/builtins
/// use to dispatch (§4.E).
pub const PRIMITIVES: &[(&str, PrimOp, Arity)] = &[
    ("+", PrimOp::Add, Arity::AtLeast(0)),
    ("-", PrimOp::Sub, Arity::AtLeast(1)),
    ("*", PrimOp::Mul, Arity::AtLeast(0)),
    ("/", PrimOp::Div, Arity::AtLeast(1)),
    ("quotient", PrimOp::Quotient, Arity::Exact(2)),
    ("modulo", PrimOp::Modulo, Arity::Exact(2)),
    ("expt", PrimOp::Expt, Arity::Exact(2)),
    ("<", PrimOp::Lt, Arity::AtLeast(2)),
    ("<=", PrimOp::Le, Arity::AtLeast(2)),
    ("=", PrimOp::NumEq, Arity::AtLeast(2)),
    (">=", PrimOp::Ge, Arity::AtLeast(2)),
    (">", PrimOp::Gt, Arity::AtLeast(2)),
    ("cons", PrimOp::Cons, Arity::Exact(2)),
    ("car", PrimOp::Car, Arity::Exact(1)),
    ("cdr", PrimOp::Cdr, Arity::Exact(1)),
    ("set-car!", PrimOp::SetCar, Arity::Exact(2)),
    ("set-cdr!", PrimOp::SetCdr, Arity::Exact(2)),
    ("list", PrimOp::List, Arity::AtLeast(0)),
    ("pair?", PrimOp::PairP, Arity::Exact(1)),
    ("null?", PrimOp::NullP, Arity::Exact(1)),
    ("list?", PrimOp::ListP, Arity::Exact(1)),
    ("procedure?", PrimOp::ProcedureP, Arity::Exact(1)),
    ("boolean?", PrimOp::BooleanP, Arity::Exact(1)),
    ("symbol?", PrimOp::SymbolP, Arity::Exact(1)),
    ("string?", PrimOp::StringP, Arity::Exact(1)),
    ("number?", PrimOp::NumberP, Arity::Exact(1)),
    ("eq?", PrimOp::EqP, Arity::Exact(2)),
    ("not", PrimOp::Not, Arity::Exact(1)),
    ("display", PrimOp::Display, Arity::Exact(1)),
    ("void", PrimOp::Void, Arity::Exact(0)),
    ("exit", PrimOp::Exit, Arity::Exact(0)),
];

pub fn lookup(name: &str) -> Option<(PrimOp, Arity)> {
    PRIMITIVES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, op, arity)| (*op, *arity))
}

pub fn name_of(op: PrimOp) -> &'static str {
    PRIMITIVES
        .iter()
        .find(|(_, o, _)| *o == op)
        .map(|(n, _, _)| *n)
        .expect("every PrimOp has a table entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_primitive_round_trips_its_name() {
        for (name, op, _) in PRIMITIVES {
            assert_eq!(name_of(*op), *name);
            assert_eq!(lookup(name).unwrap().0, *op);
        }
    }

    #[test]
    fn variadic_arithmetic_accepts_zero_or_more() {
        let (_, arity) = lookup("+").unwrap();
        assert!(arity.accepts(0));
        assert!(arity.accepts(1));
        assert!(arity.accepts(5));
    }

    #[test]
    fn subtraction_requires_at_least_one() {
        let (_, arity) = lookup("-").unwrap();
        assert!(!arity.accepts(0));
        assert!(arity.accepts(1));
    }

    #[test]
    fn comparisons_require_at_least_two() {
        let (_, arity) = lookup("<").unwrap();
        assert!(!arity.accepts(1));
        assert!(arity.accepts(2));
        assert!(arity.accepts(4));
    }
}
