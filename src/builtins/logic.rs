// ABOUTME: Type predicates, eq?, and not (§4.E)

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::Value;

pub fn apply(op: PrimOp, args: Vec<Value>) -> Result<Value, EvalError> {
    let b = match op {
        PrimOp::ProcedureP => args[0].is_procedure(),
        PrimOp::BooleanP => matches!(args[0], Value::Boolean(_)),
        PrimOp::SymbolP => matches!(args[0], Value::Symbol(_)),
        PrimOp::StringP => matches!(args[0], Value::String(_)),
        PrimOp::NumberP => matches!(args[0], Value::Integer(_) | Value::Rational(_, _)),
        PrimOp::EqP => args[0].is_eq(&args[1]),
        PrimOp::Not => !args[0].is_truthy(),
        _ => unreachable!("non-logic op routed to logic::apply"),
    };
    Ok(Value::Boolean(b))
}
