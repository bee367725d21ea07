// ABOUTME: Numeric comparison primitives over exact rationals (§4.E)

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::Value;

fn ratio_of(v: &Value, form: &str) -> Result<(i128, i128), EvalError> {
    match v {
        Value::Integer(n) => Ok((*n as i128, 1)),
        Value::Rational(n, d) => Ok((*n as i128, *d as i128)),
        other => Err(EvalError::type_error(form, "number", other.type_name())),
    }
}

/// Cross-multiplies to compare two ratios without floating point. Both
/// denominators are positive (canonical `Rational` form), so the
/// cross-multiplication preserves ordering.
fn relate(op: PrimOp, (n1, d1): (i128, i128), (n2, d2): (i128, i128)) -> bool {
    let lhs = n1 * d2;
    let rhs = n2 * d1;
    match op {
        PrimOp::Lt => lhs < rhs,
        PrimOp::Le => lhs <= rhs,
        PrimOp::NumEq => lhs == rhs,
        PrimOp::Ge => lhs >= rhs,
        PrimOp::Gt => lhs > rhs,
        _ => unreachable!("non-comparison op routed to relate"),
    }
}

pub fn apply(op: PrimOp, args: Vec<Value>) -> Result<Value, EvalError> {
    let form = crate::primitives::name_of(op);
    let ratios = args
        .iter()
        .map(|v| ratio_of(v, form))
        .collect::<Result<Vec<_>, _>>()?;
    let chained = ratios.windows(2).all(|w| relate(op, w[0], w[1]));
    Ok(Value::Boolean(chained))
}
