// ABOUTME: Exact integer/rational arithmetic primitives (§4.E)

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::Value;

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}

/// Builds the canonical-form `Rational` (§3.1): denominator positive,
/// numerator/denominator coprime. Never collapses to `Integer` even when
/// the reduced denominator is 1.
fn make_rational(num: i64, den: i64) -> Result<Value, EvalError> {
    if den == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let g = gcd(num, den);
    Ok(Value::Rational(num / g, den / g))
}

fn to_ratio(v: &Value, form: &str) -> Result<((i64, i64), bool), EvalError> {
    match v {
        Value::Integer(n) => Ok(((*n, 1), false)),
        Value::Rational(n, d) => Ok(((*n, *d), true)),
        other => Err(EvalError::type_error(form, "number", other.type_name())),
    }
}

fn as_integer(v: &Value, form: &str) -> Result<i64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n),
        other => Err(EvalError::type_error(form, "integer", other.type_name())),
    }
}

fn ratio_add(a: (i64, i64), b: (i64, i64)) -> Result<(i64, i64), EvalError> {
    let lhs = a.0.checked_mul(b.1).ok_or(EvalError::Overflow)?;
    let rhs = b.0.checked_mul(a.1).ok_or(EvalError::Overflow)?;
    let n = lhs.checked_add(rhs).ok_or(EvalError::Overflow)?;
    let d = a.1.checked_mul(b.1).ok_or(EvalError::Overflow)?;
    Ok((n, d))
}

fn ratio_sub(a: (i64, i64), b: (i64, i64)) -> Result<(i64, i64), EvalError> {
    let neg_n = b.0.checked_neg().ok_or(EvalError::Overflow)?;
    ratio_add(a, (neg_n, b.1))
}

fn ratio_mul(a: (i64, i64), b: (i64, i64)) -> Result<(i64, i64), EvalError> {
    let n = a.0.checked_mul(b.0).ok_or(EvalError::Overflow)?;
    let d = a.1.checked_mul(b.1).ok_or(EvalError::Overflow)?;
    Ok((n, d))
}

fn ratio_div(a: (i64, i64), b: (i64, i64)) -> Result<(i64, i64), EvalError> {
    if b.0 == 0 {
        return Err(EvalError::DivisionByZero);
    }
    ratio_mul(a, (b.1, b.0))
}

fn finalize(acc: (i64, i64), is_rational: bool) -> Result<Value, EvalError> {
    if is_rational {
        make_rational(acc.0, acc.1)
    } else {
        Ok(Value::Integer(acc.0))
    }
}

/// Folds `args` left to right with `combine`. Result stays `Integer` unless
/// some operand was already `Rational` (§4.E: "mixed with Rational promotes
/// to Rational").
fn variadic(
    args: &[Value],
    identity: i64,
    form: &str,
    combine: fn((i64, i64), (i64, i64)) -> Result<(i64, i64), EvalError>,
) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Ok(Value::Integer(identity));
    }
    let (mut acc, mut is_rational) = to_ratio(&args[0], form)?;
    for a in &args[1..] {
        let (next, rat) = to_ratio(a, form)?;
        is_rational |= rat;
        acc = combine(acc, next)?;
    }
    finalize(acc, is_rational)
}

/// `/` always produces a `Rational`, even when the quotient is exact — the
/// crate never collapses `Rational(n, 1)` back to `Integer(n)`.
fn div_all(args: &[Value]) -> Result<Value, EvalError> {
    let (mut acc, _) = to_ratio(&args[0], "/")?;
    for a in &args[1..] {
        let (next, _) = to_ratio(a, "/")?;
        acc = ratio_div(acc, next)?;
    }
    make_rational(acc.0, acc.1)
}

fn negate(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or(EvalError::Overflow),
        Value::Rational(n, d) => {
            let neg = n.checked_neg().ok_or(EvalError::Overflow)?;
            Ok(Value::Rational(neg, *d))
        }
        other => Err(EvalError::type_error("-", "number", other.type_name())),
    }
}

fn reciprocal(v: &Value) -> Result<Value, EvalError> {
    let (n, d) = match v {
        Value::Integer(n) => (*n, 1),
        Value::Rational(n, d) => (*n, *d),
        other => return Err(EvalError::type_error("/", "number", other.type_name())),
    };
    make_rational(d, n)
}

fn quotient(a: &Value, b: &Value) -> Result<Value, EvalError> {
    let x = as_integer(a, "quotient")?;
    let y = as_integer(b, "quotient")?;
    if y == 0 {
        return Err(EvalError::DivisionByZero);
    }
    x.checked_div(y).map(Value::Integer).ok_or(EvalError::Overflow)
}

fn modulo(a: &Value, b: &Value) -> Result<Value, EvalError> {
    let x = as_integer(a, "modulo")?;
    let y = as_integer(b, "modulo")?;
    if y == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let r = x.checked_rem(y).ok_or(EvalError::Overflow)?;
    // Scheme's `modulo` takes the sign of the divisor; `checked_rem` takes
    // the sign of the dividend, so correct when they disagree.
    let result = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
    Ok(Value::Integer(result))
}

fn expt(base: &Value, exp: &Value) -> Result<Value, EvalError> {
    let base = as_integer(base, "expt")?;
    let exp = as_integer(exp, "expt")?;
    if exp < 0 {
        return Err(EvalError::NegativeExponent);
    }
    if base == 0 && exp == 0 {
        return Err(EvalError::ZeroToTheZero);
    }
    let mut result: i64 = 1;
    let mut b = base;
    let mut e = exp as u64;
    while e > 0 {
        if e & 1 == 1 {
            result = result.checked_mul(b).ok_or(EvalError::Overflow)?;
        }
        e >>= 1;
        if e > 0 {
            b = b.checked_mul(b).ok_or(EvalError::Overflow)?;
        }
    }
    Ok(Value::Integer(result))
}

pub fn apply(op: PrimOp, args: Vec<Value>) -> Result<Value, EvalError> {
    match op {
        PrimOp::Add => variadic(&args, 0, "+", ratio_add),
        PrimOp::Mul => variadic(&args, 1, "*", ratio_mul),
        PrimOp::Sub if args.len() == 1 => negate(&args[0]),
        PrimOp::Sub => variadic(&args, 0, "-", ratio_sub),
        PrimOp::Div if args.len() == 1 => reciprocal(&args[0]),
        PrimOp::Div => div_all(&args),
        PrimOp::Quotient => quotient(&args[0], &args[1]),
        PrimOp::Modulo => modulo(&args[0], &args[1]),
        PrimOp::Expt => expt(&args[0], &args[1]),
        _ => unreachable!("non-arithmetic op routed to arithmetic::apply"),
    }
}
