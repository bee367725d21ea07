// ABOUTME: Pair and list primitives, including list? cycle detection (§4.E)

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::{PairCell, Value};

fn as_pair(v: &Value, form: &str) -> Result<PairCell, EvalError> {
    match v {
        Value::Pair(cell) => Ok(cell.clone()),
        other => Err(EvalError::type_error(form, "pair", other.type_name())),
    }
}

/// Floyd's tortoise-and-hare: walks the cdr chain at two speeds so a cyclic
/// spine terminates in O(n) instead of looping forever.
fn is_proper_list(v: &Value) -> bool {
    let mut slow = v.clone();
    let mut fast = v.clone();
    loop {
        match fast {
            Value::Null => return true,
            Value::Pair(ref cell) => {
                let next = cell.borrow().1.clone();
                fast = next;
            }
            _ => return false,
        }
        match fast {
            Value::Null => return true,
            Value::Pair(ref cell) => {
                let next = cell.borrow().1.clone();
                fast = next;
            }
            _ => return false,
        }
        slow = match slow {
            Value::Pair(ref cell) => cell.borrow().1.clone(),
            _ => return false,
        };
        if let (Value::Pair(s), Value::Pair(f)) = (&slow, &fast) {
            if std::rc::Rc::ptr_eq(s, f) {
                return false;
            }
        }
    }
}

pub fn apply(op: PrimOp, mut args: Vec<Value>) -> Result<Value, EvalError> {
    match op {
        PrimOp::Cons => {
            let cdr = args.pop().expect("arity checked: cons takes 2");
            let car = args.pop().expect("arity checked: cons takes 2");
            Ok(Value::cons(car, cdr))
        }
        PrimOp::Car => Ok(as_pair(&args[0], "car")?.borrow().0.clone()),
        PrimOp::Cdr => Ok(as_pair(&args[0], "cdr")?.borrow().1.clone()),
        PrimOp::SetCar => {
            let cell = as_pair(&args[0], "set-car!")?;
            cell.borrow_mut().0 = args[1].clone();
            Ok(Value::Void)
        }
        PrimOp::SetCdr => {
            let cell = as_pair(&args[0], "set-cdr!")?;
            cell.borrow_mut().1 = args[1].clone();
            Ok(Value::Void)
        }
        PrimOp::List => Ok(args
            .into_iter()
            .rev()
            .fold(Value::Null, |acc, v| Value::cons(v, acc))),
        PrimOp::PairP => Ok(Value::Boolean(matches!(args[0], Value::Pair(_)))),
        PrimOp::NullP => Ok(Value::Boolean(matches!(args[0], Value::Null))),
        PrimOp::ListP => Ok(Value::Boolean(is_proper_list(&args[0]))),
        _ => unreachable!("non-list op routed to lists::apply"),
    }
}
