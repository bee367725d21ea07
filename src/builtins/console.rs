// ABOUTME: Output and process-control primitives (§4.E)

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::Value;
use std::io::Write;

pub fn apply(op: PrimOp, args: Vec<Value>) -> Result<Value, EvalError> {
    match op {
        PrimOp::Display => {
            print!("{}", args[0].display_string());
            std::io::stdout().flush().ok();
            Ok(Value::Void)
        }
        PrimOp::Void => Ok(Value::Void),
        PrimOp::Exit => Ok(Value::Terminate),
        _ => unreachable!("non-console op routed to console::apply"),
    }
}
