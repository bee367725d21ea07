// ABOUTME: Primitive dispatch table — routes a PrimOp to its implementing submodule (§4.E)

mod arithmetic;
mod comparison;
mod console;
mod lists;
mod logic;

use crate::error::EvalError;
use crate::primitives::PrimOp;
use crate::value::Value;

pub fn apply(op: PrimOp, args: Vec<Value>) -> Result<Value, EvalError> {
    use PrimOp::*;
    match op {
        Add | Sub | Mul | Div | Quotient | Modulo | Expt => arithmetic::apply(op, args),
        Lt | Le | NumEq | Ge | Gt => comparison::apply(op, args),
        Cons | Car | Cdr | SetCar | SetCdr | List | PairP | NullP | ListP => lists::apply(op, args),
        ProcedureP | BooleanP | SymbolP | StringP | NumberP | EqP | Not => logic::apply(op, args),
        Display | Void | Exit => console::apply(op, args),
    }
}
