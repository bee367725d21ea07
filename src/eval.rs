// ABOUTME: Evaluator — walks the typed AST against a lexical environment (§4.D)

use crate::ast::{CondClause, Expr};
use crate::builtins;
use crate::env::{Environment, Lookup};
use crate::error::EvalError;
use crate::primitives;
use crate::value::{Lambda, Value};
use std::rc::Rc;

/// `eval(node, env) -> value`: a pure recursive walk, single-threaded and
/// synchronous, with no reentrant state beyond the environment argument.
pub fn eval(expr: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match expr {
        Expr::Integer(n) => Ok(Value::Integer(*n)),
        Expr::Str(s) => Ok(Value::string(s.as_str())),
        Expr::True => Ok(Value::Boolean(true)),
        Expr::False => Ok(Value::Boolean(false)),
        Expr::Quote(v) => Ok(v.clone()),
        Expr::Var(name) => eval_var(name, env),
        Expr::If(test, conseq, alt) => {
            if eval(test, env)?.is_truthy() {
                eval(conseq, env)
            } else {
                eval(alt, env)
            }
        }
        Expr::Begin(exprs) => eval_sequence(exprs, env),
        Expr::And(exprs) => eval_and(exprs, env),
        Expr::Or(exprs) => eval_or(exprs, env),
        Expr::Cond(clauses) => eval_cond(clauses, env),
        Expr::Lambda(formals, body) => Ok(Value::Procedure(Rc::new(Lambda {
            formals: formals.to_vec(),
            body: body.clone(),
            env: env.clone(),
        }))),
        Expr::Apply(rator, rands) => eval_apply(rator, rands, env),
        Expr::Let(bindings, body) => eval_let(bindings, body, env),
        Expr::Letrec(bindings, body) => eval_letrec(bindings, body, env),
        Expr::Define(name, rhs) => eval_define(name, rhs, env),
        Expr::Set(name, rhs) => eval_set(name, rhs, env),
        Expr::PrimApp(op, args) => {
            let values = args
                .iter()
                .map(|a| eval(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            builtins::apply(*op, values)
        }
    }
}

fn eval_var(name: &str, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match env.get(name) {
        Lookup::Found(v) => Ok(v),
        Lookup::Placeholder => Err(EvalError::UsedBeforeDefined(name.to_string())),
        Lookup::Unbound => match primitives::lookup(name) {
            // Primitives are reified as first-class values on demand — see
            // the "unify Procedure and Primitive" design note.
            Some((op, _)) => Ok(Value::Primitive(op)),
            None => Err(EvalError::UndefinedVariable(name.to_string())),
        },
    }
}

fn eval_body_in_order(exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Void;
    for e in exprs {
        result = eval(e, env)?;
    }
    Ok(result)
}

/// A leading run of `define`s inside `begin` introduces a letrec-like group
/// for the remainder of the body (§4.D Begin).
fn eval_sequence(exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if exprs.is_empty() {
        return Ok(Value::Void);
    }
    let split = exprs.iter().take_while(|e| matches!(e, Expr::Define(_, _))).count();
    if split == 0 {
        return eval_body_in_order(exprs, env);
    }

    let inner_env = Environment::child(env.clone());
    let group: Vec<(String, Expr)> = exprs[..split]
        .iter()
        .map(|e| match e {
            Expr::Define(name, rhs) => (name.clone(), (**rhs).clone()),
            _ => unreachable!("take_while admits only Define here"),
        })
        .collect();
    for (name, _) in &group {
        inner_env.define_placeholder(name);
    }
    bind_group(&group, &inner_env)?;

    let rest = &exprs[split..];
    if rest.is_empty() {
        Ok(Value::Void)
    } else {
        eval_body_in_order(rest, &inner_env)
    }
}

/// Shared by `letrec`, internal `begin`-defines, and the REPL's top-level
/// define-group flushing (§9): every name in `bindings` is already a
/// placeholder in `env`; evaluate each right-hand side in source order and
/// mutate its cell in place.
pub fn bind_group(bindings: &[(String, Expr)], env: &Rc<Environment>) -> Result<(), EvalError> {
    for (name, rhs) in bindings {
        let value = eval(rhs, env)?;
        env.modify(name, value);
    }
    Ok(())
}

fn eval_and(exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Boolean(true);
    for e in exprs {
        result = eval(e, env)?;
        if !result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_or(exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    for e in exprs {
        let value = eval(e, env)?;
        if value.is_truthy() {
            return Ok(value);
        }
    }
    Ok(Value::Boolean(false))
}

fn eval_cond(clauses: &[CondClause], env: &Rc<Environment>) -> Result<Value, EvalError> {
    for clause in clauses {
        let test_value = match &clause.test {
            None => Value::Boolean(true), // `else`
            Some(test) => eval(test, env)?,
        };
        if test_value.is_truthy() {
            return if clause.body.is_empty() {
                Ok(test_value)
            } else {
                eval_body_in_order(&clause.body, env)
            };
        }
    }
    Ok(Value::Void)
}

fn eval_let(bindings: &[(String, Expr)], body: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut values = Vec::with_capacity(bindings.len());
    for (_, rhs) in bindings {
        values.push(eval(rhs, env)?);
    }
    let new_env = Environment::child(env.clone());
    for ((name, _), value) in bindings.iter().zip(values) {
        new_env.define(name, value);
    }
    eval(body, &new_env)
}

fn eval_letrec(bindings: &[(String, Expr)], body: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let new_env = Environment::child(env.clone());
    for (name, _) in bindings {
        new_env.define_placeholder(name);
    }
    bind_group(bindings, &new_env)?;
    eval(body, &new_env)
}

fn eval_define(name: &str, rhs: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    env.define_placeholder(name);
    let value = eval(rhs, env)?;
    env.modify(name, value);
    Ok(Value::Void)
}

fn eval_set(name: &str, rhs: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let value = eval(rhs, env)?;
    if env.modify(name, value) {
        Ok(Value::Void)
    } else {
        Err(EvalError::UndefinedVariable(name.to_string()))
    }
}

fn eval_apply(rator: &Expr, rands: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let proc = eval(rator, env)?;
    let args = rands
        .iter()
        .map(|r| eval(r, env))
        .collect::<Result<Vec<_>, _>>()?;
    apply_procedure(proc, args)
}

/// Applies an already-evaluated procedure value to already-evaluated
/// arguments (§4.D Apply). Exposed so `map`-style higher-order primitives,
/// if ever added, and the REPL's error paths can reuse it directly.
pub fn apply_procedure(proc: Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match proc {
        Value::Procedure(lambda) => {
            if lambda.formals.len() != args.len() {
                return Err(EvalError::arity(
                    "#<procedure>",
                    lambda.formals.len().to_string(),
                    args.len(),
                ));
            }
            let call_env = Environment::child(lambda.env.clone());
            for (formal, arg) in lambda.formals.iter().zip(args) {
                call_env.define(formal, arg);
            }
            eval(&lambda.body, &call_env)
        }
        Value::Primitive(op) => {
            let name = primitives::name_of(op);
            let (_, arity) = primitives::lookup(name).expect("every PrimOp has a table entry");
            if !arity.accepts(args.len()) {
                return Err(EvalError::arity(name, arity.describe(), args.len()));
            }
            builtins::apply(op, args)
        }
        _ => Err(EvalError::NotCallable),
    }
}
