// ABOUTME: Parser — resolves a read `Sexp` tree into a typed `Expr` AST (§4.C)

use crate::ast::{body_expr, CondClause, Expr};
use crate::env::Environment;
use crate::error::ParseError;
use crate::primitives;
use crate::reader::Sexp;
use crate::value::Value;
use std::rc::Rc;

const RESERVED: &[&str] = &[
    "let", "letrec", "lambda", "if", "begin", "and", "or", "cond", "quote", "define", "set!",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Defining or setting a primitive or reserved-word name is always an error
/// (§4.D Define, §7 Name errors), independent of whether it's currently
/// shadowed in some enclosing scope.
fn check_definable(name: &str) -> Result<(), ParseError> {
    if is_reserved(name) || primitives::lookup(name).is_some() {
        Err(ParseError::ReservedName(name.to_string()))
    } else {
        Ok(())
    }
}

fn ident(sexp: &Sexp, form: &str) -> Result<String, ParseError> {
    match sexp {
        Sexp::Sym(name) => Ok(name.clone()),
        _ => Err(ParseError::BadBinder {
            form: form.to_string(),
        }),
    }
}

fn check_distinct(names: &[String]) -> Result<(), ParseError> {
    for (i, a) in names.iter().enumerate() {
        if names[..i].contains(a) {
            return Err(ParseError::DuplicateParam(a.clone()));
        }
    }
    Ok(())
}

fn parse_args(sexps: &[Sexp], env: &Rc<Environment>) -> Result<Vec<Expr>, ParseError> {
    sexps.iter().map(|s| parse(s, env)).collect()
}

/// Structurally converts a read `Sexp` into the `Value` a `quote` produces
/// (§4.C quote, §4.D Quote). Dotted-pair notation `(a b . c)` is recognized
/// by the literal `.` symbol sitting second-to-last in the list.
fn quote_value(sexp: &Sexp) -> Result<Value, ParseError> {
    match sexp {
        Sexp::Int(n) => Ok(Value::Integer(*n)),
        Sexp::Bool(b) => Ok(Value::Boolean(*b)),
        Sexp::Str(s) => Ok(Value::string(s.as_str())),
        Sexp::Sym(s) => Ok(Value::symbol(s.as_str())),
        Sexp::List(items) => quote_list(items),
    }
}

fn quote_list(items: &[Sexp]) -> Result<Value, ParseError> {
    if items.is_empty() {
        return Ok(Value::Null);
    }

    let dot_at = items.iter().position(|s| matches!(s, Sexp::Sym(d) if d == "."));
    match dot_at {
        None => {
            let mut result = Value::Null;
            for item in items.iter().rev() {
                result = Value::cons(quote_value(item)?, result);
            }
            Ok(result)
        }
        Some(pos) if pos == items.len() - 2 && pos > 0 => {
            let tail = quote_value(&items[items.len() - 1])?;
            let mut result = tail;
            for item in items[..pos].iter().rev() {
                result = Value::cons(quote_value(item)?, result);
            }
            Ok(result)
        }
        Some(_) => Err(ParseError::DottedPairMalformed),
    }
}

/// Converts one read form into an `Expr`, resolving its operator position
/// against `env` per §4.C's five rules.
pub fn parse(sexp: &Sexp, env: &Rc<Environment>) -> Result<Expr, ParseError> {
    match sexp {
        Sexp::Int(n) => Ok(Expr::Integer(*n)),
        Sexp::Str(s) => Ok(Expr::Str(s.clone())),
        Sexp::Bool(true) => Ok(Expr::True),
        Sexp::Bool(false) => Ok(Expr::False),
        Sexp::Sym(name) => Ok(Expr::Var(name.clone())),
        Sexp::List(items) if items.is_empty() => Ok(Expr::Quote(Value::Null)),
        Sexp::List(items) => parse_list(items, env),
    }
}

fn parse_list(items: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    let head = &items[0];
    let rands = &items[1..];

    // Rule 1: a non-identifier head is applied after being parsed itself.
    let Sexp::Sym(op) = head else {
        let rator = parse(head, env)?;
        let args = parse_args(rands, env)?;
        return Ok(Expr::Apply(Box::new(rator), args));
    };

    // Rule 2: a name bound in the current lexical chain — even to a
    // placeholder — shadows both primitives and reserved words.
    if env.is_bound(op) {
        let args = parse_args(rands, env)?;
        return Ok(Expr::Apply(Box::new(Expr::Var(op.clone())), args));
    }

    // Rule 3: an unshadowed primitive name dispatches directly, with its
    // arity checked at parse time.
    if let Some((primop, arity)) = primitives::lookup(op) {
        if !arity.accepts(rands.len()) {
            return Err(ParseError::Arity {
                form: op.clone(),
                expected: arity.describe(),
                actual: rands.len(),
            });
        }
        let args = parse_args(rands, env)?;
        return Ok(Expr::PrimApp(primop, args));
    }

    // Rule 4: an unshadowed reserved word is a special form.
    if is_reserved(op) {
        return parse_special_form(op, rands, env);
    }

    // Rule 5: anything else is an ordinary (possibly still-unbound) variable
    // reference, resolved at eval time.
    let args = parse_args(rands, env)?;
    Ok(Expr::Apply(Box::new(Expr::Var(op.clone())), args))
}

fn parse_special_form(op: &str, rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    match op {
        "let" => parse_let(rands, env),
        "letrec" => parse_letrec(rands, env),
        "lambda" => parse_lambda(rands, env),
        "if" => parse_if(rands, env),
        "begin" => Ok(Expr::Begin(parse_args(rands, env)?)),
        "and" => Ok(Expr::And(parse_args(rands, env)?)),
        "or" => Ok(Expr::Or(parse_args(rands, env)?)),
        "cond" => parse_cond(rands, env),
        "quote" => parse_quote(rands),
        "define" => parse_define(rands, env),
        "set!" => parse_set(rands, env),
        _ => unreachable!("is_reserved guards this dispatch"),
    }
}

fn binding_list(sexp: &Sexp, form: &str) -> Result<Vec<(String, Sexp)>, ParseError> {
    let Sexp::List(bindings) = sexp else {
        return Err(ParseError::MalformedBinding {
            form: form.to_string(),
        });
    };
    bindings
        .iter()
        .map(|b| match b {
            Sexp::List(pair) if pair.len() == 2 => Ok((ident(&pair[0], form)?, pair[1].clone())),
            _ => Err(ParseError::MalformedBinding {
                form: form.to_string(),
            }),
        })
        .collect()
}

fn parse_let(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() < 2 {
        return Err(ParseError::Arity {
            form: "let".to_string(),
            expected: "at least 2".to_string(),
            actual: rands.len(),
        });
    }
    let raw = binding_list(&rands[0], "let")?;
    let names: Vec<String> = raw.iter().map(|(n, _)| n.clone()).collect();
    check_distinct(&names)?;

    // Binding expressions are parsed under the outer scope: `let` is not
    // recursive.
    let bindings = raw
        .into_iter()
        .map(|(name, e)| Ok((name, parse(&e, env)?)))
        .collect::<Result<Vec<_>, ParseError>>()?;

    let body_env = Environment::child(env.clone());
    for name in &names {
        body_env.define_placeholder(name);
    }
    let body = parse_args(&rands[1..], &body_env)?;
    Ok(Expr::Let(bindings, Box::new(body_expr(body))))
}

fn parse_letrec(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() < 2 {
        return Err(ParseError::Arity {
            form: "letrec".to_string(),
            expected: "at least 2".to_string(),
            actual: rands.len(),
        });
    }
    let raw = binding_list(&rands[0], "letrec")?;
    let names: Vec<String> = raw.iter().map(|(n, _)| n.clone()).collect();
    check_distinct(&names)?;

    let new_env = Environment::child(env.clone());
    for name in &names {
        new_env.define_placeholder(name);
    }
    // Binding expressions are parsed under the extended scope, so mutually
    // recursive references between bindings resolve to `Var`.
    let bindings = raw
        .into_iter()
        .map(|(name, e)| Ok((name, parse(&e, &new_env)?)))
        .collect::<Result<Vec<_>, ParseError>>()?;
    let body = parse_args(&rands[1..], &new_env)?;
    Ok(Expr::Letrec(bindings, Box::new(body_expr(body))))
}

fn parse_lambda(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() < 2 {
        return Err(ParseError::Arity {
            form: "lambda".to_string(),
            expected: "at least 2".to_string(),
            actual: rands.len(),
        });
    }
    let Sexp::List(formal_sexps) = &rands[0] else {
        return Err(ParseError::BadBinder {
            form: "lambda".to_string(),
        });
    };
    let formals = formal_sexps
        .iter()
        .map(|f| ident(f, "lambda"))
        .collect::<Result<Vec<_>, ParseError>>()?;
    check_distinct(&formals)?;

    let body_env = Environment::child(env.clone());
    for f in &formals {
        body_env.define_placeholder(f);
    }
    let body = parse_args(&rands[1..], &body_env)?;
    Ok(Expr::Lambda(formals.into(), Rc::new(body_expr(body))))
}

fn parse_if(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() != 3 {
        return Err(ParseError::Arity {
            form: "if".to_string(),
            expected: "3".to_string(),
            actual: rands.len(),
        });
    }
    let test = parse(&rands[0], env)?;
    let conseq = parse(&rands[1], env)?;
    let alt = parse(&rands[2], env)?;
    Ok(Expr::If(Box::new(test), Box::new(conseq), Box::new(alt)))
}

fn parse_cond(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    let n = rands.len();
    let mut clauses = Vec::with_capacity(n);
    for (i, clause_sexp) in rands.iter().enumerate() {
        let Sexp::List(items) = clause_sexp else {
            return Err(ParseError::MalformedBinding {
                form: "cond".to_string(),
            });
        };
        if items.is_empty() {
            return Err(ParseError::MalformedBinding {
                form: "cond".to_string(),
            });
        }
        let is_else = matches!(&items[0], Sexp::Sym(s) if s == "else");
        if is_else && i != n - 1 {
            return Err(ParseError::MisplacedElse);
        }
        let test = if is_else {
            None
        } else {
            Some(parse(&items[0], env)?)
        };
        let body = parse_args(&items[1..], env)?;
        clauses.push(CondClause { test, body });
    }
    Ok(Expr::Cond(clauses))
}

fn parse_quote(rands: &[Sexp]) -> Result<Expr, ParseError> {
    if rands.len() != 1 {
        return Err(ParseError::Arity {
            form: "quote".to_string(),
            expected: "1".to_string(),
            actual: rands.len(),
        });
    }
    Ok(Expr::Quote(quote_value(&rands[0])?))
}

fn parse_define(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() < 2 {
        return Err(ParseError::Arity {
            form: "define".to_string(),
            expected: "at least 2".to_string(),
            actual: rands.len(),
        });
    }
    match &rands[0] {
        Sexp::Sym(name) => {
            check_definable(name)?;
            if rands.len() != 2 {
                return Err(ParseError::Arity {
                    form: "define".to_string(),
                    expected: "2".to_string(),
                    actual: rands.len(),
                });
            }
            let value = parse(&rands[1], env)?;
            Ok(Expr::Define(name.clone(), Box::new(value)))
        }
        Sexp::List(header) if !header.is_empty() => {
            // (define (f x ...) body ...) desugars to (define f (lambda (x ...) body ...))
            let name = ident(&header[0], "define")?;
            check_definable(&name)?;
            let mut lambda_form = vec![Sexp::Sym("lambda".to_string()), Sexp::List(header[1..].to_vec())];
            lambda_form.extend(rands[1..].iter().cloned());
            let lambda_expr = parse(&Sexp::List(lambda_form), env)?;
            Ok(Expr::Define(name, Box::new(lambda_expr)))
        }
        _ => Err(ParseError::BadBinder {
            form: "define".to_string(),
        }),
    }
}

fn parse_set(rands: &[Sexp], env: &Rc<Environment>) -> Result<Expr, ParseError> {
    if rands.len() != 2 {
        return Err(ParseError::Arity {
            form: "set!".to_string(),
            expected: "2".to_string(),
            actual: rands.len(),
        });
    }
    let name = ident(&rands[0], "set!")?;
    if is_reserved(&name) || primitives::lookup(&name).is_some() {
        return Err(ParseError::ReservedName(name));
    }
    let value = parse(&rands[1], env)?;
    Ok(Expr::Set(name, Box::new(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_all;

    fn parse_str(src: &str) -> Expr {
        let env = Environment::root();
        let forms = read_all(src).unwrap();
        assert_eq!(forms.len(), 1, "expected exactly one top-level form");
        parse(&forms[0], &env).unwrap()
    }

    #[test]
    fn primitive_call_becomes_primapp() {
        match parse_str("(+ 1 2 3)") {
            Expr::PrimApp(crate::primitives::PrimOp::Add, args) => assert_eq!(args.len(), 3),
            other => panic!("expected PrimApp(Add, _), got {other:?}"),
        }
    }

    #[test]
    fn wrong_primitive_arity_is_rejected() {
        let env = Environment::root();
        let forms = read_all("(car)").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::Arity { .. })
        ));
    }

    #[test]
    fn user_binding_shadows_primitive_name() {
        let env = Environment::root();
        env.define_placeholder("+");
        let forms = read_all("(+ 1 2)").unwrap();
        match parse(&forms[0], &env).unwrap() {
            Expr::Apply(rator, args) => {
                assert!(matches!(*rator, Expr::Var(ref n) if n == "+"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected Apply(Var(\"+\"), _), got {other:?}"),
        }
    }

    #[test]
    fn quote_desugars_dotted_pair() {
        match parse_str("'(1 2 . 3)") {
            Expr::Quote(v) => assert_eq!(v.to_string(), "(1 2 . 3)"),
            other => panic!("expected Quote, got {other:?}"),
        }
    }

    #[test]
    fn quote_of_empty_list_is_null() {
        match parse_str("'()") {
            Expr::Quote(Value::Null) => {}
            other => panic!("expected Quote(Null), got {other:?}"),
        }
    }

    #[test]
    fn malformed_dot_position_is_rejected() {
        let env = Environment::root();
        let forms = read_all("'(1 . 2 3)").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::DottedPairMalformed)
        ));
    }

    #[test]
    fn define_function_shorthand_desugars_to_lambda() {
        match parse_str("(define (square x) (* x x))") {
            Expr::Define(name, body) => {
                assert_eq!(name, "square");
                assert!(matches!(*body, Expr::Lambda(_, _)));
            }
            other => panic!("expected Define, got {other:?}"),
        }
    }

    #[test]
    fn defining_a_primitive_name_is_rejected() {
        let env = Environment::root();
        let forms = read_all("(define + 5)").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::ReservedName(_))
        ));
    }

    #[test]
    fn defining_a_reserved_word_is_rejected() {
        let env = Environment::root();
        let forms = read_all("(define if 5)").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::ReservedName(_))
        ));
    }

    #[test]
    fn duplicate_lambda_parameter_is_rejected() {
        let env = Environment::root();
        let forms = read_all("(lambda (x x) x)").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::DuplicateParam(_))
        ));
    }

    #[test]
    fn cond_else_must_be_last() {
        let env = Environment::root();
        let forms = read_all("(cond (else 1) (#t 2))").unwrap();
        assert!(matches!(
            parse(&forms[0], &env),
            Err(ParseError::MisplacedElse)
        ));
    }

    #[test]
    fn multi_expression_lambda_body_wraps_in_begin() {
        match parse_str("(lambda (x) x x)") {
            Expr::Lambda(_, body) => assert!(matches!(*body, Expr::Begin(_))),
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn unbound_identifier_still_parses_as_a_variable_application() {
        match parse_str("(mystery 1 2)") {
            Expr::Apply(rator, args) => {
                assert!(matches!(*rator, Expr::Var(ref n) if n == "mystery"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected Apply(Var(\"mystery\"), _), got {other:?}"),
        }
    }
}
