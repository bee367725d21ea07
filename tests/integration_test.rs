// ABOUTME: Whole-program scenarios driven through the reader, parser, and evaluator together

use scm_interpreter::env::Environment;
use scm_interpreter::eval;
use scm_interpreter::parser;
use scm_interpreter::reader;
use scm_interpreter::value::Value;
use std::rc::Rc;

/// Feeds every top-level form in `src` through the reader, parser, and
/// evaluator in turn, against one shared global environment, and returns
/// the final form's result. Mirrors how a REPL session with no printing
/// accumulates top-level `define`s into the same environment.
fn run_all(src: &str) -> Result<Value, String> {
    let env = Environment::root();
    let forms = reader::read_all(src).map_err(|e| e.to_string())?;
    let mut result = Value::Void;
    for form in &forms {
        let expr = parser::parse(form, &env).map_err(|e| e.to_string())?;
        result = eval::eval(&expr, &env).map_err(|e| e.to_string())?;
    }
    Ok(result)
}

fn run_all_env(src: &str) -> Result<(Value, Rc<Environment>), String> {
    let env = Environment::root();
    let forms = reader::read_all(src).map_err(|e| e.to_string())?;
    let mut result = Value::Void;
    for form in &forms {
        let expr = parser::parse(form, &env).map_err(|e| e.to_string())?;
        result = eval::eval(&expr, &env).map_err(|e| e.to_string())?;
    }
    Ok((result, env))
}

#[test]
fn scenario_1_arithmetic_basics() {
    assert_eq!(run_all("(+ 1 2 3)").unwrap().to_string(), "6");
    assert_eq!(run_all("(*)").unwrap().to_string(), "1");
    assert_eq!(run_all("(- 5)").unwrap().to_string(), "-5");
    assert_eq!(run_all("(/ 6 4)").unwrap().to_string(), "3/2");
}

#[test]
fn scenario_2_self_recursive_factorial() {
    let src = "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 6)";
    assert_eq!(run_all(src).unwrap().to_string(), "720");
}

#[test]
fn scenario_3_mutual_recursion_via_letrec() {
    let src = "(letrec ((even? (lambda (n) (if (= n 0) #t (odd? (- n 1)))))
                        (odd? (lambda (n) (if (= n 0) #f (even? (- n 1))))))
                 (even? 10))";
    assert_eq!(run_all(src).unwrap().to_string(), "#t");
}

#[test]
fn scenario_4_set_car_mutates_a_shared_pair() {
    let src = "(define p (cons 1 2)) (set-car! p 9) p";
    assert_eq!(run_all(src).unwrap().to_string(), "(9 . 2)");
}

#[test]
fn scenario_5_cyclic_set_cdr_is_not_a_proper_list() {
    let src = "(define c (cons 1 '())) (set-cdr! c c) (list? c)";
    assert_eq!(run_all(src).unwrap().to_string(), "#f");
}

#[test]
fn scenario_6_cond_else_and_dotted_quote() {
    assert_eq!(
        run_all("(cond ((= 1 2) 'a) ((= 2 2) 'b) (else 'c))").unwrap().to_string(),
        "b"
    );
    assert_eq!(run_all("'(1 2 . 3)").unwrap().to_string(), "(1 2 . 3)");
}

#[test]
fn scenario_7_closures_capture_the_cell_not_the_value() {
    let src = "(define x 1) (define f (lambda () x)) (set! x 42) (f)";
    assert_eq!(run_all(src).unwrap().to_string(), "42");
}

#[test]
fn scenario_8_quotient_and_modulo_sign_rules() {
    assert_eq!(run_all("(quotient -7 2)").unwrap().to_string(), "-3");
    assert_eq!(run_all("(modulo -7 2)").unwrap().to_string(), "1");
    assert_eq!(run_all("(modulo 7 -2)").unwrap().to_string(), "-1");
}

#[test]
fn addition_is_commutative_and_associative_over_integers() {
    assert_eq!(run_all("(= (+ 2 3) (+ 3 2))").unwrap().to_string(), "#t");
    assert_eq!(
        run_all("(= (+ (+ 1 2) 3) (+ 1 (+ 2 3)))").unwrap().to_string(),
        "#t"
    );
    assert_eq!(
        run_all("(= (* (* 2 3) 4) (* 2 (* 3 4)))").unwrap().to_string(),
        "#t"
    );
}

#[test]
fn every_integer_equals_and_eqs_itself() {
    assert_eq!(run_all("(= 7 7)").unwrap().to_string(), "#t");
    assert_eq!(run_all("(eq? 7 7)").unwrap().to_string(), "#t");
}

#[test]
fn quoting_and_reading_back_a_literal_round_trips() {
    let (value, _) = run_all_env("'(1 2 (3 . 4) #t \"s\")").unwrap();
    let printed = value.to_string();
    let reread = run_all(&format!("'{printed}")).unwrap();
    assert_eq!(reread.to_string(), printed);
}

#[test]
fn eval_does_not_mutate_the_environment_without_an_explicit_binding_form() {
    let src = "(define x 1) (+ x x)";
    let (_, env) = run_all_env(src).unwrap();
    // A subsequent non-binding expression must not have disturbed x.
    match env.get("x") {
        scm_interpreter::env::Lookup::Found(Value::Integer(n)) => assert_eq!(n, 1),
        _ => panic!("expected x to remain bound to 1"),
    }
}

#[test]
fn parsing_is_deterministic_for_equal_input() {
    let env_a = Environment::root();
    let env_b = Environment::root();
    let src = "(let ((x 1) (y 2)) (+ x y))";
    let form_a = reader::read_all(src).unwrap();
    let form_b = reader::read_all(src).unwrap();
    let a = parser::parse(&form_a[0], &env_a).unwrap();
    let b = parser::parse(&form_b[0], &env_b).unwrap();
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
}

#[test]
fn if_if_cond_and_begin_tails_all_see_only_false_as_falsy() {
    assert_eq!(run_all("(if 0 'truthy 'falsy)").unwrap().to_string(), "truthy");
    assert_eq!(run_all("(if '() 'truthy 'falsy)").unwrap().to_string(), "truthy");
    assert_eq!(run_all("(if #f 'truthy 'falsy)").unwrap().to_string(), "falsy");
}

#[test]
fn defining_a_primitive_name_is_rejected_end_to_end() {
    assert!(run_all("(define + 1)").is_err());
}

#[test]
fn applying_a_non_procedure_is_a_runtime_error() {
    assert!(run_all("(5 6)").is_err());
}
