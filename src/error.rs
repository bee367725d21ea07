// ABOUTME: Error types for parsing and evaluation failures

use thiserror::Error;

/// Raised by the reader and parser (§7 Parse errors): bad special-form
/// arity, malformed binder, non-identifier in a binder position, unclosed
/// or empty-operator syntax, dotted-pair malformation inside `quote`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{form}: expected {expected} operand{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        form: String,
        expected: String,
        actual: usize,
    },

    #[error("{form}: binder must be an identifier")]
    BadBinder { form: String },

    #[error("{form}: binding must be (name expr)")]
    MalformedBinding { form: String },

    #[error("duplicate parameter name: {0}")]
    DuplicateParam(String),

    #[error("{0}: cannot define or set! this name")]
    ReservedName(String),

    #[error("malformed dotted pair in quoted form")]
    DottedPairMalformed,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("else clause must be last in cond")]
    MisplacedElse,
}

/// Raised by the evaluator and primitive dispatch (§7 Type/Arity/Name/
/// Arithmetic errors, apply-of-non-procedure).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("undefined variable: {0}")]
    UsedBeforeDefined(String),

    #[error("{form}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        form: String,
        expected: String,
        actual: usize,
    },

    #[error("{form}: expected {expected}, got {actual}")]
    TypeError {
        form: String,
        expected: String,
        actual: String,
    },

    #[error("attempt to apply a non-procedure")]
    NotCallable,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expt: negative exponent")]
    NegativeExponent,

    #[error("expt: 0^0 is undefined")]
    ZeroToTheZero,

    #[error("expt: overflow")]
    Overflow,
}

impl EvalError {
    pub fn type_error(form: &str, expected: &str, actual: &str) -> Self {
        EvalError::TypeError {
            form: form.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn arity(form: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            form: form.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}
