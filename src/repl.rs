// ABOUTME: REPL driver — buffers top-level defines, flushes, evaluates, prints (§4.F)

use crate::ast::Expr;
use crate::env::Environment;
use crate::eval;
use crate::parser;
use crate::reader::{self, Sexp};
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

/// Scans `text` for the end of the next complete top-level form, honoring
/// string literals and `;` comments so an unclosed paren or open string
/// inside a multi-line `define` doesn't get mistaken for a syntax error.
/// Returns `None` when no complete form is available yet and more input
/// should be read before parsing is attempted.
fn complete_prefix_len(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut started = false;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            ';' => {
                while let Some(&(_, nc)) = chars.peek() {
                    if nc == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' => {
                in_string = true;
                started = true;
            }
            '(' => {
                depth += 1;
                started = true;
            }
            ')' => {
                started = true;
                depth -= 1;
                if depth <= 0 {
                    return Some(i + 1);
                }
            }
            c if c.is_whitespace() => {
                if started && depth == 0 {
                    return Some(i);
                }
            }
            _ => started = true,
        }
    }
    if started && depth <= 0 {
        Some(text.len())
    } else {
        None
    }
}

/// Suppresses a `Void` result unless the source form's outermost operator
/// is `void` itself — the "simplest defensible rule" (§4.F).
fn should_print(form: &Sexp, value: &Value) -> bool {
    if !matches!(value, Value::Void) {
        return true;
    }
    matches!(
        form,
        Sexp::List(items) if matches!(items.first(), Some(Sexp::Sym(s)) if s == "void")
    )
}

/// Drives one interpreter session: a persistent global environment plus the
/// reading/buffering/flushing/evaluating/printing state machine of §4.F.
/// Both the interactive and batch CLI modes (§4.H) feed text through the
/// same `feed`/`finish` pair so their REPL semantics never diverge.
pub struct Repl {
    env: Rc<Environment>,
    pending: String,
    define_buffer: Vec<(String, Expr)>,
}

impl Repl {
    pub fn new() -> Self {
        Repl {
            env: Environment::root(),
            pending: String::new(),
            define_buffer: Vec::new(),
        }
    }

    /// Feeds one chunk of source text (a single line in interactive mode,
    /// or an entire file/stream in batch mode). Every complete top-level
    /// form found is processed immediately; a trailing unclosed form is
    /// kept pending for the next call. Returns `true` once `(exit)` has
    /// been evaluated, signaling the caller to stop reading.
    pub fn feed(&mut self, chunk: &str, out: &mut impl Write) -> bool {
        self.pending.push_str(chunk);
        self.pending.push('\n');
        loop {
            let Some(len) = complete_prefix_len(&self.pending) else {
                return false;
            };
            let form_text = self.pending[..len].to_string();
            self.pending = self.pending[len..].to_string();
            if form_text.trim().is_empty() {
                if self.pending.trim().is_empty() {
                    return false;
                }
                continue;
            }
            match reader::read_one(&form_text) {
                Ok(Some((sexp, rest))) => {
                    if !rest.trim().is_empty() {
                        // complete_prefix_len only ever returns a boundary that
                        // read_one consumes in full; a non-empty remainder would
                        // mean our scanner and the reader disagree.
                        self.define_buffer.clear();
                        writeln!(out, "RuntimeError").ok();
                        return false;
                    }
                    if self.process_form(&sexp, out) {
                        self.pending.clear();
                        return true;
                    }
                }
                Ok(None) => {}
                Err(_) => {
                    self.define_buffer.clear();
                    writeln!(out, "RuntimeError").ok();
                }
            }
            if self.pending.trim().is_empty() {
                return false;
            }
        }
    }

    /// Flushes any buffered `define`s at true end-of-input (EOF/Ctrl-D),
    /// since a trailing buffered group would otherwise never be evaluated.
    /// A non-empty `pending` at this point is a form EOF arrived in the
    /// middle of — it can never complete, so it's reported the same way
    /// any other parse error is (§7 unclosed s-expression).
    pub fn finish(&mut self, out: &mut impl Write) {
        if !self.pending.trim().is_empty() {
            self.pending.clear();
            self.define_buffer.clear();
            writeln!(out, "RuntimeError").ok();
            return;
        }
        self.flush_defines(out);
    }

    fn process_form(&mut self, form: &Sexp, out: &mut impl Write) -> bool {
        let expr = match parser::parse(form, &self.env) {
            Ok(expr) => expr,
            Err(_) => {
                self.define_buffer.clear();
                writeln!(out, "RuntimeError").ok();
                return false;
            }
        };

        if let Expr::Define(name, rhs) = &expr {
            self.env.define_placeholder(name);
            self.define_buffer.push((name.clone(), (**rhs).clone()));
            return false;
        }

        if !self.flush_defines(out) {
            return false;
        }

        match eval::eval(&expr, &self.env) {
            Ok(Value::Terminate) => true,
            Ok(value) => {
                if should_print(form, &value) {
                    writeln!(out, "{value}").ok();
                }
                false
            }
            Err(_) => {
                writeln!(out, "RuntimeError").ok();
                false
            }
        }
    }

    /// Evaluates every buffered `define`'s right-hand side in source order,
    /// mutating the placeholders already installed by `process_form` — the
    /// shared "introduce all names, then evaluate RHSs" helper from §9.
    fn flush_defines(&mut self, out: &mut impl Write) -> bool {
        if self.define_buffer.is_empty() {
            return true;
        }
        let group = std::mem::take(&mut self.define_buffer);
        match eval::bind_group(&group, &self.env) {
            Ok(()) => true,
            Err(_) => {
                writeln!(out, "RuntimeError").ok();
                false
            }
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
