// ABOUTME: Version and welcome-banner constants for the CLI

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "scm — an interactive Scheme-family Lisp interpreter";
pub const WELCOME_SUBTITLE: &str = "Type an expression to evaluate it. (exit) or Ctrl-D to quit.";
