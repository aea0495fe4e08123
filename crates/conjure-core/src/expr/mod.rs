//! The expression language that generated implementations are written in
//!
//! Admitting arbitrary native code at runtime has no safe analog, so
//! generated implementations are restricted to this small expression
//! DSL: `fn` definitions over arithmetic, comparisons, `let` bindings,
//! `if`/`else`, lists, record literals and calls, executed by an
//! in-process tree-walking evaluator.

pub mod ast;
pub mod eval;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::Program;
pub use eval::{Evaluator, CALL_DEPTH_LIMIT};
pub use parser::parse_program;
pub use value::Value;
