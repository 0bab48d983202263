//! ICU-lite template parser.
//!
//! Turns a raw catalog string into a [`Message`] AST that the renderer
//! evaluates. Parsing is pure and deterministic, so results can be memoized.

pub mod ast;
pub mod error;
mod template;

pub use ast::*;
pub use error::{ParseError, SyntaxErrorKind};
pub use template::parse_template;
