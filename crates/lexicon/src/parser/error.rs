//! Parse error types for ICU-lite templates.

use thiserror::Error;

/// What went wrong while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// A `{` was never closed.
    #[error("unclosed '{{'")]
    UnbalancedBrace,

    /// A `}` appeared outside any placeholder and was not escaped as `}}`.
    #[error("unexpected '}}'")]
    UnexpectedClosingBrace,

    /// A placeholder did not start with a valid argument name.
    #[error("expected an argument name")]
    InvalidArgumentName,

    /// A placeholder was not followed by `}` or `,`.
    #[error("expected '}}' or ','")]
    ExpectedPlaceholderEnd,

    /// The argument type is neither `plural` nor `select`.
    #[error("unknown argument type '{0}'")]
    UnknownArgumentType(String),

    /// The argument type was not followed by `,`.
    #[error("expected ',' after argument type")]
    ExpectedComma,

    /// A plural clause key that is not `=N` or a CLDR category.
    #[error("unknown clause keyword '{0}'")]
    UnknownClauseKeyword(String),

    /// The same clause key appears twice.
    #[error("duplicate clause '{0}'")]
    DuplicateClause(String),

    /// A plural or select placeholder without the mandatory `other` clause.
    #[error("missing 'other' clause")]
    MissingOtherClause,

    /// An `=N` or `offset:N` value that is not a number.
    #[error("invalid number")]
    InvalidNumber,

    /// A clause key that is not followed by `{`.
    #[error("expected '{{' to open the clause body")]
    ExpectedClauseBody,
}

/// A template syntax error with its location.
///
/// `line` and `column` are 1-based; `offset` is the byte offset into the
/// template, suitable for building source spans.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {line}:{column}: {kind}")]
pub struct ParseError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}
