//! Miette diagnostics for template syntax errors and malformed catalog JSON.
//!
//! The miette derive reads struct fields in generated code that rustc cannot
//! see, hence the `unused_assignments` allowance.
#![allow(unused_assignments)]

use std::path::Path;

use lexicon::{ParseError, SyntaxErrorKind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into a template or catalog file.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(lexicon::syntax))]
pub struct LexiconDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl LexiconDiagnostic {
    /// Diagnostic for a template that failed to parse. `name` identifies the
    /// template, e.g. `locales/ro.json:settings.title`.
    pub fn from_parse_error(name: &str, template: &str, err: &ParseError) -> Self {
        LexiconDiagnostic {
            src: NamedSource::new(name, template.to_string()),
            span: span_at(template, err.offset),
            message: format!("syntax error: {}", err.kind),
            help: help_for(&err.kind),
        }
    }

    /// Diagnostic for a catalog file that is not valid JSON.
    pub fn from_json_error(path: &Path, content: &str, err: &serde_json::Error) -> Self {
        // serde_json reports 1-based lines and columns.
        let offset = content
            .lines()
            .take(err.line().saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>()
            + err.column().saturating_sub(1);

        LexiconDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: span_at(content, offset),
            message: format!("invalid catalog: {err}"),
            help: None,
        }
    }
}

/// One-character span at `offset`, clamped so miette never slices out of bounds.
fn span_at(content: &str, offset: usize) -> SourceSpan {
    let offset = offset.min(content.len());
    let len = content[offset..].chars().next().map_or(0, char::len_utf8);
    (offset, len).into()
}

fn help_for(kind: &SyntaxErrorKind) -> Option<String> {
    let help = match kind {
        SyntaxErrorKind::UnbalancedBrace => "close the placeholder with '}'",
        SyntaxErrorKind::UnexpectedClosingBrace => "write '}}' for a literal '}'",
        SyntaxErrorKind::MissingOtherClause => "plural and select need an 'other{...}' clause",
        SyntaxErrorKind::UnknownArgumentType(_) => "supported types are 'plural' and 'select'",
        SyntaxErrorKind::UnknownClauseKeyword(_) => {
            "plural clauses are '=N' or one of zero, one, two, few, many, other"
        }
        _ => return None,
    };
    Some(help.to_string())
}
