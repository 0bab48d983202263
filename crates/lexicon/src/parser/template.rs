//! Template string parser using winnow.
//!
//! Parses ICU-lite template strings into a [`Message`]. Handles:
//! - Literal text, with `{{` and `}}` escapes at the top level
//! - Interpolations: `{name}`
//! - Plural placeholders with `=N`, category and `offset:N` clauses
//! - Select placeholders
//! - `#` inside plural sub-messages
//!
//! Clause bodies are parsed recursively. Inside a body every `{` opens a
//! nested placeholder and `}` closes the body, so escapes only apply to
//! top-level text.

use std::str::FromStr;

use winnow::combinator::{alt, cut_err, fail, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use super::ast::*;
use super::error::{ParseError, SyntaxErrorKind};
use crate::types::PluralCategory;

type PResult<T> = ModalResult<T, ContextError<SyntaxErrorKind>>;

/// Parse a template string into a message AST.
///
/// ```
/// use lexicon::parser::{Segment, parse_template};
///
/// let message = parse_template("Resend in {seconds} seconds").unwrap();
/// assert_eq!(message.segments.len(), 3);
/// assert_eq!(
///     message.segments[1],
///     Segment::Interpolation { name: "seconds".into() }
/// );
/// ```
pub fn parse_template(input: &str) -> Result<Message, ParseError> {
    let mut remaining = input;
    match top_level(&mut remaining) {
        Ok(message) if remaining.is_empty() => Ok(message),
        // Top-level repetition only stops early on a lone '}'.
        Ok(_) => Err(error_at(
            input,
            remaining,
            SyntaxErrorKind::UnexpectedClosingBrace,
        )),
        Err(ErrMode::Backtrack(e) | ErrMode::Cut(e)) => {
            let kind = e
                .context()
                .next()
                .cloned()
                .unwrap_or(SyntaxErrorKind::UnbalancedBrace);
            Err(error_at(input, remaining, kind))
        }
        Err(ErrMode::Incomplete(_)) => {
            Err(error_at(input, remaining, SyntaxErrorKind::UnbalancedBrace))
        }
    }
}

/// Build a located error from the original input and the unconsumed rest.
fn error_at(original: &str, remaining: &str, kind: SyntaxErrorKind) -> ParseError {
    let offset = original.len() - remaining.len();
    let consumed = &original[..offset];
    let line = consumed.chars().filter(|&c| c == '\n').count() + 1;
    let line_start = consumed.rfind('\n').map_or(0, |pos| pos + 1);
    let column = consumed[line_start..].chars().count() + 1;
    ParseError {
        kind,
        line,
        column,
        offset,
    }
}

/// Fail with a non-recoverable error of the given kind.
fn cut_fail<T>(input: &mut &str, kind: SyntaxErrorKind) -> PResult<T> {
    cut_err(fail::<_, T, _>).context(kind).parse_next(input)
}

fn top_level(input: &mut &str) -> PResult<Message> {
    let segments: Vec<Segment> = repeat(0.., top_segment).parse_next(input)?;
    Ok(Message {
        segments: merge_literals(segments),
    })
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if let Some(Segment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Literal(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

fn top_segment(input: &mut &str) -> PResult<Segment> {
    alt((
        escape_sequence,
        |input: &mut &str| placeholder(input, false),
        top_literal,
    ))
    .parse_next(input)
}

/// Parse escape sequences: {{ -> {, }} -> }
fn escape_sequence(input: &mut &str) -> PResult<Segment> {
    alt((
        "{{".value(Segment::Literal("{".to_string())),
        "}}".value(Segment::Literal("}".to_string())),
    ))
    .parse_next(input)
}

fn top_literal(input: &mut &str) -> PResult<Segment> {
    take_till(1.., ['{', '}'])
        .map(|text: &str| Segment::Literal(text.to_string()))
        .parse_next(input)
}

/// Literal text inside a clause body. `#` is reserved inside plural bodies.
fn clause_literal(input: &mut &str, in_plural: bool) -> PResult<Segment> {
    let text: &str = if in_plural {
        take_till(1.., ['{', '}', '#']).parse_next(input)?
    } else {
        take_till(1.., ['{', '}']).parse_next(input)?
    };
    Ok(Segment::Literal(text.to_string()))
}

fn clause_segment(input: &mut &str, in_plural: bool) -> PResult<Segment> {
    if in_plural && opt('#').parse_next(input)?.is_some() {
        return Ok(Segment::PluralValue);
    }
    alt((
        |input: &mut &str| placeholder(input, in_plural),
        |input: &mut &str| clause_literal(input, in_plural),
    ))
    .parse_next(input)
}

/// Parse a placeholder: `{name}`, `{name, plural, ...}` or `{name, select, ...}`.
fn placeholder(input: &mut &str, in_plural: bool) -> PResult<Segment> {
    '{'.parse_next(input)?;
    ws(input)?;
    let name = cut_err(identifier)
        .context(SyntaxErrorKind::InvalidArgumentName)
        .parse_next(input)?
        .to_string();
    ws(input)?;

    if opt('}').parse_next(input)?.is_some() {
        return Ok(Segment::Interpolation { name });
    }
    if opt(',').parse_next(input)?.is_none() {
        let kind = if input.is_empty() {
            SyntaxErrorKind::UnbalancedBrace
        } else {
            SyntaxErrorKind::ExpectedPlaceholderEnd
        };
        return cut_fail(input, kind);
    }

    ws(input)?;
    let keyword = opt(identifier).parse_next(input)?.unwrap_or_default();
    match keyword {
        "plural" => {
            argument_separator(input)?;
            plural_clauses(input, name)
        }
        "select" => {
            argument_separator(input)?;
            select_clauses(input, name, in_plural)
        }
        other => cut_fail(
            input,
            SyntaxErrorKind::UnknownArgumentType(other.to_string()),
        ),
    }
}

/// The `,` between the argument type and its clauses.
fn argument_separator(input: &mut &str) -> PResult<()> {
    ws(input)?;
    cut_err(',')
        .context(SyntaxErrorKind::ExpectedComma)
        .void()
        .parse_next(input)
}

/// Parse `offset:N` and the clause list of a plural placeholder, including
/// the closing brace.
fn plural_clauses(input: &mut &str, name: String) -> PResult<Segment> {
    ws(input)?;
    let offset = opt(preceded(
        ("offset", ws, ':', ws),
        cut_err(number).context(SyntaxErrorKind::InvalidNumber),
    ))
    .parse_next(input)?
    .unwrap_or(0.0);

    let mut exact: Vec<ExactClause> = Vec::new();
    let mut categories: Vec<CategoryClause> = Vec::new();
    loop {
        ws(input)?;
        if input.is_empty() {
            return cut_fail(input, SyntaxErrorKind::UnbalancedBrace);
        }
        if input.starts_with('}') {
            break;
        }
        if opt('=').parse_next(input)?.is_some() {
            let value = cut_err(number)
                .context(SyntaxErrorKind::InvalidNumber)
                .parse_next(input)?;
            if exact.iter().any(|clause| clause.value == value) {
                return cut_fail(input, SyntaxErrorKind::DuplicateClause(format!("={value}")));
            }
            let message = clause_body(input, true)?;
            exact.push(ExactClause { value, message });
        } else {
            let keyword = opt(clause_key).parse_next(input)?.unwrap_or_default();
            let Ok(category) = PluralCategory::from_str(keyword) else {
                return cut_fail(
                    input,
                    SyntaxErrorKind::UnknownClauseKeyword(keyword.to_string()),
                );
            };
            if categories.iter().any(|clause| clause.category == category) {
                return cut_fail(
                    input,
                    SyntaxErrorKind::DuplicateClause(category.to_string()),
                );
            }
            let message = clause_body(input, true)?;
            categories.push(CategoryClause { category, message });
        }
    }

    if !categories
        .iter()
        .any(|clause| clause.category == PluralCategory::Other)
    {
        return cut_fail(input, SyntaxErrorKind::MissingOtherClause);
    }
    '}'.parse_next(input)?;

    Ok(Segment::Plural {
        name,
        offset,
        exact,
        categories,
    })
}

/// Parse the clause list of a select placeholder, including the closing brace.
fn select_clauses(input: &mut &str, name: String, in_plural: bool) -> PResult<Segment> {
    let mut clauses: Vec<SelectClause> = Vec::new();
    loop {
        ws(input)?;
        if input.is_empty() {
            return cut_fail(input, SyntaxErrorKind::UnbalancedBrace);
        }
        if input.starts_with('}') {
            break;
        }
        let key = opt(clause_key).parse_next(input)?.unwrap_or_default();
        if key.is_empty() {
            return cut_fail(input, SyntaxErrorKind::UnknownClauseKeyword(String::new()));
        }
        if clauses.iter().any(|clause| clause.key == key) {
            return cut_fail(input, SyntaxErrorKind::DuplicateClause(key.to_string()));
        }
        let message = clause_body(input, in_plural)?;
        clauses.push(SelectClause {
            key: key.to_string(),
            message,
        });
    }

    if !clauses.iter().any(|clause| clause.key == "other") {
        return cut_fail(input, SyntaxErrorKind::MissingOtherClause);
    }
    '}'.parse_next(input)?;

    Ok(Segment::Select { name, clauses })
}

/// Parse a `{...}` clause body as a nested message.
fn clause_body(input: &mut &str, in_plural: bool) -> PResult<Message> {
    ws(input)?;
    cut_err('{')
        .context(SyntaxErrorKind::ExpectedClauseBody)
        .parse_next(input)?;
    let segments: Vec<Segment> =
        repeat(0.., |input: &mut &str| clause_segment(input, in_plural)).parse_next(input)?;
    cut_err('}')
        .context(SyntaxErrorKind::UnbalancedBrace)
        .parse_next(input)?;
    Ok(Message {
        segments: merge_literals(segments),
    })
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> PResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// A clause key: any run up to whitespace or a brace.
fn clause_key<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '{' && c != '}').parse_next(input)
}

/// Parse an argument name.
fn identifier<'i>(input: &mut &'i str) -> PResult<&'i str> {
    (one_of(is_ident_start), take_while(0.., is_ident_cont))
        .take()
        .parse_next(input)
}

/// Parse a decimal number such as `0`, `-1` or `2.5`.
fn number(input: &mut &str) -> PResult<f64> {
    take_while(1.., |c: char| c.is_ascii_digit() || c == '.' || c == '-')
        .verify_map(|text: &str| text.parse::<f64>().ok())
        .parse_next(input)
}

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
fn is_ident_cont(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
