//! Message rendering.
//!
//! Rendering walks a parsed [`Message`] depth-first and never fails: a
//! missing or unusable argument degrades to best-effort output and a
//! diagnostic recorded on the [`RenderContext`].

use crate::interpreter::RenderContext;
use crate::interpreter::diagnostics::DiagnosticKind;
use crate::interpreter::plural::plural_category;
use crate::parser::ast::{CategoryClause, ExactClause, Message, Segment, SelectClause};
use crate::types::{PluralCategory, Value};

/// Render a message with the arguments and locale of `ctx`.
///
/// # Example
///
/// ```
/// use lexicon::{Args, LocaleId, Value, parse_template};
/// use lexicon::interpreter::{RenderContext, render};
///
/// let message = parse_template("{count, plural, one{# file} other{# files}}").unwrap();
/// let locale = LocaleId::parse("en").unwrap();
/// let mut args = Args::new();
/// args.insert("count".to_string(), Value::from(3));
///
/// let mut ctx = RenderContext::new(&args, &locale);
/// assert_eq!(render(&message, &mut ctx), "3 files");
/// assert!(ctx.diagnostics().is_empty());
/// ```
pub fn render(message: &Message, ctx: &mut RenderContext<'_>) -> String {
    let mut output = String::new();
    render_into(message, ctx, &mut output);
    output
}

fn render_into(message: &Message, ctx: &mut RenderContext<'_>, output: &mut String) {
    for segment in &message.segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Interpolation { name } => render_argument(name, ctx, output),
            Segment::Plural {
                name,
                offset,
                exact,
                categories,
            } => render_plural(name, *offset, exact, categories, ctx, output),
            Segment::Select { name, clauses } => render_select(name, clauses, ctx, output),
            Segment::PluralValue => {
                if let Some(value) = ctx.plural_value() {
                    output.push_str(&ctx.formatter().format_number(ctx.locale(), value));
                }
            }
        }
    }
}

fn render_argument(name: &str, ctx: &mut RenderContext<'_>, output: &mut String) {
    match ctx.arg(name) {
        Some(Value::Date(date)) => {
            output.push_str(&ctx.formatter().format_date(ctx.locale(), *date));
        }
        Some(value) => output.push_str(&value.to_string()),
        None => missing_argument(name, ctx),
    }
}

fn render_plural(
    name: &str,
    offset: f64,
    exact: &[ExactClause],
    categories: &[CategoryClause],
    ctx: &mut RenderContext<'_>,
    output: &mut String,
) {
    let Some(raw) = numeric_argument(name, ctx) else {
        ctx.push_plural(None);
        if let Some(clause) = category_clause(categories, PluralCategory::Other) {
            render_into(&clause.message, ctx, output);
        }
        ctx.pop_plural();
        return;
    };

    let value = raw - offset;
    let message = match exact.iter().find(|clause| clause.value == raw) {
        Some(clause) => Some(&clause.message),
        None => {
            let category = plural_category(ctx.locale().as_str(), value);
            category_clause(categories, category)
                .or_else(|| category_clause(categories, PluralCategory::Other))
                .map(|clause| &clause.message)
        }
    };

    if let Some(message) = message {
        ctx.push_plural(Some(value));
        render_into(message, ctx, output);
        ctx.pop_plural();
    }
}

fn render_select(
    name: &str,
    clauses: &[SelectClause],
    ctx: &mut RenderContext<'_>,
    output: &mut String,
) {
    let key = match ctx.arg(name) {
        Some(value) => value.select_key(),
        None => {
            missing_argument(name, ctx);
            None
        }
    };
    let clause = key
        .and_then(|key| clauses.iter().find(|clause| clause.key == key))
        .or_else(|| clauses.iter().find(|clause| clause.key == "other"));
    if let Some(clause) = clause {
        render_into(&clause.message, ctx, output);
    }
}

/// The numeric value of a plural argument, reporting why it is unusable.
fn numeric_argument(name: &str, ctx: &mut RenderContext<'_>) -> Option<f64> {
    match ctx.arg(name) {
        Some(value) => {
            let number = value.as_number();
            if number.is_none() {
                ctx.report(
                    DiagnosticKind::InvalidArgument,
                    format!("plural argument '{name}' is not a number: {value:?}"),
                );
            }
            number
        }
        None => {
            missing_argument(name, ctx);
            None
        }
    }
}

fn missing_argument(name: &str, ctx: &mut RenderContext<'_>) {
    ctx.report(
        DiagnosticKind::MissingArgument,
        format!("argument '{name}' is missing"),
    );
}

fn category_clause(clauses: &[CategoryClause], category: PluralCategory) -> Option<&CategoryClause> {
    clauses.iter().find(|clause| clause.category == category)
}
