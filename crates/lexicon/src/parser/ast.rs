//! Public AST types for ICU-lite messages.
//!
//! These types are public so tooling (validators, linters) can inspect
//! parsed templates without rendering them.

use std::collections::BTreeSet;

use crate::types::PluralCategory;

/// A parsed template: an ordered list of segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub segments: Vec<Segment>,
}

/// A segment within a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text, with `{{`/`}}` escapes already resolved.
    Literal(String),
    /// A plain argument reference: `{name}`.
    Interpolation { name: String },
    /// `{name, plural, offset:N =0{...} one{...} other{...}}`
    Plural {
        name: String,
        offset: f64,
        exact: Vec<ExactClause>,
        categories: Vec<CategoryClause>,
    },
    /// `{name, select, value{...} other{...}}`
    Select {
        name: String,
        clauses: Vec<SelectClause>,
    },
    /// `#` inside a plural sub-message: the offset-adjusted plural value.
    PluralValue,
}

/// An `=N{...}` plural clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactClause {
    pub value: f64,
    pub message: Message,
}

/// A `category{...}` plural clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryClause {
    pub category: PluralCategory,
    pub message: Message,
}

/// A `value{...}` select clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub key: String,
    pub message: Message,
}

impl Message {
    /// A message made of a single literal.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(text.into())],
        }
    }

    /// Returns the text if this message contains nothing but literal text.
    pub fn as_literal(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [] => Some(""),
            [Segment::Literal(text)] => Some(text),
            _ => None,
        }
    }

    /// Every argument name referenced anywhere in the message, including
    /// nested sub-messages.
    pub fn argument_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_names(self, &mut names);
        names
    }
}

fn collect_names<'a>(message: &'a Message, names: &mut BTreeSet<&'a str>) {
    for segment in &message.segments {
        match segment {
            Segment::Literal(_) | Segment::PluralValue => {}
            Segment::Interpolation { name } => {
                names.insert(name);
            }
            Segment::Plural {
                name,
                exact,
                categories,
                ..
            } => {
                names.insert(name);
                for clause in exact {
                    collect_names(&clause.message, names);
                }
                for clause in categories {
                    collect_names(&clause.message, names);
                }
            }
            Segment::Select { name, clauses } => {
                names.insert(name);
                for clause in clauses {
                    collect_names(&clause.message, names);
                }
            }
        }
    }
}
