//! Lexicon interpreter for resolving and rendering messages.
//!
//! This module takes parsed templates and produces formatted strings. It
//! resolves keys across the locale fallback chain, selects plural and select
//! clauses, substitutes arguments, and reports what degraded along the way.

mod cache;
mod context;
mod diagnostics;
mod evaluator;
mod format;
mod manager;
mod plural;
mod resolver;
mod validate;

pub use context::RenderContext;
pub use diagnostics::{Diagnostic, DiagnosticKind, Subscription};
pub use evaluator::render;
pub use format::{PlainFormatter, ValueFormatter};
pub use manager::{LoadError, LocaleChange, LocaleError, LocaleManager, TranslateError, TranslateMode};
pub use plural::plural_category;
pub use resolver::{FallbackChain, ResolveError, Resolved, compute_suggestions, find, resolve};
pub use validate::{CatalogWarning, missing_keys, validate_catalog};
