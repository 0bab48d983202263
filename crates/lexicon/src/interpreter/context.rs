//! Render context carrying state through recursive evaluation.

use std::mem;

use crate::interpreter::diagnostics::{Diagnostic, DiagnosticKind};
use crate::interpreter::format::{PlainFormatter, ValueFormatter};
use crate::types::{Args, LocaleId, Value};

static PLAIN: PlainFormatter = PlainFormatter;

/// State for one render call.
///
/// The context tracks:
/// - The argument bag
/// - The locale whose plural rules apply
/// - The key path being rendered, for diagnostics
/// - The `#` value of each enclosing plural clause
/// - Diagnostics collected during the render
pub struct RenderContext<'a> {
    args: &'a Args,
    locale: &'a LocaleId,
    key_path: Option<&'a str>,
    formatter: &'a dyn ValueFormatter,
    /// Innermost last. `None` marks a plural whose argument was unusable.
    plural_values: Vec<Option<f64>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> RenderContext<'a> {
    /// Create a context using [`PlainFormatter`].
    pub fn new(args: &'a Args, locale: &'a LocaleId) -> Self {
        Self::with_formatter(args, locale, &PLAIN)
    }

    pub fn with_formatter(
        args: &'a Args,
        locale: &'a LocaleId,
        formatter: &'a dyn ValueFormatter,
    ) -> Self {
        Self {
            args,
            locale,
            key_path: None,
            formatter,
            plural_values: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Attach the key path that diagnostics should report.
    pub fn with_key_path(mut self, key_path: &'a str) -> Self {
        self.key_path = Some(key_path);
        self
    }

    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }

    pub fn locale(&self) -> &'a LocaleId {
        self.locale
    }

    pub fn key_path(&self) -> Option<&'a str> {
        self.key_path
    }

    pub fn formatter(&self) -> &'a dyn ValueFormatter {
        self.formatter
    }

    pub(crate) fn push_plural(&mut self, value: Option<f64>) {
        self.plural_values.push(value);
    }

    pub(crate) fn pop_plural(&mut self) {
        self.plural_values.pop();
    }

    /// The `#` value of the innermost enclosing plural, if usable.
    pub(crate) fn plural_value(&self) -> Option<f64> {
        self.plural_values.last().copied().flatten()
    }

    /// Record a diagnostic; identical diagnostics are reported once.
    pub fn report(&mut self, kind: DiagnosticKind, detail: impl Into<String>) {
        let diagnostic =
            Diagnostic::new(kind, self.locale.as_str(), detail).with_key_path(self.key_path);
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain all collected diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }
}
