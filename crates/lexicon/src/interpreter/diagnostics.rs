//! Diagnostics emitted when a translation degrades, and the listener
//! registry used to deliver them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;

/// The kind of problem a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No locale in the fallback chain has the key.
    MissingTranslation,
    /// A placeholder names an argument absent from the bag.
    MissingArgument,
    /// A plural argument that is not a number.
    InvalidArgument,
    /// The template failed to parse; the raw text was rendered instead.
    TemplateSyntaxError,
    /// `set_locale` was called with a locale that has no catalog.
    UnknownLocale,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MissingTranslation => "missing_translation",
            DiagnosticKind::MissingArgument => "missing_argument",
            DiagnosticKind::InvalidArgument => "invalid_argument",
            DiagnosticKind::TemplateSyntaxError => "template_syntax_error",
            DiagnosticKind::UnknownLocale => "unknown_locale",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record of one degraded translation.
///
/// `locale` is where the problem was observed: the first locale of the
/// fallback chain for missing keys, the locale the template was resolved from
/// for render and syntax problems, and the requested string for `UnknownLocale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub key_path: Option<String>,
    pub locale: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, locale: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            key_path: None,
            locale: locale.into(),
            detail: detail.into(),
        }
    }

    pub fn with_key_path(mut self, key_path: Option<&str>) -> Self {
        self.key_path = key_path.map(str::to_string);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind, self.locale)?;
        if let Some(key_path) = &self.key_path {
            write!(f, " {key_path}")?;
        }
        write!(f, ": {}", self.detail)
    }
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
}

struct Listeners<T> {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(u64, Callback<T>)>>,
}

impl<T> Detach for Listeners<T> {
    fn detach(&self, id: u64) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(listener, _)| *listener != id);
        callbacks.len() != before
    }
}

/// A set of callbacks invoked with each emitted event.
///
/// Callbacks run on the emitting thread, after the internal lock has been
/// released, so a callback may subscribe, unsubscribe or emit again.
pub(crate) struct ListenerSet<T> {
    inner: Arc<Listeners<T>>,
}

impl<T: 'static> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                callbacks: RwLock::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.callbacks.write().push((id, Arc::new(callback)));
        let inner: Arc<dyn Detach> = self.inner.clone();
        Subscription {
            id,
            listeners: Arc::downgrade(&inner),
        }
    }

    pub(crate) fn emit(&self, event: &T) {
        let callbacks: Vec<Callback<T>> = self
            .inner
            .callbacks
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

/// Handle returned by `on_locale_change` and `on_diagnostic`.
///
/// Dropping the handle keeps the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription {
    id: u64,
    listeners: Weak<dyn Detach>,
}

impl Subscription {
    /// Remove the callback. Returns `false` if it was already removed or
    /// its manager has been dropped.
    pub fn unsubscribe(self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|listeners| listeners.detach(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
