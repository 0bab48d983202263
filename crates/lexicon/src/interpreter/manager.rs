//! The user-facing translation entry point.
//!
//! A [`LocaleManager`] owns the catalogs of every loaded locale, the active
//! locale and its fallback chain, the parse cache and the subscriber lists.
//! Every method takes `&self`, so one manager can be shared behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::bon;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, CatalogStore};
use crate::interpreter::cache::TemplateCache;
use crate::interpreter::diagnostics::{Diagnostic, DiagnosticKind, ListenerSet, Subscription};
use crate::interpreter::format::{PlainFormatter, ValueFormatter};
use crate::interpreter::resolver::{FallbackChain, ResolveError, find, resolve};
use crate::interpreter::validate::{CatalogWarning, validate_catalog};
use crate::interpreter::{RenderContext, render};
use crate::parser::{Message, ParseError};
use crate::types::{Args, InvalidLocaleId, LocaleId};

/// How a template syntax error is handled by `translate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateMode {
    /// Render the raw template text and emit a diagnostic.
    #[default]
    Lenient,
    /// Panic, so authoring errors fail tests.
    Strict,
}

/// Delivered to `on_locale_change` subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChange {
    pub previous: LocaleId,
    pub current: LocaleId,
}

/// Returned by [`LocaleManager::set_locale`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("no catalog loaded for locale '{requested}' (available: {})", available.join(", "))]
    UnknownLocale {
        requested: String,
        available: Vec<String>,
    },
}

/// Errors that occur while loading a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error when reading a catalog file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog payload is malformed.
    #[error("invalid catalog for '{locale}': {source}")]
    Catalog {
        locale: LocaleId,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    InvalidLocale(#[from] InvalidLocaleId),

    /// A catalog directory without any `*.json` fragment.
    #[error("no catalog fragments in '{path}'")]
    EmptyCatalogDir { path: PathBuf },

    /// Attempted to reload a catalog that was not loaded from a file.
    #[error("cannot reload '{locale}': was not loaded from a file")]
    NoPathForReload { locale: LocaleId },
}

/// Errors reported by [`LocaleManager::try_translate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Missing(#[from] ResolveError),

    #[error("template '{key_path}' in '{locale}' is malformed: {source}")]
    Syntax {
        key_path: String,
        locale: LocaleId,
        #[source]
        source: ParseError,
    },

    /// The template rendered, but with missing or invalid arguments.
    #[error("template '{key_path}' rendered with {} problem(s): {}", diagnostics.len(), describe(diagnostics))]
    Degraded {
        key_path: String,
        output: String,
        diagnostics: Vec<Diagnostic>,
    },
}

fn describe(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.detail.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolves keys to rendered messages for the active locale.
///
/// # Example
///
/// ```
/// use lexicon::{LocaleId, LocaleManager, args};
///
/// let manager = LocaleManager::builder()
///     .default_locale(LocaleId::parse("en").unwrap())
///     .build();
/// manager
///     .load_catalog_str(
///         LocaleId::parse("en").unwrap(),
///         r#"{ "inbox": { "unread": "{count, plural, one{# message} other{# messages}}" } }"#,
///     )
///     .unwrap();
///
/// assert_eq!(manager.translate("inbox.unread", &args! { count: 1 }), "1 message");
/// assert_eq!(manager.translate("inbox.unread", &args! { count: 4 }), "4 messages");
/// assert_eq!(manager.translate("inbox.missing", &args! {}), "inbox.missing");
/// ```
pub struct LocaleManager {
    default_locale: LocaleId,
    /// Active locale first.
    chain: RwLock<FallbackChain>,
    mode: TranslateMode,
    formatter: Arc<dyn ValueFormatter>,
    store: CatalogStore,
    cache: TemplateCache,
    /// Fragment files for reload support. Only populated for file-loaded catalogs.
    paths: RwLock<HashMap<LocaleId, Vec<PathBuf>>>,
    locale_listeners: ListenerSet<LocaleChange>,
    diagnostic_listeners: ListenerSet<Diagnostic>,
}

#[bon]
impl LocaleManager {
    /// Create a manager. The active locale starts as `initial_locale`, or
    /// the default locale if none is given.
    ///
    /// The initial locale is accepted as-is; its catalog may be loaded
    /// afterwards.
    #[builder]
    pub fn new(
        default_locale: LocaleId,
        initial_locale: Option<LocaleId>,
        #[builder(default)] mode: TranslateMode,
        formatter: Option<Arc<dyn ValueFormatter>>,
    ) -> Self {
        let active = initial_locale.unwrap_or_else(|| default_locale.clone());
        Self {
            chain: RwLock::new(FallbackChain::new(&active, &default_locale)),
            default_locale,
            mode,
            formatter: formatter.unwrap_or_else(|| Arc::new(PlainFormatter)),
            store: CatalogStore::new(),
            cache: TemplateCache::default(),
            paths: RwLock::new(HashMap::new()),
            locale_listeners: ListenerSet::new(),
            diagnostic_listeners: ListenerSet::new(),
        }
    }
}

impl LocaleManager {
    // =========================================================================
    // Locale Management
    // =========================================================================

    pub fn active_locale(&self) -> LocaleId {
        self.chain.read().primary().clone()
    }

    pub fn default_locale(&self) -> &LocaleId {
        &self.default_locale
    }

    pub fn mode(&self) -> TranslateMode {
        self.mode
    }

    /// The locales `translate` currently looks in, most specific first.
    pub fn fallback_chain(&self) -> FallbackChain {
        self.chain.read().clone()
    }

    /// Every locale with a loaded catalog, sorted.
    pub fn available_locales(&self) -> Vec<LocaleId> {
        self.store.locales()
    }

    /// Switch the active locale.
    ///
    /// The locale must have a loaded catalog. Otherwise the active locale is
    /// kept, one `UnknownLocale` diagnostic is emitted and an error is
    /// returned. Subscribers are notified only when the locale actually
    /// changes.
    pub fn set_locale(&self, locale: &str) -> Result<(), LocaleError> {
        let Some(next) = LocaleId::parse(locale)
            .ok()
            .filter(|id| self.store.contains(id))
        else {
            self.emit(Diagnostic::new(
                DiagnosticKind::UnknownLocale,
                locale,
                format!("no catalog loaded for locale '{locale}'"),
            ));
            return Err(LocaleError::UnknownLocale {
                requested: locale.to_string(),
                available: self
                    .available_locales()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            });
        };

        let previous = {
            let mut chain = self.chain.write();
            let previous = chain.primary().clone();
            if previous == next {
                return Ok(());
            }
            *chain = FallbackChain::new(&next, &self.default_locale);
            previous
        };
        tracing::debug!(%previous, current = %next, "active locale changed");
        self.locale_listeners.emit(&LocaleChange {
            previous,
            current: next,
        });
        Ok(())
    }

    /// Register a callback invoked after every successful locale switch.
    pub fn on_locale_change(
        &self,
        callback: impl Fn(&LocaleChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.locale_listeners.subscribe(callback)
    }

    /// Register a callback invoked with every emitted diagnostic.
    pub fn on_diagnostic(
        &self,
        callback: impl Fn(&Diagnostic) + Send + Sync + 'static,
    ) -> Subscription {
        self.diagnostic_listeners.subscribe(callback)
    }

    // =========================================================================
    // Catalog Loading
    // =========================================================================

    /// Register or replace a locale's catalog. Returns the number of keys.
    ///
    /// Readers see either the old or the new catalog, never a mix.
    pub fn load_catalog(&self, locale: LocaleId, catalog: Catalog) -> usize {
        self.paths.write().remove(&locale);
        self.apply_catalog(locale, catalog)
    }

    /// Load a catalog from a nested JSON object of strings.
    pub fn load_catalog_str(&self, locale: LocaleId, json: &str) -> Result<usize, LoadError> {
        let catalog = Catalog::from_json_str(json).map_err(|source| LoadError::Catalog {
            locale: locale.clone(),
            source,
        })?;
        Ok(self.load_catalog(locale, catalog))
    }

    /// Load one locale's catalog from fragments that each hold part of its
    /// keys. The fragments are merged and applied as one swap; overlapping
    /// keys are an error and leave the current catalog in place.
    pub fn load_catalog_fragments(
        &self,
        locale: LocaleId,
        fragments: impl IntoIterator<Item = Catalog>,
    ) -> Result<usize, LoadError> {
        let catalog = merge_fragments(&locale, fragments)?;
        Ok(self.load_catalog(locale, catalog))
    }

    /// Load a catalog from a JSON file. The path is kept for
    /// [`reload_catalog`](Self::reload_catalog).
    pub fn load_catalog_file(
        &self,
        locale: LocaleId,
        path: impl AsRef<Path>,
    ) -> Result<usize, LoadError> {
        self.load_catalog_files(locale, [path])
    }

    /// Load a catalog split across several JSON files, merged as by
    /// [`load_catalog_fragments`](Self::load_catalog_fragments).
    pub fn load_catalog_files<P: AsRef<Path>>(
        &self,
        locale: LocaleId,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<usize, LoadError> {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|path| path.as_ref().to_path_buf())
            .collect();
        let fragments = paths
            .iter()
            .map(|path| read_catalog_file(&locale, path))
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = merge_fragments(&locale, fragments)?;
        let count = self.apply_catalog(locale.clone(), catalog);
        self.paths.write().insert(locale, paths);
        Ok(count)
    }

    /// Load every `*.json` file in `dir` as a fragment of one locale's
    /// catalog (`locales/ro/translations.json`, `locales/ro/tour.json`, ...).
    ///
    /// Reloading re-reads the files found here; files added later are not
    /// picked up until the directory is loaded again.
    pub fn load_catalog_dir(&self, locale: LocaleId, dir: impl AsRef<Path>) -> Result<usize, LoadError> {
        let paths = fragment_files(dir.as_ref())?;
        self.load_catalog_files(locale, paths)
    }

    /// Re-read a catalog from the files it was loaded from.
    pub fn reload_catalog(&self, locale: &LocaleId) -> Result<usize, LoadError> {
        let paths = self
            .paths
            .read()
            .get(locale)
            .cloned()
            .ok_or_else(|| LoadError::NoPathForReload {
                locale: locale.clone(),
            })?;
        self.load_catalog_files(locale.clone(), paths)
    }

    /// Load a catalog produced by a future.
    ///
    /// Loads for the same locale apply in the order they were requested: if
    /// a later-requested load has already been applied when this one
    /// completes, this one is discarded and `Ok(false)` is returned.
    pub async fn load_catalog_with<F>(&self, locale: LocaleId, load: F) -> Result<bool, LoadError>
    where
        F: Future<Output = Result<Catalog, LoadError>>,
    {
        let ticket = self.store.begin_load(locale.clone());
        let catalog = load.await?;
        let count = catalog.len();
        if !self.store.complete_load(ticket, catalog) {
            return Ok(false);
        }
        self.paths.write().remove(&locale);
        self.cache.invalidate_locale(&locale);
        tracing::debug!(%locale, keys = count, "catalog loaded");
        Ok(true)
    }

    /// The current catalog of `locale`.
    pub fn catalog(&self, locale: &LocaleId) -> Option<Arc<Catalog>> {
        self.store.snapshot(locale)
    }

    /// Check a loaded locale's catalog against the default locale's.
    ///
    /// Returns an empty list if either catalog is not loaded.
    pub fn validate(&self, locale: &LocaleId) -> Vec<CatalogWarning> {
        match (
            self.store.snapshot(&self.default_locale),
            self.store.snapshot(locale),
        ) {
            (Some(default), Some(target)) => validate_catalog(&default, &target, locale),
            _ => Vec::new(),
        }
    }

    fn apply_catalog(&self, locale: LocaleId, catalog: Catalog) -> usize {
        let count = catalog.len();
        self.store.load(locale.clone(), catalog);
        self.cache.invalidate_locale(&locale);
        tracing::debug!(%locale, keys = count, "catalog loaded");
        count
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Translate `key_path` in the active locale.
    ///
    /// Never fails. A key missing from every locale of the fallback chain
    /// renders as the key path itself; a malformed template renders as its
    /// raw text (or panics in [`TranslateMode::Strict`]). Each degradation
    /// emits a diagnostic.
    pub fn translate(&self, key_path: &str, args: &Args) -> String {
        let chain = self.fallback_chain();
        self.translate_chain(&chain, key_path, args)
    }

    /// Translate a key that takes no arguments.
    pub fn translate_plain(&self, key_path: &str) -> String {
        self.translate(key_path, &Args::new())
    }

    /// Translate `key_path` in `locale` without switching the active locale.
    pub fn translate_in(&self, locale: &LocaleId, key_path: &str, args: &Args) -> String {
        let chain = FallbackChain::new(locale, &self.default_locale);
        self.translate_chain(&chain, key_path, args)
    }

    /// Translate in the active locale, reporting every degradation as an
    /// error instead of a diagnostic.
    pub fn try_translate(&self, key_path: &str, args: &Args) -> Result<String, TranslateError> {
        let chain = self.fallback_chain();
        self.try_translate_chain(&chain, key_path, args)
    }

    /// [`try_translate`](Self::try_translate) against another locale.
    pub fn try_translate_in(
        &self,
        locale: &LocaleId,
        key_path: &str,
        args: &Args,
    ) -> Result<String, TranslateError> {
        let chain = FallbackChain::new(locale, &self.default_locale);
        self.try_translate_chain(&chain, key_path, args)
    }

    /// Render an ad-hoc template in the active locale.
    ///
    /// Parsed templates are cached by source text. The cache keeps a bounded
    /// number of sources and starts over once it is full.
    pub fn format_str(&self, template: &str, args: &Args) -> String {
        let locale = self.active_locale();
        match self.cache.get_or_parse_source(template) {
            Ok(message) => self.render_message(&message, &locale, None, args),
            Err(error) => self.syntax_error(None, &locale, template, &error),
        }
    }

    /// Number of parsed templates currently cached.
    pub fn template_cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_template_cache(&self) {
        self.cache.clear();
    }

    fn translate_chain(&self, chain: &FallbackChain, key_path: &str, args: &Args) -> String {
        let Some(resolved) = find(key_path, chain, &self.store) else {
            let error = ResolveError::MissingTranslation {
                key_path: key_path.to_string(),
                tried: chain.locales().to_vec(),
                suggestions: Vec::new(),
            };
            self.emit(
                Diagnostic::new(
                    DiagnosticKind::MissingTranslation,
                    chain.primary().as_str(),
                    error.to_string(),
                )
                .with_key_path(Some(key_path)),
            );
            return key_path.to_string();
        };
        match self.cache.get_or_parse(key_path, &resolved) {
            Ok(message) => self.render_message(&message, &resolved.locale, Some(key_path), args),
            Err(error) => {
                self.syntax_error(Some(key_path), &resolved.locale, &resolved.template, &error)
            }
        }
    }

    fn try_translate_chain(
        &self,
        chain: &FallbackChain,
        key_path: &str,
        args: &Args,
    ) -> Result<String, TranslateError> {
        let resolved = resolve(key_path, chain, &self.store)?;
        let message = self
            .cache
            .get_or_parse(key_path, &resolved)
            .map_err(|source| TranslateError::Syntax {
                key_path: key_path.to_string(),
                locale: resolved.locale.clone(),
                source,
            })?;
        let mut ctx = RenderContext::with_formatter(args, &resolved.locale, self.formatter.as_ref())
            .with_key_path(key_path);
        let output = render(&message, &mut ctx);
        let diagnostics = ctx.take_diagnostics();
        if diagnostics.is_empty() {
            Ok(output)
        } else {
            Err(TranslateError::Degraded {
                key_path: key_path.to_string(),
                output,
                diagnostics,
            })
        }
    }

    fn render_message(
        &self,
        message: &Message,
        locale: &LocaleId,
        key_path: Option<&str>,
        args: &Args,
    ) -> String {
        let mut ctx = RenderContext::with_formatter(args, locale, self.formatter.as_ref());
        if let Some(key_path) = key_path {
            ctx = ctx.with_key_path(key_path);
        }
        let output = render(message, &mut ctx);
        for diagnostic in ctx.take_diagnostics() {
            self.emit(diagnostic);
        }
        output
    }

    fn syntax_error(
        &self,
        key_path: Option<&str>,
        locale: &LocaleId,
        template: &str,
        error: &ParseError,
    ) -> String {
        let name = key_path.unwrap_or("<inline template>");
        if self.mode == TranslateMode::Strict {
            panic!("malformed template '{name}' in '{locale}': {error}");
        }
        self.emit(
            Diagnostic::new(
                DiagnosticKind::TemplateSyntaxError,
                locale.as_str(),
                error.to_string(),
            )
            .with_key_path(key_path),
        );
        template.to_string()
    }

    fn emit(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = %diagnostic.kind,
            locale = %diagnostic.locale,
            key_path = diagnostic.key_path.as_deref(),
            "{}",
            diagnostic.detail
        );
        self.diagnostic_listeners.emit(&diagnostic);
    }
}

fn merge_fragments(
    locale: &LocaleId,
    fragments: impl IntoIterator<Item = Catalog>,
) -> Result<Catalog, LoadError> {
    let mut catalog = Catalog::new();
    for fragment in fragments {
        catalog.merge(fragment).map_err(|source| LoadError::Catalog {
            locale: locale.clone(),
            source,
        })?;
    }
    Ok(catalog)
}

/// The `*.json` files directly inside `dir`, sorted by name.
fn fragment_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|extension| extension == "json") {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(LoadError::EmptyCatalogDir {
            path: dir.to_path_buf(),
        });
    }
    paths.sort();
    Ok(paths)
}

fn read_catalog_file(locale: &LocaleId, path: &Path) -> Result<Catalog, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Catalog::from_json_str(&content).map_err(|source| LoadError::Catalog {
        locale: locale.clone(),
        source,
    })
}

impl fmt::Debug for LocaleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleManager")
            .field("default_locale", &self.default_locale)
            .field("chain", &*self.chain.read())
            .field("mode", &self.mode)
            .field("locales", &self.store.locales())
            .finish_non_exhaustive()
    }
}
