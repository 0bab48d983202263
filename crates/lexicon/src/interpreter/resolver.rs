//! Key resolution across a locale fallback chain.

use std::fmt;

use thiserror::Error;

use crate::catalog::CatalogStore;
use crate::types::LocaleId;

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Maximum number of suggestions reported.
const MAX_SUGGESTIONS: usize = 3;

/// The ordered locales a key is looked up in.
///
/// The chain for active locale `pt-BR` and default `en` is
/// `pt-BR → pt → en`. Duplicates are removed, keeping the first occurrence,
/// so the chain for `en-US` with default `en` is `en-US → en`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    locales: Vec<LocaleId>,
}

impl FallbackChain {
    pub fn new(active: &LocaleId, default: &LocaleId) -> Self {
        let mut locales = vec![active.clone()];
        for candidate in active.language_only().into_iter().chain([default.clone()]) {
            if !locales.contains(&candidate) {
                locales.push(candidate);
            }
        }
        Self { locales }
    }

    /// The most specific locale of the chain.
    pub fn primary(&self) -> &LocaleId {
        &self.locales[0]
    }

    /// The last locale of the chain (the default locale).
    pub fn last(&self) -> &LocaleId {
        &self.locales[self.locales.len() - 1]
    }

    pub fn locales(&self) -> &[LocaleId] {
        &self.locales
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocaleId> {
        self.locales.iter()
    }
}

impl fmt::Display for FallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.locales.iter().map(LocaleId::as_str).collect();
        f.write_str(&names.join(" -> "))
    }
}

/// A template found for a key, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The locale whose catalog held the template.
    pub locale: LocaleId,
    pub template: String,
    /// Revision of that locale's catalog, for cache validation.
    pub revision: u64,
}

/// Errors from [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{}", missing_translation_message(key_path, tried, suggestions))]
    MissingTranslation {
        key_path: String,
        tried: Vec<LocaleId>,
        suggestions: Vec<String>,
    },
}

fn missing_translation_message(key_path: &str, tried: &[LocaleId], suggestions: &[String]) -> String {
    let tried: Vec<&str> = tried.iter().map(LocaleId::as_str).collect();
    let mut message = format!("no translation for '{key_path}' in [{}]", tried.join(", "));
    if !suggestions.is_empty() {
        message.push_str(&format!("; did you mean: {}?", suggestions.join(", ")));
    }
    message
}

/// Find the template for `key_path`, trying each locale of `chain` in order.
///
/// The earliest (most specific) locale holding the key wins. This is the
/// lookup used on the render path; it does no work beyond the lookups.
pub fn find(key_path: &str, chain: &FallbackChain, store: &CatalogStore) -> Option<Resolved> {
    chain.iter().find_map(|locale| {
        store.lookup(locale, key_path).map(|found| Resolved {
            locale: locale.clone(),
            template: found.template,
            revision: found.revision,
        })
    })
}

/// Like [`find`], but a miss is an error carrying the tried locales and close
/// matches from the last locale's keys.
pub fn resolve(
    key_path: &str,
    chain: &FallbackChain,
    store: &CatalogStore,
) -> Result<Resolved, ResolveError> {
    if let Some(resolved) = find(key_path, chain, store) {
        return Ok(resolved);
    }

    let suggestions = store
        .snapshot(chain.last())
        .map(|catalog| compute_suggestions(key_path, catalog.keys().iter().map(String::as_str)))
        .unwrap_or_default();
    Err(ResolveError::MissingTranslation {
        key_path: key_path.to_string(),
        tried: chain.locales().to_vec(),
        suggestions,
    })
}

/// Names within a small edit distance of `target`, closest first.
pub fn compute_suggestions<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
