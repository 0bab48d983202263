//! Memoized template parsing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::interpreter::resolver::Resolved;
use crate::parser::{Message, ParseError, parse_template};
use crate::types::LocaleId;

/// Ad-hoc templates kept before the source map is reset.
const MAX_SOURCES: usize = 256;

pub(crate) type Parsed = Result<Arc<Message>, ParseError>;

#[derive(Debug, Clone)]
struct CachedTemplate {
    revision: u64,
    parsed: Parsed,
}

/// Parsed templates keyed by (locale, key path), plus ad-hoc templates keyed
/// by their source text.
///
/// The source map holds at most `MAX_SOURCES` entries and starts over when
/// full, so callers formatting generated text cannot grow it without limit.
///
/// Catalog entries remember the catalog revision they were parsed from and
/// are reparsed when it changes. Parsing is pure, so two threads racing on a
/// miss both produce the same result.
#[derive(Debug, Default)]
pub(crate) struct TemplateCache {
    templates: RwLock<HashMap<LocaleId, HashMap<String, CachedTemplate>>>,
    sources: RwLock<HashMap<String, Parsed>>,
}

impl TemplateCache {
    pub(crate) fn get_or_parse(&self, key_path: &str, resolved: &Resolved) -> Parsed {
        if let Some(cached) = self
            .templates
            .read()
            .get(&resolved.locale)
            .and_then(|entries| entries.get(key_path))
            .filter(|cached| cached.revision == resolved.revision)
        {
            return cached.parsed.clone();
        }

        tracing::debug!(locale = %resolved.locale, key_path, "parsing template");
        let parsed = parse_template(&resolved.template).map(Arc::new);
        self.templates
            .write()
            .entry(resolved.locale.clone())
            .or_default()
            .insert(
                key_path.to_string(),
                CachedTemplate {
                    revision: resolved.revision,
                    parsed: parsed.clone(),
                },
            );
        parsed
    }

    pub(crate) fn get_or_parse_source(&self, source: &str) -> Parsed {
        if let Some(parsed) = self.sources.read().get(source) {
            return parsed.clone();
        }
        let parsed = parse_template(source).map(Arc::new);
        let mut sources = self.sources.write();
        if sources.len() >= MAX_SOURCES {
            tracing::debug!(entries = sources.len(), "resetting ad-hoc template cache");
            sources.clear();
        }
        sources.insert(source.to_string(), parsed.clone());
        parsed
    }

    /// Drop every entry parsed from `locale`'s catalog.
    pub(crate) fn invalidate_locale(&self, locale: &LocaleId) {
        self.templates.write().remove(locale);
    }

    pub(crate) fn len(&self) -> usize {
        let templates: usize = self.templates.read().values().map(HashMap::len).sum();
        templates + self.sources.read().len()
    }

    pub(crate) fn clear(&self) {
        self.templates.write().clear();
        self.sources.write().clear();
    }
}
