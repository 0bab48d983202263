//! Copy-on-write storage for per-locale catalogs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::Catalog;
use crate::types::LocaleId;

/// A catalog together with the revision it was loaded under.
///
/// Revisions are unique across the store and grow with every applied load,
/// so anything derived from a catalog (parsed templates) can be tagged with
/// the revision and checked for staleness later.
#[derive(Debug, Clone)]
struct LoadedCatalog {
    revision: u64,
    catalog: Arc<Catalog>,
}

/// A template found by [`CatalogStore::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub template: String,
    pub revision: u64,
}

/// A pending load request for one locale.
///
/// Tickets are numbered in request order. Completing a ticket is a no-op if
/// a later-requested load for the same locale has already been applied.
#[derive(Debug)]
#[must_use = "a load ticket does nothing until passed to `complete_load`"]
pub struct LoadTicket {
    locale: LocaleId,
    sequence: u64,
}

impl LoadTicket {
    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
struct RequestState {
    issued: u64,
    applied: u64,
}

/// Holds every loaded catalog, keyed by locale.
///
/// Readers take a snapshot of the whole locale map; writers build a new map
/// and swap it in, so a reader never observes a partially loaded catalog.
#[derive(Debug)]
pub struct CatalogStore {
    catalogs: ArcSwap<HashMap<LocaleId, LoadedCatalog>>,
    revisions: AtomicU64,
    /// Request bookkeeping; also serializes writers.
    requests: Mutex<HashMap<LocaleId, RequestState>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            catalogs: ArcSwap::from_pointee(HashMap::new()),
            revisions: AtomicU64::new(0),
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Register or atomically replace one locale's catalog.
    pub fn load(&self, locale: LocaleId, catalog: Catalog) -> bool {
        let ticket = self.begin_load(locale);
        self.complete_load(ticket, catalog)
    }

    /// Record a load request for `locale` and return its ticket.
    pub fn begin_load(&self, locale: LocaleId) -> LoadTicket {
        let mut requests = self.requests.lock();
        let state = requests.entry(locale.clone()).or_default();
        state.issued += 1;
        LoadTicket {
            locale,
            sequence: state.issued,
        }
    }

    /// Apply a completed load unless a later request already won.
    ///
    /// Returns whether the catalog was applied.
    pub fn complete_load(&self, ticket: LoadTicket, catalog: Catalog) -> bool {
        let mut requests = self.requests.lock();
        let state = requests.entry(ticket.locale.clone()).or_default();
        if ticket.sequence <= state.applied {
            tracing::debug!(
                locale = %ticket.locale,
                sequence = ticket.sequence,
                applied = state.applied,
                "discarding superseded catalog load"
            );
            return false;
        }
        state.applied = ticket.sequence;

        let revision = self.revisions.fetch_add(1, Ordering::Relaxed) + 1;
        let mut next = HashMap::clone(&self.catalogs.load_full());
        next.insert(
            ticket.locale,
            LoadedCatalog {
                revision,
                catalog: Arc::new(catalog),
            },
        );
        self.catalogs.store(Arc::new(next));
        true
    }

    /// Look up a template and the revision of the catalog it came from.
    pub fn lookup(&self, locale: &LocaleId, key_path: &str) -> Option<Lookup> {
        let catalogs = self.catalogs.load();
        let loaded = catalogs.get(locale)?;
        loaded.catalog.get(key_path).map(|template| Lookup {
            template: template.to_string(),
            revision: loaded.revision,
        })
    }

    /// Look up a template in one locale.
    pub fn get(&self, locale: &LocaleId, key_path: &str) -> Option<String> {
        self.lookup(locale, key_path).map(|found| found.template)
    }

    /// Whether a catalog is loaded for `locale`.
    pub fn contains(&self, locale: &LocaleId) -> bool {
        self.catalogs.load().contains_key(locale)
    }

    /// The current catalog for `locale`.
    pub fn snapshot(&self, locale: &LocaleId) -> Option<Arc<Catalog>> {
        self.catalogs
            .load()
            .get(locale)
            .map(|loaded| Arc::clone(&loaded.catalog))
    }

    /// The revision of the current catalog for `locale`.
    pub fn revision(&self, locale: &LocaleId) -> Option<u64> {
        self.catalogs.load().get(locale).map(|loaded| loaded.revision)
    }

    /// Every loaded locale, sorted.
    pub fn locales(&self) -> Vec<LocaleId> {
        let mut locales: Vec<LocaleId> = self.catalogs.load().keys().cloned().collect();
        locales.sort();
        locales
    }
}
