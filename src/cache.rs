// Lazily-filled, explicitly invalidated mapping of remote objects.

use std::collections::BTreeMap;

/// Whether a cache has been filled, and with what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never fetched, or invalidated since the last fetch.
    Unfetched,
    /// Fetched, and the server reported nothing.
    Empty,
    /// Fetched, at least one entry.
    Populated,
}

/// Mapping from a lookup key to entities built from the last server listing.
///
/// A refill replaces every entry; entries are never patched in place across
/// a refresh.
#[derive(Debug, Clone)]
pub struct Cache<K, V> {
    state: CacheState,
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Cache<K, V> {
    pub fn new() -> Self {
        Cache {
            state: CacheState::Unfetched,
            entries: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_fetched(&self) -> bool {
        self.state != CacheState::Unfetched
    }

    /// Drop every entry; the next `get_or_fetch` goes back to the server.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.state = CacheState::Unfetched;
    }

    /// Replace the contents with `entries`.
    pub fn fill<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.entries = entries.into_iter().collect();
        self.state = if self.entries.is_empty() {
            CacheState::Empty
        } else {
            CacheState::Populated
        };
    }

    /// The entries, or `None` when the cache has not been fetched.
    pub fn entries(&self) -> Option<&BTreeMap<K, V>> {
        self.is_fetched().then_some(&self.entries)
    }

    /// Return the entries, running `fetch` first if the cache is unfetched.
    pub fn get_or_fetch<F, I, E>(&mut self, fetch: F) -> Result<&BTreeMap<K, V>, E>
    where
        F: FnOnce() -> Result<I, E>,
        I: IntoIterator<Item = (K, V)>,
    {
        if !self.is_fetched() {
            self.fill(fetch()?);
        }
        Ok(&self.entries)
    }

    /// Invalidate and refetch. If `fetch` fails the cache stays unfetched.
    pub fn refresh<F, I, E>(&mut self, fetch: F) -> Result<&BTreeMap<K, V>, E>
    where
        F: FnOnce() -> Result<I, E>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.invalidate();
        self.get_or_fetch(fetch)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }
}
