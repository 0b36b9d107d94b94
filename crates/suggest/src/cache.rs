//! Memoized list lookups and flyout resources.
//!
//! Entries never expire. A field's namespace is flushed when the field is
//! re-bound or unbound; resource entries are shared by every field.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::candidate::Candidate;

/// Stable identity of a bound field, kept across re-binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey(u64);

impl FieldKey {
    pub(crate) fn next(counter: &mut u64) -> Self {
        let id = *counter;
        *counter = counter.wrapping_add(1).max(1);
        Self(id.max(1))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct RequestCache {
    by_field: HashMap<FieldKey, HashMap<String, Arc<Vec<Candidate>>>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, field: FieldKey, key: &str) -> Option<Arc<Vec<Candidate>>> {
        self.by_field.get(&field)?.get(key).cloned()
    }

    /// First write wins; later responses for the same key are ignored.
    pub fn store(&mut self, field: FieldKey, key: String, list: Arc<Vec<Candidate>>) {
        self.by_field
            .entry(field)
            .or_default()
            .entry(key)
            .or_insert(list);
    }

    pub fn flush(&mut self, field: FieldKey) {
        self.by_field.remove(&field);
    }

    pub fn len(&self, field: FieldKey) -> usize {
        self.by_field.get(&field).map_or(0, HashMap::len)
    }
}

/// Blurb bodies and thumbnail URLs, keyed by resource id.
#[derive(Debug, Default)]
pub struct ResourceCache {
    blurbs: HashMap<String, String>,
    thumbnails: HashMap<String, String>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blurb(&self, article_id: &str) -> Option<&str> {
        self.blurbs.get(article_id).map(String::as_str)
    }

    pub fn store_blurb(&mut self, article_id: String, body: String) {
        self.blurbs.entry(article_id).or_insert(body);
    }

    pub fn thumbnail(&self, image_id: &str) -> Option<&str> {
        self.thumbnails.get(image_id).map(String::as_str)
    }

    pub fn store_thumbnail(&mut self, image_id: String, url: String) {
        self.thumbnails.entry(image_id).or_insert(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> Arc<Vec<Candidate>> {
        Arc::new(names.iter().map(|n| Candidate::new(format!("/{n}"), *n)).collect())
    }

    #[test]
    fn keys_are_exact_and_per_field() {
        let mut counter = 1;
        let a = FieldKey::next(&mut counter);
        let b = FieldKey::next(&mut counter);
        let mut cache = RequestCache::new();

        cache.store(a, "fil".into(), list(&["Film"]));
        assert!(cache.lookup(a, "fil").is_some());
        assert!(cache.lookup(a, "Fil").is_none());
        assert!(cache.lookup(b, "fil").is_none());
    }

    #[test]
    fn first_store_wins_and_flush_clears_one_field() {
        let mut counter = 1;
        let a = FieldKey::next(&mut counter);
        let b = FieldKey::next(&mut counter);
        let mut cache = RequestCache::new();

        cache.store(a, "x".into(), list(&["One"]));
        cache.store(a, "x".into(), list(&["Two"]));
        cache.store(b, "x".into(), list(&["Three"]));
        assert_eq!(cache.lookup(a, "x").unwrap()[0].display_name(), "One");

        cache.flush(a);
        assert_eq!(cache.len(a), 0);
        assert_eq!(cache.len(b), 1);
    }

    #[test]
    fn resources_are_separate_by_kind() {
        let mut cache = ResourceCache::new();
        cache.store_blurb("/guid/1".into(), "text".into());
        assert_eq!(cache.blurb("/guid/1"), Some("text"));
        assert_eq!(cache.thumbnail("/guid/1"), None);
    }
}
