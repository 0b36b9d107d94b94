//! Variant behaviour: what to fetch, how to decode it, how rows look.
//!
//! The engine is the same for every widget; a [`ListHooks`] implementation
//! decides the parts that differ. `SuggestHooks` searches as the user types,
//! `SelectHooks` enumerates one type once and filters locally.

use std::time::Duration;

use crate::candidate::Candidate;
use crate::debounce;
use crate::error::Result;
use crate::options::Options;
use crate::overlay::Row;
use crate::response;
use crate::transform::{self, Fragment};
use crate::urls;

/// Where a list comes from and which cache entry it fills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadPlan {
    pub url: String,
    pub cache_key: String,
}

pub trait ListHooks: Send + Sync {
    /// Options a field starts from before overrides.
    fn default_options(&self) -> Options {
        Options::default()
    }

    /// Shortest trimmed text that triggers a lookup.
    fn min_query_len(&self) -> usize {
        1
    }

    fn settle_delay(&self, len: usize) -> Duration {
        debounce::settle_delay(len)
    }

    fn list_load(&self, options: &Options, query: &str) -> Result<LoadPlan>;

    fn parse_list(&self, body: &str) -> Result<Vec<Candidate>>;

    fn filter(&self, _candidate: &Candidate, _query: &str) -> bool {
        true
    }

    /// Chance to replace a filtered list, e.g. when filtering removed everything.
    fn filter_fallback<'a>(
        &self,
        filtered: Vec<&'a Candidate>,
        _all: &'a [Candidate],
    ) -> Vec<&'a Candidate> {
        filtered
    }

    fn transform(&self, candidate: &Candidate, query: &str) -> Fragment {
        transform::standard(candidate, query)
    }

    /// Label of the "create new" row, `None` to hide it.
    fn list_show(&self, options: &Options) -> Option<String> {
        options.suggest_new_label.clone()
    }

    /// Whether highlighting `row` should open a flyout.
    fn list_select(&self, options: &Options, row: &Row) -> bool {
        options.show_flyout && row.is_enrichable()
    }
}

/// Search-as-you-type against the search service.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuggestHooks;

impl ListHooks for SuggestHooks {
    fn list_load(&self, options: &Options, query: &str) -> Result<LoadPlan> {
        Ok(LoadPlan {
            url: urls::search_url(options, query)?.into(),
            cache_key: query.to_string(),
        })
    }

    fn parse_list(&self, body: &str) -> Result<Vec<Candidate>> {
        response::parse_search(body)
    }
}

/// Pick one instance of a type from a locally filtered enumeration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectHooks;

impl ListHooks for SelectHooks {
    fn default_options(&self) -> Options {
        Options {
            show_flyout: false,
            ..Options::default()
        }
    }

    fn min_query_len(&self) -> usize {
        0
    }

    fn settle_delay(&self, _len: usize) -> Duration {
        Duration::ZERO
    }

    /// One enumeration per field, whatever was typed.
    fn list_load(&self, options: &Options, _query: &str) -> Result<LoadPlan> {
        Ok(LoadPlan {
            url: urls::mqlread_url(options)?.into(),
            cache_key: String::new(),
        })
    }

    fn parse_list(&self, body: &str) -> Result<Vec<Candidate>> {
        response::parse_mqlread(body)
    }

    /// Case-insensitive prefix match on the name.
    fn filter(&self, candidate: &Candidate, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        candidate
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().starts_with(&query.to_lowercase()))
    }

    fn filter_fallback<'a>(
        &self,
        filtered: Vec<&'a Candidate>,
        all: &'a [Candidate],
    ) -> Vec<&'a Candidate> {
        if filtered.is_empty() {
            all.iter().collect()
        } else {
            filtered
        }
    }

    fn transform(&self, candidate: &Candidate, _query: &str) -> Fragment {
        transform::name_only(candidate)
    }

    fn list_show(&self, _options: &Options) -> Option<String> {
        None
    }

    fn list_select(&self, _options: &Options, _row: &Row) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionsOverride;

    #[test]
    fn suggest_keys_cache_by_query() {
        let plan = SuggestHooks.list_load(&Options::default(), "fil").unwrap();
        assert_eq!(plan.cache_key, "fil");
        assert!(plan.url.contains("query=fil"));
    }

    #[test]
    fn select_uses_one_cache_entry() {
        let o = SelectHooks.default_options();
        let a = SelectHooks.list_load(&o, "al").unwrap();
        let b = SelectHooks.list_load(&o, "ark").unwrap();
        assert_eq!(a, b);
        assert!(a.url.contains("/api/service/mqlread"));
    }

    #[test]
    fn select_filter_is_prefix_and_falls_back_to_everything() {
        let all = vec![
            Candidate::new("/en/alabama", "Alabama"),
            Candidate::new("/en/alaska", "Alaska"),
            Candidate::new("/en/texas", "Texas"),
        ];
        let kept: Vec<_> = all.iter().filter(|c| SelectHooks.filter(c, "ALA")).collect();
        assert_eq!(kept.len(), 2);
        // "xas" is not a prefix of anything
        let none: Vec<_> = all.iter().filter(|c| SelectHooks.filter(c, "xas")).collect();
        assert_eq!(SelectHooks.filter_fallback(none, &all).len(), 3);
    }

    #[test]
    fn select_never_offers_new_rows_or_flyouts() {
        let o = SelectHooks
            .default_options()
            .merged(OptionsOverride::from_json(r#"{"suggestNewLabel": "new"}"#).unwrap());
        assert_eq!(SelectHooks.list_show(&o), None);
        assert!(!SelectHooks.list_select(&o, &Row::Candidate(Candidate::new("/a", "A"))));
        assert_eq!(SelectHooks.settle_delay(5), Duration::ZERO);
    }

    #[test]
    fn suggest_flyout_depends_on_option_and_row() {
        let row = Row::Candidate(Candidate::new("/a", "A"));
        let mut o = Options::default();
        assert!(SuggestHooks.list_select(&o, &row));
        assert!(!SuggestHooks.list_select(&o, &Row::NoMatches));
        o.show_flyout = false;
        assert!(!SuggestHooks.list_select(&o, &row));
    }
}
