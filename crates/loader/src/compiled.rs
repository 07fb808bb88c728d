// ABOUTME: Pre-compiled CSS selector cache shared by every HTML loader.
// ABOUTME: Invalid selectors are cached as None so they are parsed only once.

//! Selector caching for repeated DOM queries.
//!
//! Field specs run the same handful of selectors against every page, so
//! each selector string is compiled once and reused.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::debug;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(err) => {
            debug!(selector = css, error = ?err, "invalid CSS selector");
            None
        }
    }
}

/// Gets or compiles a CSS selector; `None` when the selector is invalid.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = compile(css);
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(css.to_string())
        .or_insert(compiled)
        .clone()
}

/// Warms the cache with a batch of selectors.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    for css in selectors {
        let css = css.as_ref();
        if !cache.contains_key(css) {
            cache.insert(css.to_string(), compile(css));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::RecordSpec;

    fn cached(css: &str) -> Option<bool> {
        let cache = SELECTOR_CACHE.read().unwrap();
        cache.get(css).map(Option::is_some)
    }

    #[test]
    fn test_row_selector_is_cached() {
        assert!(get_or_compile("table.staff tr").is_some());
        assert_eq!(cached("table.staff tr"), Some(true));
    }

    #[test]
    fn test_invalid_selector_is_cached_as_none() {
        assert!(get_or_compile("td:nth-child(").is_none());
        assert_eq!(cached("td:nth-child("), Some(false));
        assert!(get_or_compile("td:nth-child(").is_none());
    }

    #[test]
    fn test_record_spec_warms_css_without_suffixes() {
        let spec = RecordSpec::from_json(
            r#"{
              "fields": {
                "name": {"query": "td.warm-name::text"},
                "bio": {"query": "td.warm-bio ::text"},
                "link": {"query": "a.warm-link::attr(href), b.warm-link::text"},
                "self": {"query": "::text"}
              }
            }"#,
        )
        .unwrap();
        spec.precompile_selectors();

        assert_eq!(cached("td.warm-name"), Some(true));
        assert_eq!(cached("td.warm-name::text"), None);
        assert_eq!(cached("td.warm-bio"), Some(true));
        assert_eq!(cached("a.warm-link"), Some(true));
        assert_eq!(cached("b.warm-link"), Some(true));
        assert_eq!(cached(""), None);
    }
}
