// ABOUTME: The Select trait implemented by document loaders.
// ABOUTME: A selector miss is an empty list, never an error.

use crate::magic::MagicList;
use crate::value::Value;

/// A document that can answer selector queries with raw field values.
pub trait Select {
    /// Returns every value `query` matches; an empty list on a miss or an invalid query.
    fn select(&self, query: &str) -> MagicList<Value>;
}

impl<T: Select + ?Sized> Select for &T {
    fn select(&self, query: &str) -> MagicList<Value> {
        (**self).select(query)
    }
}
