// ABOUTME: Null-safe list and string wrappers whose out-of-range access yields None.
// ABOUTME: Indices follow Python conventions: negative values count from the end.

//! Null-safe containers.
//!
//! Extraction code reads optional positions all the time ("the third cell,
//! if there is one"). `MagicList` and `MagicStr` behave like ordinary
//! read-only sequences except that indexing and slicing past the bounds
//! degrade to `None` or an empty value instead of panicking.

use std::fmt;
use std::ops::{Bound, Deref, RangeBounds};

use serde::{Deserialize, Serialize};

/// Resolves a possibly negative index against `len`.
fn resolve_index(index: isize, len: usize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    let idx = if index < 0 { index + len } else { index };
    if (0..len).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}

/// Turns a range over possibly negative indices into clamped `start..end` offsets.
fn clamp_range<R: RangeBounds<isize>>(range: &R, len: usize) -> (usize, usize) {
    let len_i = isize::try_from(len).unwrap_or(isize::MAX);
    let normalize = |bound: isize| -> isize {
        let b = if bound < 0 { bound + len_i } else { bound };
        b.clamp(0, len_i)
    };

    let start = match range.start_bound() {
        Bound::Included(&s) => normalize(s),
        Bound::Excluded(&s) => normalize(s).saturating_add(1).min(len_i),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => {
            let e = if e < 0 { e + len_i } else { e };
            e.saturating_add(1).clamp(0, len_i)
        }
        Bound::Excluded(&e) => normalize(e),
        Bound::Unbounded => len_i,
    };

    if start >= end {
        (0, 0)
    } else {
        (start as usize, end as usize)
    }
}

/// A list whose lookups return `None` instead of panicking.
///
/// ```
/// use sift_core::MagicList;
///
/// let list = MagicList::from(vec!["x"]);
/// assert_eq!(list.get(0), Some(&"x"));
/// assert_eq!(list.get(5), None);
/// assert_eq!(list.get(-1), Some(&"x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MagicList<T> {
    items: Vec<T>,
}

impl<T> Default for MagicList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> MagicList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the element at `index`, counting from the end when negative.
    pub fn get(&self, index: isize) -> Option<&T> {
        resolve_index(index, self.items.len()).and_then(|i| self.items.get(i))
    }

    /// Returns the element at `index`, or `default` when out of range.
    pub fn get_or<'a>(&'a self, index: isize, default: &'a T) -> &'a T {
        self.get(index).unwrap_or(default)
    }

    /// Removes and returns the element at `index`; `None` when out of range.
    pub fn pop(&mut self, index: isize) -> Option<T> {
        let idx = resolve_index(index, self.items.len())?;
        Some(self.items.remove(idx))
    }

    /// Appends an element.
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the wrapper and returns the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> MagicList<T> {
    /// Returns a copy of the elements in `range`, clamped to the list bounds.
    ///
    /// `list.slice(1..)`, `list.slice(..-1)` and `list.slice(10..20)` never panic;
    /// out-of-range portions are simply dropped.
    pub fn slice<R: RangeBounds<isize>>(&self, range: R) -> MagicList<T> {
        let (start, end) = clamp_range(&range, self.items.len());
        MagicList::from(self.items[start..end].to_vec())
    }
}

impl<T> From<Vec<T>> for MagicList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for MagicList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for MagicList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for MagicList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MagicList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A string whose character lookups return `None` instead of panicking.
///
/// Indexing is by Unicode scalar value, so `MagicStr::from("李四").get(0)`
/// is `Some('李')`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MagicStr(String);

impl MagicStr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the character at `index`, counting from the end when negative.
    pub fn get(&self, index: isize) -> Option<char> {
        let count = self.0.chars().count();
        let idx = resolve_index(index, count)?;
        self.0.chars().nth(idx)
    }

    /// Returns the character at `index`, or `default` when out of range.
    pub fn get_or(&self, index: isize, default: char) -> char {
        self.get(index).unwrap_or(default)
    }

    /// Returns the characters in `range`, clamped to the string bounds.
    pub fn slice<R: RangeBounds<isize>>(&self, range: R) -> MagicStr {
        let (start, end) = clamp_range(&range, self.0.chars().count());
        MagicStr(self.0.chars().skip(start).take(end - start).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for MagicStr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MagicStr {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MagicStr {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<MagicStr> for String {
    fn from(value: MagicStr) -> Self {
        value.0
    }
}

impl fmt::Display for MagicStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_out_of_range_is_none() {
        let list = MagicList::from(vec!["x"]);
        assert_eq!(list.get(5), None);
        assert_eq!(list.get(-2), None);
    }

    #[test]
    fn test_list_negative_index() {
        let list = MagicList::from(vec![1, 2, 3]);
        assert_eq!(list.get(-1), Some(&3));
        assert_eq!(list.get(-3), Some(&1));
    }

    #[test]
    fn test_list_get_or_default() {
        let list = MagicList::from(vec![1, 2]);
        assert_eq!(*list.get_or(1, &9), 2);
        assert_eq!(*list.get_or(7, &9), 9);
    }

    #[test]
    fn test_list_slice_clamps() {
        let list = MagicList::from(vec![1, 2, 3, 4]);
        assert_eq!(list.slice(1..).into_vec(), vec![2, 3, 4]);
        assert_eq!(list.slice(..-1).into_vec(), vec![1, 2, 3]);
        assert_eq!(list.slice(2..100).into_vec(), vec![3, 4]);
        assert_eq!(list.slice(10..20).into_vec(), Vec::<i32>::new());
        assert_eq!(list.slice(3..1).into_vec(), Vec::<i32>::new());
        assert_eq!(list.slice(-2..=-1).into_vec(), vec![3, 4]);
        assert_eq!(list.slice(-100..2).into_vec(), vec![1, 2]);
    }

    #[test]
    fn test_list_pop() {
        let mut list = MagicList::from(vec!["a", "b"]);
        assert_eq!(list.pop(5), None);
        assert_eq!(list.pop(-1), Some("b"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.pop(0), Some("a"));
        assert_eq!(list.pop(-1), None);
    }

    #[test]
    fn test_list_serializes_as_array() {
        let list = MagicList::from(vec!["a", "b"]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_str_char_lookup() {
        let s = MagicStr::from("python");
        assert_eq!(s.get(0), Some('p'));
        assert_eq!(s.get(10), None);
        assert_eq!(s.get(-1), Some('n'));
        assert_eq!(s.get_or(10, '?'), '?');
    }

    #[test]
    fn test_str_indexes_by_character() {
        let s = MagicStr::from("李四");
        assert_eq!(s.get(0), Some('李'));
        assert_eq!(s.get(1), Some('四'));
        assert_eq!(s.get(2), None);
    }

    #[test]
    fn test_str_slice_clamps() {
        let s = MagicStr::from("欧阳修文");
        assert_eq!(s.slice(..2).as_str(), "欧阳");
        assert_eq!(s.slice(2..50).as_str(), "修文");
        assert_eq!(s.slice(9..).as_str(), "");
    }

    #[test]
    fn test_str_derefs_to_str() {
        let s = MagicStr::from("  padded ");
        assert_eq!(s.trim(), "padded");
        assert!(s.contains("pad"));
    }
}
