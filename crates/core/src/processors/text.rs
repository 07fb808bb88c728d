// ABOUTME: String processors: Strip, Split, RegexSplit, RegexFind, RegexSub and Join.
// ABOUTME: Regex-backed processors compile once at construction and match dot-all by default.

use regex::{Regex, RegexBuilder};

use super::Processor;
use crate::error::{Result, SiftError};
use crate::magic::MagicList;
use crate::value::Value;

/// Compiles `pattern` in dot-all mode, so `.` spans newlines in scraped text.
fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SiftError::pattern(pattern, e))
}

/// Trims a character set (whitespace by default) from both ends.
///
/// Non-string values pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Strip {
    chars: Option<String>,
}

impl Strip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips any of `chars` instead of whitespace.
    pub fn chars(chars: impl Into<String>) -> Self {
        Self {
            chars: Some(chars.into()),
        }
    }

    pub fn strip<'a>(&self, s: &'a str) -> &'a str {
        match &self.chars {
            Some(set) => s.trim_matches(|c: char| set.contains(c)),
            None => s.trim(),
        }
    }
}

impl Processor for Strip {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => Some(Value::from(self.strip(s))),
            other => Some(other.clone()),
        }
    }
}

/// Splits a string into a list.
///
/// Without a separator, splits on runs of whitespace and never yields empty
/// pieces. `max_split` limits the number of splits; the remainder is kept
/// as the final piece.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    sep: Option<String>,
    max_split: Option<usize>,
}

impl Split {
    /// Splits on whitespace runs.
    pub fn whitespace() -> Self {
        Self::default()
    }

    pub fn new(sep: impl Into<String>) -> Self {
        Self {
            sep: Some(sep.into()),
            max_split: None,
        }
    }

    pub fn max_split(mut self, max_split: usize) -> Self {
        self.max_split = Some(max_split);
        self
    }

    fn split(&self, s: &str) -> Option<Vec<String>> {
        match (&self.sep, self.max_split) {
            (Some(sep), _) if sep.is_empty() => None,
            (Some(sep), Some(n)) => Some(
                s.splitn(n.saturating_add(1), sep.as_str())
                    .map(String::from)
                    .collect(),
            ),
            (Some(sep), None) => Some(s.split(sep.as_str()).map(String::from).collect()),
            (None, Some(n)) => Some(split_whitespace_n(s, n)),
            (None, None) => Some(s.split_whitespace().map(String::from).collect()),
        }
    }
}

/// Whitespace split with a split limit; the remainder keeps its trailing text.
fn split_whitespace_n(s: &str, max_split: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if out.len() == max_split {
            out.push(rest.to_string());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(pos) => {
                out.push(rest[..pos].to_string());
                rest = rest[pos..].trim_start();
            }
            None => {
                out.push(rest.to_string());
                break;
            }
        }
    }
    out
}

impl Processor for Split {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => self.split(s).map(Value::list),
            _ => Some(Value::List(MagicList::new())),
        }
    }
}

/// Splits a string on a regular expression.
#[derive(Debug, Clone)]
pub struct RegexSplit {
    regex: Regex,
    max_split: Option<usize>,
}

impl RegexSplit {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: compile(pattern)?,
            max_split: None,
        })
    }

    pub fn max_split(mut self, max_split: usize) -> Self {
        self.max_split = Some(max_split);
        self
    }

    /// Splits `s`, emitting the text of each capture group between the
    /// pieces it separates. Unmatched groups yield empty strings.
    pub fn split<'s>(&self, s: &'s str) -> Vec<&'s str> {
        let mut pieces = Vec::new();
        let mut last = 0;
        let limit = self.max_split.unwrap_or(usize::MAX);
        for caps in self.regex.captures_iter(s).take(limit) {
            let Some(whole) = caps.get(0) else { continue };
            pieces.push(&s[last..whole.start()]);
            pieces.extend(
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or("", |m| m.as_str())),
            );
            last = whole.end();
        }
        pieces.push(&s[last..]);
        pieces
    }
}

impl Processor for RegexSplit {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => Some(Value::list(self.split(s))),
            other => Some(other.clone()),
        }
    }
}

/// Returns every non-overlapping match as a list.
///
/// With no capture group each item is the whole match; with one group it is
/// the group's text; with several groups each item is a list of the groups.
/// Unmatched optional groups yield empty strings. No match, or a non-string
/// input, yields an empty list rather than `None`.
#[derive(Debug, Clone)]
pub struct RegexFind {
    regex: Regex,
}

impl RegexFind {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: compile(pattern)?,
        })
    }

    /// Finds all matches in `s` with the group semantics described above.
    pub fn find_all(&self, s: &str) -> MagicList<Value> {
        match self.regex.captures_len() {
            1 => self
                .regex
                .find_iter(s)
                .map(|m| Value::from(m.as_str()))
                .collect(),
            2 => self
                .regex
                .captures_iter(s)
                .map(|caps| Value::from(caps.get(1).map_or("", |m| m.as_str())))
                .collect(),
            _ => self
                .regex
                .captures_iter(s)
                .map(|caps| {
                    Value::list(
                        caps.iter()
                            .skip(1)
                            .map(|g| g.map_or("", |m| m.as_str()))
                            .collect::<Vec<_>>(),
                    )
                })
                .collect(),
        }
    }

    /// Convenience for the common "first match or nothing" lookup.
    pub fn first(&self, s: &str) -> Option<Value> {
        self.find_all(s).into_iter().next()
    }
}

impl Processor for RegexFind {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => Some(Value::List(self.find_all(s))),
            _ => Some(Value::List(MagicList::new())),
        }
    }
}

/// Replaces regex matches.
///
/// `replacement` uses the regex crate's `$1` / `${name}` syntax. A `count`
/// of zero replaces every match. Non-string input yields an empty string.
#[derive(Debug, Clone)]
pub struct RegexSub {
    regex: Regex,
    replacement: String,
    count: usize,
}

impl RegexSub {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            regex: compile(pattern)?,
            replacement: replacement.into(),
            count: 0,
        })
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

impl Processor for RegexSub {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => {
                let replaced = self
                    .regex
                    .replacen(s, self.count, self.replacement.as_str());
                Some(Value::from(replaced.into_owned()))
            }
            _ => Some(Value::from("")),
        }
    }
}

/// Joins the non-empty string elements of a list with a separator.
///
/// A plain string is returned as-is. Any non-string element (or any other
/// input shape) makes the join fail and yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Join {
    separator: String,
}

impl Join {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn join(&self, values: &MagicList<Value>) -> Option<String> {
        let parts = values
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| v.as_str())
            .collect::<Option<Vec<&str>>>()?;
        Some(parts.join(&self.separator))
    }
}

impl Processor for Join {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Str(s) => Some(Value::from(s.as_str())),
            Value::List(items) => self.join(items).map(Value::from),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_strip_default_whitespace() {
        assert_eq!(Strip::new().apply(&s("  hi \n")), Some(s("hi")));
    }

    #[test]
    fn test_strip_custom_chars() {
        assert_eq!(Strip::chars("-*").apply(&s("*-hi-*")), Some(s("hi")));
    }

    #[test]
    fn test_strip_is_idempotent() {
        let strip = Strip::new();
        let once = strip.apply(&s("  a b  ")).unwrap();
        let twice = strip.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strip_passes_non_strings_through() {
        assert_eq!(Strip::new().apply(&Value::Int(3)), Some(Value::Int(3)));
    }

    #[test]
    fn test_split_whitespace() {
        assert_eq!(
            Split::whitespace().apply(&s("  a  b c ")),
            Some(Value::list(["a", "b", "c"]))
        );
    }

    #[test]
    fn test_split_whitespace_with_limit_keeps_remainder() {
        assert_eq!(
            Split::whitespace().max_split(1).apply(&s("a b  c ")),
            Some(Value::list(["a", "b  c "]))
        );
    }

    #[test]
    fn test_split_separator_keeps_empty_pieces() {
        assert_eq!(
            Split::new("/").apply(&s("a//b")),
            Some(Value::list(["a", "", "b"]))
        );
        assert_eq!(
            Split::new("/").max_split(1).apply(&s("a/b/c")),
            Some(Value::list(["a", "b/c"]))
        );
    }

    #[test]
    fn test_split_non_string_is_empty_list() {
        assert_eq!(
            Split::new(",").apply(&Value::Int(1)),
            Some(Value::List(MagicList::new()))
        );
    }

    #[test]
    fn test_split_empty_separator_fails() {
        assert_eq!(Split::new("").apply(&s("abc")), None);
    }

    #[test]
    fn test_regex_split() {
        let p = RegexSplit::new(r"[,;]\s*").unwrap();
        assert_eq!(p.apply(&s("a, b;c")), Some(Value::list(["a", "b", "c"])));
        let limited = RegexSplit::new(r",").unwrap().max_split(1);
        assert_eq!(limited.apply(&s("a,b,c")), Some(Value::list(["a", "b,c"])));
    }

    #[test]
    fn test_regex_split_keeps_captured_separators() {
        let p = RegexSplit::new(r"(,)").unwrap();
        assert_eq!(p.apply(&s("a,b")), Some(Value::list(["a", ",", "b"])));

        let optional = RegexSplit::new(r"(-)?\|").unwrap();
        assert_eq!(optional.split("x-|y|z"), vec!["x", "-", "y", "", "z"]);

        let limited = RegexSplit::new(r"\s*([;,])\s*").unwrap().max_split(1);
        assert_eq!(limited.split("a ; b, c"), vec!["a", ";", "b, c"]);
    }

    #[test]
    fn test_regex_find_no_match_is_empty_list() {
        let p = RegexFind::new(r"\d+").unwrap();
        assert_eq!(p.apply(&s("abc")), Some(Value::List(MagicList::new())));
    }

    #[test]
    fn test_regex_find_whole_matches() {
        let p = RegexFind::new(r"\d+").unwrap();
        assert_eq!(p.apply(&s("a1b22c333")), Some(Value::list(["1", "22", "333"])));
    }

    #[test]
    fn test_regex_find_single_group() {
        let p = RegexFind::new(r"id=(\w+)").unwrap();
        assert_eq!(p.apply(&s("id=ab id=cd")), Some(Value::list(["ab", "cd"])));
    }

    #[test]
    fn test_regex_find_multiple_groups() {
        let p = RegexFind::new(r"(\w)=(\d)").unwrap();
        assert_eq!(
            p.apply(&s("a=1 b=2")),
            Some(Value::list([Value::list(["a", "1"]), Value::list(["b", "2"])]))
        );
    }

    #[test]
    fn test_regex_find_dot_matches_newline() {
        let p = RegexFind::new(r"<b>(.*?)</b>").unwrap();
        assert_eq!(p.first("<b>line\nbreak</b>"), Some(s("line\nbreak")));
    }

    #[test]
    fn test_regex_find_non_string_is_empty_list() {
        let p = RegexFind::new(r"\d").unwrap();
        assert_eq!(p.apply(&Value::Int(5)), Some(Value::List(MagicList::new())));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = RegexFind::new("(unclosed").unwrap_err();
        assert!(matches!(err, SiftError::Pattern { .. }));
    }

    #[test]
    fn test_regex_sub() {
        let p = RegexSub::new(r"\s+", " ").unwrap();
        assert_eq!(p.apply(&s("a \n\t b   c")), Some(s("a b c")));
        let once = RegexSub::new(r"\d", "#").unwrap().count(1);
        assert_eq!(once.apply(&s("1 2 3")), Some(s("# 2 3")));
        let groups = RegexSub::new(r"(\d+)-(\d+)", "$2-$1").unwrap();
        assert_eq!(groups.apply(&s("10-20")), Some(s("20-10")));
        assert_eq!(groups.apply(&Value::Int(1)), Some(s("")));
    }

    #[test]
    fn test_join_skips_empty_elements() {
        let list = Value::list(["a", "", "b"]);
        assert_eq!(Join::new("-").apply(&list), Some(s("a-b")));
    }

    #[test]
    fn test_join_string_passes_through() {
        assert_eq!(Join::new(",").apply(&s("abc")), Some(s("abc")));
    }

    #[test]
    fn test_join_fails_on_non_string_elements() {
        let list = Value::list([Value::from("a"), Value::Int(1)]);
        assert_eq!(Join::new("").apply(&list), None);
        assert_eq!(Join::new("").apply(&Value::Int(1)), None);
    }
}
