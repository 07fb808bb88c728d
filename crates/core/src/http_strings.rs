// ABOUTME: Helpers for the raw HTTP strings scrapers copy out of browser dev tools.
// ABOUTME: Header/cookie/form conversions, padded URL-safe base64 decoding, random passwords.

use std::collections::BTreeMap;
use std::fmt::Display;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use crate::error::{Result, SiftError};

/// A cookie value; values holding `|`-separated `k=v` pairs become nested maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    Plain(String),
    Nested(BTreeMap<String, String>),
}

/// Splits `item` at the first `sep`; without one, the whole item is both key and value.
fn pair(item: &str, sep: char) -> (String, String) {
    match item.split_once(sep) {
        Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
        None => (item.trim().to_string(), item.trim().to_string()),
    }
}

/// Parses pasted request headers (`Key: value` per line). Blank lines are skipped.
pub fn header_to_dict(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| pair(line, ':'))
        .collect()
}

/// Parses a `Cookie` header (`a=1; b=2`).
pub fn cookie_to_dict(raw: &str) -> BTreeMap<String, CookieValue> {
    raw.split(';')
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let (key, value) = pair(item, '=');
            if value.contains('|') {
                let nested = value.split('|').map(|part| pair(part, '=')).collect();
                (key, CookieValue::Nested(nested))
            } else {
                (key, CookieValue::Plain(value))
            }
        })
        .collect()
}

/// Joins pairs as `k=v&k2=v2`, optionally sorted by key. Values are not escaped.
pub fn form_encode<I, K, V>(pairs: I, sort: bool) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut items: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
        .collect();
    if sort {
        items.sort_by(|a, b| a.0.cmp(&b.0));
    }
    items
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses `k=v&k2=v2`; any item without `=` makes the whole decode fail.
pub fn form_decode(raw: &str) -> Option<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for item in raw.split('&').filter(|item| !item.is_empty()) {
        let mut parts = item.split('=');
        let key = parts.next().unwrap_or_default();
        match parts.next() {
            Some(value) => {
                out.insert(key.to_string(), value.to_string());
            }
            None => {
                warn!(item, "form item has no '=', giving up");
                return None;
            }
        }
    }
    Some(out)
}

/// Decodes URL-safe base64, restoring any stripped `=` padding, into UTF-8.
pub fn base64_decode(encoded: &str) -> Result<String> {
    let mut padded = encoded.trim().to_string();
    let rem = padded.len() % 4;
    if rem != 0 {
        padded.push_str(&"=".repeat(4 - rem));
    }
    let bytes = URL_SAFE.decode(padded.as_bytes()).map_err(SiftError::decode)?;
    String::from_utf8(bytes).map_err(SiftError::decode)
}

/// Generates an alphanumeric password.
pub fn random_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
