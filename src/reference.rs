//! JSON Reference parsing and pointer traversal.
//!
//! A reference has the form `[url]#[/pointer/segments]`. Segments are plain
//! property names matched exactly; the `~0`/`~1` escapes of RFC 6901 are not
//! interpreted.

use serde_json::Value;

use crate::loader::is_url;

/// A parsed `$ref` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The trimmed reference as written.
    pub raw: String,
    /// Document part before the first `#`; empty for same-document refs.
    pub url: String,
    /// Non-empty pointer segments in traversal order.
    pub pointer: Vec<String>,
}

impl Reference {
    /// Parse a reference string.
    ///
    /// Surrounding whitespace is ignored. The string is split on the first
    /// `#`; empty pointer segments (leading, trailing or doubled `/`) are
    /// dropped.
    pub fn parse(reference: &str) -> Self {
        let raw = reference.trim();
        let (url, hash) = raw.split_once('#').unwrap_or((raw, ""));
        let pointer = hash
            .split('/')
            .filter(|segment| !segment.trim().is_empty())
            .map(String::from)
            .collect();

        Self {
            raw: raw.to_string(),
            url: url.to_string(),
            pointer,
        }
    }

    /// True when the reference points into the document that contains it.
    pub fn is_same_document(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// True when the document part carries a scheme (`scheme://...`).
    pub fn is_remote(&self) -> bool {
        is_url(&self.url)
    }
}

/// Outcome of walking a pointer through a document.
#[derive(Debug, PartialEq)]
pub enum Walk<'a> {
    Found(&'a Value),
    /// The named segment had nothing behind it.
    Missing { segment: &'a str },
}

/// Follow `pointer` from `root`, one property lookup per segment.
///
/// Objects are indexed by key; arrays accept a segment that parses as an
/// index. Anything else ends the walk at the offending segment.
pub fn walk<'a>(root: &'a Value, pointer: &'a [String]) -> Walk<'a> {
    let mut current = root;
    for segment in pointer {
        let next = match current {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Walk::Missing { segment },
        }
    }
    Walk::Found(current)
}
