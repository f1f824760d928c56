//! Tokenizing response bodies into entries.

use crate::error::{Error, Result};
use crate::escape::{split_unescaped, splitn_unescaped, trim_escaped, unescape};
use crate::frame::{Frame, extract_frame};

const ENTRY_SEPARATOR: char = ';';
const KEY_SEPARATOR: char = ':';

/// One `KEY[:VALUE]` item of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    raw_value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw_value: raw_value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value as it appeared on the wire, escape pairs included.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The unescaped value. Bare keys have an empty value.
    pub fn value(&self) -> Result<String> {
        unescape(&self.raw_value)
    }

    /// Split the value at unescaped `sep` into at most `n` unescaped,
    /// trimmed parts.
    pub fn split_value(&self, sep: char, n: usize) -> Result<Vec<String>> {
        splitn_unescaped(&self.raw_value, sep, n)
            .into_iter()
            .map(|part| unescape(trim_escaped(part)))
            .collect()
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Split a frame body into entries. Empty entries are skipped.
pub fn tokenize(body: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in split_unescaped(body, ENTRY_SEPARATOR) {
        let item = trim_escaped(item);
        if item.is_empty() {
            continue;
        }
        let trailing_escapes = item.chars().rev().take_while(|&c| c == '\\').count();
        if trailing_escapes % 2 == 1 {
            return Err(Error::DanglingEscape);
        }
        let mut parts = splitn_unescaped(item, KEY_SEPARATOR, 2).into_iter();
        let key = parts.next().map(trim_escaped).unwrap_or_default();
        let raw_value = parts.next().map(trim_escaped).unwrap_or_default();
        if !is_valid_key(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }
        entries.push(Entry::new(key, raw_value));
    }
    Ok(entries)
}

/// A tokenized response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: String,
    entries: Vec<Entry>,
}

impl Response {
    pub fn new(code: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            code: code.into(),
            entries,
        }
    }

    pub fn from_frame(frame: &Frame) -> Result<Self> {
        Ok(Self {
            code: frame.code().to_string(),
            entries: tokenize(frame.body())?,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// All entries with `key`, in wire order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Extract and tokenize the `code` response frame contained in `text`.
pub fn parse_response(text: &str, code: &str) -> Result<Response> {
    let frame = extract_frame(text, code)?;
    Response::from_frame(&frame)
}
