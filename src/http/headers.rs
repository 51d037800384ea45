use std::collections::HashMap;
use std::collections::hash_map;

use crate::http::error::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Punctuation allowed in a header name besides ASCII letters and digits.
const TOKEN_PUNCTUATION: &[u8] = b"!#$%&'*+-.^_`|~";

/// Case-insensitive collection of HTTP header fields.
///
/// Fields are keyed by the lower-cased name, so every lookup is
/// case-insensitive. A name parsed twice keeps both values joined by `", "`
/// in arrival order.
///
/// Parsed names are lower-cased. Names added with [`set`](Self::set) or
/// [`append`](Self::append) keep the spelling they were first given, and
/// that spelling is what [`iter`](Self::iter) and the response writer emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    fields: HashMap<String, Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the front of `buf`.
    ///
    /// Returns `(consumed, done)`:
    /// - `(0, false)` when `buf` holds no complete line yet; call again with more bytes.
    /// - `(2, true)` when the line is empty, which terminates the header block.
    /// - `(line_len + 2, false)` after storing one field.
    ///
    /// A malformed line consumes nothing and leaves the table untouched.
    pub fn parse_next(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = find_crlf(buf) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &buf[..line_end];
        let (name, value) = split_field(line)?;
        self.append(name, value);

        Ok((line_end + CRLF.len(), false))
    }

    /// Looks up a field by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    /// Sets a field, replacing any previous value and spelling.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref();
        self.fields.insert(
            name.to_ascii_lowercase(),
            Field {
                name: name.to_string(),
                value: value.into(),
            },
        );
    }

    /// Adds a value to a field, combining with an existing value as `"old, new"`.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
        let name = name.as_ref();
        match self.fields.entry(name.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let current = &mut entry.get_mut().value;
                current.push_str(", ");
                current.push_str(value.as_ref());
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Field {
                    name: name.to_string(),
                    value: value.as_ref().to_string(),
                });
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(&name.to_ascii_lowercase())
            .map(|f| f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .values()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// Splits a header line into its validated name (lower-cased) and trimmed value.
fn split_field(line: &[u8]) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::MalformedHeader(String::from_utf8_lossy(line).into_owned());

    let colon = line.iter().position(|&b| b == b':').ok_or_else(malformed)?;

    // The name must run right up to the colon: "Host : x" is rejected.
    if colon == 0 || !line[colon - 1].is_ascii_alphabetic() {
        return Err(malformed());
    }

    let raw_name = &line[..colon];
    let start = raw_name
        .iter()
        .position(|&b| b != b' ')
        .unwrap_or(raw_name.len());
    let name = &raw_name[start..];

    if !name.iter().all(|&b| is_token_char(b)) {
        return Err(malformed());
    }

    // Only ASCII survives the check above.
    let name = String::from_utf8_lossy(name).to_ascii_lowercase();
    let value = String::from_utf8_lossy(&line[colon + 1..]).trim().to_string();

    Ok((name, value))
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || TOKEN_PUNCTUATION.contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_line_needs_more_data() {
        let mut headers = HeaderTable::new();
        let (n, done) = headers.parse_next(b"Host: local").unwrap();

        assert_eq!(n, 0);
        assert!(!done);
        assert!(headers.is_empty());
    }

    #[test]
    fn empty_line_ends_block() {
        let mut headers = HeaderTable::new();
        let (n, done) = headers.parse_next(b"\r\nbody").unwrap();

        assert_eq!(n, 2);
        assert!(done);
    }

    #[test]
    fn leading_spaces_are_stripped_from_name() {
        let mut headers = HeaderTable::new();
        let (n, _) = headers.parse_next(b"   Accept: */*\r\n").unwrap();

        assert_eq!(n, 16);
        assert_eq!(headers.get("accept"), Some("*/*"));
    }

    #[test]
    fn colon_at_line_start_is_rejected() {
        let mut headers = HeaderTable::new();
        let result = headers.parse_next(b": value\r\n");

        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[test]
    fn line_without_colon_is_rejected() {
        let mut headers = HeaderTable::new();
        let result = headers.parse_next(b"BrokenHeader\r\n\r\n");

        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[test]
    fn set_keeps_spelling_for_output() {
        let mut headers = HeaderTable::new();
        headers.set("Content-Length", "3");
        headers.append("X-Trace", "a");
        headers.append("x-trace", "b");

        let mut fields: Vec<_> = headers.iter().collect();
        fields.sort();
        assert_eq!(fields, vec![("Content-Length", "3"), ("X-Trace", "a, b")]);
        assert_eq!(headers.get("CONTENT-LENGTH"), Some("3"));
    }
}
