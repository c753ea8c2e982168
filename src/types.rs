// third-party imports
use derive_more::Display;
use serde::Serialize;

// ---

/// A single point in the source text.
///
/// `line` and `column` are zero-based, `offset` is the absolute character
/// index from the start of the source. Locations taken from different source
/// texts are never meaningfully comparable.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{line}:{column}")]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    #[inline]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

// ---

/// The span a single value occupies in the source text.
///
/// For mapping values the span of the key scalar is attached as well.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Entry {
    pub value_start: Location,
    pub value_end: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_start: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_end: Option<Location>,
}

impl Entry {
    #[inline]
    pub fn new(value_start: Location, value_end: Location) -> Self {
        debug_assert!(value_start.offset <= value_end.offset);
        Self {
            value_start,
            value_end,
            key_start: None,
            key_end: None,
        }
    }

    #[inline]
    pub fn with_key(self, key_start: Location, key_end: Location) -> Self {
        Self {
            key_start: Some(key_start),
            key_end: Some(key_end),
            ..self
        }
    }
}

// ---

/// A JSON Pointer identifying a value, the empty string being the value
/// itself.
pub type Pointer = String;

/// Ordered list of pointer/span pairs covering a whole document, the entry
/// for a compound value preceding the entries of its children.
pub type SourceMap = Vec<(Pointer, Entry)>;

#[cfg(test)]
mod tests;
