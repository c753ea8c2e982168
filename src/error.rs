// std imports
use std::fmt;

// third-party imports
use thiserror::Error;

// local imports
use crate::types::Location;

// ---

/// Error is an error which may occur when computing a source map.
///
/// The first two variants report structural problems in the token stream
/// encountered by the walk, the rest are produced by the bundled scanner.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("expected {expected} but found {found} at {location}")]
    UnexpectedToken {
        expected: Expected,
        found: String,
        location: Location,
    },
    #[error("unexpected end of token stream while expecting {expected}")]
    UnexpectedEnd { expected: Expected },
    #[error("found character {ch:?} that cannot start any token at {location}")]
    UnexpectedCharacter { ch: char, location: Location },
    #[error("{construct} are not supported at {location}")]
    UnsupportedSyntax {
        construct: &'static str,
        location: Location,
    },
    #[error("unterminated quoted scalar starting at {location}")]
    UnterminatedScalar { location: Location },
    #[error("invalid escape sequence at {location}")]
    InvalidEscape { location: Location },
    #[error("sequence entries are not allowed at {location}")]
    MisplacedBlockEntry { location: Location },
    #[error("mapping values are not allowed at {location}")]
    MisplacedMappingValue { location: Location },
    #[error("could not find expected ':' for the key at {location}")]
    MissingMappingValue { location: Location },
}

// ---

/// What the walk was looking for when it failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expected {
    SequenceStart,
    SequenceEnd,
    MappingStart,
    MappingEnd,
    Key,
    Value,
    Scalar,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequenceStart => f.write_str("sequence start"),
            Self::SequenceEnd => f.write_str("sequence end"),
            Self::MappingStart => f.write_str("mapping start"),
            Self::MappingEnd => f.write_str("mapping end"),
            Self::Key => f.write_str("key"),
            Self::Value => f.write_str("value"),
            Self::Scalar => f.write_str("scalar"),
        }
    }
}

// ---

/// Result is an alias for standard result with bound Error type.
pub type Result<T> = std::result::Result<T, Error>;
