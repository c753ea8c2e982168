//! Source location maps for YAML documents.
//!
//! For every value in a document, the computed map pairs the value's JSON
//! Pointer with the exact span (line, column, absolute character offset) it
//! occupies in the source text, so diagnostics can point at real locations
//! instead of re-parsed data.

// public modules
pub mod error;
pub mod map;
pub mod scanning;
pub mod token;
pub mod types;

// public uses
pub use error::{Error, Expected, Result};
pub use map::{calculate, compute};
pub use scanning::Scanner;
pub use token::{Token, TokenKind, TokenSource};
pub use types::{Entry, Location, Pointer, SourceMap};
