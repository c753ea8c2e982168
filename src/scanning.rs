//! Tokenizer for a practical subset of YAML.
//!
//! Token kinds, token order and positions match libyaml-style scanners:
//! zero-based line and column, absolute character offsets, synthetic
//! zero-width block tokens driven by an indent stack, and key tokens
//! inserted retroactively once a `:` indicator resolves a simple key.
//!
//! Supported: flow and block collections, plain and quoted scalars limited
//! to a single line, comments, `---`/`...` document markers, CRLF breaks and
//! a leading BOM. Directives, anchors, aliases, tags, block scalars and
//! explicit-key syntax are rejected with typed errors.

// std imports
use std::{
    borrow::Cow,
    collections::{HashMap, VecDeque},
};

// third-party imports
use memchr::memchr2;

// local imports
use crate::{
    error::{Error, Result},
    token::{Token, TokenKind, TokenSource},
    types::Location,
};

// ---

/// A cursor position, tracking the byte index for slicing alongside the
/// character-based coordinates exposed in token marks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Position {
    byte: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl Position {
    #[inline]
    fn location(&self) -> Location {
        Location::new(self.line, self.column, self.offset)
    }
}

// ---

/// A scanned token that may still become a mapping key once a later `:`
/// indicator is seen.
#[derive(Clone, Copy, Debug)]
struct SimpleKey {
    token_number: usize,
    required: bool,
    pos: Position,
}

// ---

/// Single-pass scanner over one source text.
///
/// Tokens are produced lazily into an internal queue; peeking may scan ahead
/// because a pending simple key can still insert a key token in front of
/// tokens already scanned.
pub struct Scanner<'s> {
    src: &'s str,
    pos: Position,
    done: bool,
    flow_level: usize,
    tokens: VecDeque<Token<'s>>,
    tokens_taken: usize,
    indent: i64,
    indents: Vec<i64>,
    allow_simple_key: bool,
    possible_simple_keys: HashMap<usize, SimpleKey>,
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str) -> Self {
        let mut scanner = Self {
            src,
            pos: Position::default(),
            done: false,
            flow_level: 0,
            tokens: VecDeque::new(),
            tokens_taken: 0,
            indent: -1,
            indents: Vec::new(),
            allow_simple_key: true,
            possible_simple_keys: HashMap::new(),
        };
        let mark = scanner.mark();
        scanner.push(TokenKind::StreamStart, mark, mark);
        scanner
    }

    #[inline]
    fn mark(&self) -> Location {
        self.pos.location()
    }

    #[inline]
    fn push(&mut self, kind: TokenKind<'s>, start: Location, end: Location) {
        self.tokens.push_back(Token::new(kind, start, end));
    }

    #[inline]
    fn rest(&self) -> &'s str {
        &self.src[self.pos.byte..]
    }

    #[inline]
    fn ch(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    fn ch_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) {
        let mut chars = self.rest().chars();
        if let Some(ch) = chars.next() {
            self.pos.byte += ch.len_utf8();
            self.pos.offset += 1;
            if ch == '\n' || (ch == '\r' && chars.next() != Some('\n')) {
                self.pos.line += 1;
                self.pos.column = 0;
            } else if ch != '\u{feff}' {
                self.pos.column += 1;
            }
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    // --- token queue management

    fn ensure_tokens(&mut self) -> Result<()> {
        while self.need_more()? {
            self.fetch()?;
        }
        Ok(())
    }

    fn need_more(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.tokens.is_empty() {
            return Ok(true);
        }
        // The front token may still get a key token inserted before it.
        self.stale_possible_simple_keys()?;
        Ok(self.next_possible_simple_key() == Some(self.tokens_taken))
    }

    fn next_possible_simple_key(&self) -> Option<usize> {
        self.possible_simple_keys.values().map(|key| key.token_number).min()
    }

    // --- simple keys

    /// Drops pending simple keys that can no longer be resolved: a simple
    /// key must stay on one line and within 1024 characters of its start.
    fn stale_possible_simple_keys(&mut self) -> Result<()> {
        let pos = self.pos;
        for key in self.possible_simple_keys.values() {
            if (key.pos.line != pos.line || pos.offset - key.pos.offset > 1024) && key.required {
                return Err(Error::MissingMappingValue {
                    location: key.pos.location(),
                });
            }
        }
        self.possible_simple_keys
            .retain(|_, key| key.pos.line == pos.line && pos.offset - key.pos.offset <= 1024);
        Ok(())
    }

    fn save_possible_simple_key(&mut self) -> Result<()> {
        // A key is required at this position if it sits exactly at the
        // current block indent.
        let required = self.flow_level == 0 && self.indent == self.pos.column as i64;
        if self.allow_simple_key {
            self.remove_possible_simple_key()?;
            let token_number = self.tokens_taken + self.tokens.len();
            self.possible_simple_keys.insert(
                self.flow_level,
                SimpleKey {
                    token_number,
                    required,
                    pos: self.pos,
                },
            );
        }
        Ok(())
    }

    fn remove_possible_simple_key(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            if key.required {
                return Err(Error::MissingMappingValue {
                    location: key.pos.location(),
                });
            }
        }
        Ok(())
    }

    // --- block indentation

    fn unwind_indent(&mut self, column: i64) {
        // In flow context indentation is ignored.
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.mark();
            self.indent = self.indents.pop().unwrap_or(-1);
            self.push(TokenKind::BlockEnd, mark, mark);
        }
    }

    fn add_indent(&mut self, column: i64) -> bool {
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            true
        } else {
            false
        }
    }

    // --- fetching

    fn fetch(&mut self) -> Result<()> {
        self.skip_to_token();
        self.stale_possible_simple_keys()?;
        self.unwind_indent(self.pos.column as i64);

        let Some(ch) = self.ch() else {
            return self.fetch_stream_end();
        };

        match ch {
            '%' if self.pos.column == 0 => self.unsupported("directives"),
            '-' if self.check_document_indicator("---") => {
                self.fetch_document_indicator(TokenKind::DocumentStart)
            }
            '.' if self.check_document_indicator("...") => {
                self.fetch_document_indicator(TokenKind::DocumentEnd)
            }
            '[' => self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blank_or_break(self.ch_at(1)) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blank_or_break(self.ch_at(1)) => {
                self.unsupported("explicit keys")
            }
            ':' if self.flow_level > 0 || is_blank_or_break(self.ch_at(1)) => self.fetch_value(),
            '*' => self.unsupported("aliases"),
            '&' => self.unsupported("anchors"),
            '!' => self.unsupported("tags"),
            '|' | '>' if self.flow_level == 0 => self.unsupported("block scalars"),
            '\'' => self.fetch_flow_scalar(false),
            '"' => self.fetch_flow_scalar(true),
            _ if self.check_plain() => self.fetch_plain(),
            _ => Err(Error::UnexpectedCharacter {
                ch,
                location: self.mark(),
            }),
        }
    }

    fn unsupported(&self, construct: &'static str) -> Result<()> {
        Err(Error::UnsupportedSyntax {
            construct,
            location: self.mark(),
        })
    }

    /// Skips spaces, comments and line breaks; a line break in block context
    /// re-enables simple keys.
    fn skip_to_token(&mut self) {
        if self.pos.offset == 0 && self.ch() == Some('\u{feff}') {
            self.advance();
        }
        loop {
            while self.ch() == Some(' ') {
                self.advance();
            }
            if self.ch() == Some('#') {
                self.skip_comment();
            }
            if self.skip_line_break() {
                if self.flow_level == 0 {
                    self.allow_simple_key = true;
                }
            } else {
                return;
            }
        }
    }

    fn skip_comment(&mut self) {
        let bytes = self.rest().as_bytes();
        let len = memchr2(b'\r', b'\n', bytes).unwrap_or(bytes.len());
        let count = self.rest()[..len].chars().count();
        self.advance_by(count);
    }

    fn skip_line_break(&mut self) -> bool {
        match self.ch() {
            Some('\r') => {
                if self.ch_at(1) == Some('\n') {
                    self.advance();
                }
                self.advance();
                true
            }
            Some('\n') => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn check_document_indicator(&self, marker: &str) -> bool {
        self.pos.column == 0 && self.rest().starts_with(marker) && is_blank_or_break(self.ch_at(3))
    }

    fn check_plain(&self) -> bool {
        let Some(ch) = self.ch() else {
            return false;
        };
        let excluded = matches!(
            ch,
            ' ' | '\t'
                | '\r'
                | '\n'
                | '-'
                | '?'
                | ':'
                | ','
                | '['
                | ']'
                | '{'
                | '}'
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        );
        !excluded
            || (!is_blank_or_break(self.ch_at(1))
                && (ch == '-' || (self.flow_level == 0 && matches!(ch, '?' | ':'))))
    }

    fn fetch_stream_end(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        self.possible_simple_keys.clear();
        let mark = self.mark();
        self.push(TokenKind::StreamEnd, mark, mark);
        self.done = true;
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind<'s>) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let start = self.mark();
        self.advance_by(3);
        let end = self.mark();
        self.push(kind, start, end);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind<'s>) -> Result<()> {
        // `[` and `{` may themselves start a simple key.
        self.save_possible_simple_key()?;
        self.flow_level += 1;
        self.allow_simple_key = true;
        let start = self.mark();
        self.advance();
        let end = self.mark();
        self.push(kind, start, end);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind<'s>) -> Result<()> {
        self.remove_possible_simple_key()?;
        self.flow_level = self.flow_level.saturating_sub(1);
        self.allow_simple_key = false;
        let start = self.mark();
        self.advance();
        let end = self.mark();
        self.push(kind, start, end);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<()> {
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start = self.mark();
        self.advance();
        let end = self.mark();
        self.push(TokenKind::FlowEntry, start, end);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(Error::MisplacedBlockEntry {
                    location: self.mark(),
                });
            }
            if self.add_indent(self.pos.column as i64) {
                let mark = self.mark();
                self.push(TokenKind::BlockSequenceStart, mark, mark);
            }
        }
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start = self.mark();
        self.advance();
        let end = self.mark();
        self.push(TokenKind::BlockEntry, start, end);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            // The key token goes in front of the tokens scanned since the
            // key candidate, together with a block mapping start if the key
            // opens a new block mapping.
            let index = key.token_number - self.tokens_taken;
            let mark = key.pos.location();
            self.tokens.insert(index, Token::new(TokenKind::Key, mark, mark));
            if self.flow_level == 0 && self.add_indent(key.pos.column as i64) {
                self.tokens
                    .insert(index, Token::new(TokenKind::BlockMappingStart, mark, mark));
            }
            self.allow_simple_key = false;
        } else {
            if self.flow_level == 0 {
                if !self.allow_simple_key {
                    return Err(Error::MisplacedMappingValue {
                        location: self.mark(),
                    });
                }
                if self.add_indent(self.pos.column as i64) {
                    let mark = self.mark();
                    self.push(TokenKind::BlockMappingStart, mark, mark);
                }
            }
            self.allow_simple_key = self.flow_level == 0;
            self.remove_possible_simple_key()?;
        }
        let start = self.mark();
        self.advance();
        let end = self.mark();
        self.push(TokenKind::Value, start, end);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, double: bool) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = if double {
            self.scan_double_quoted()?
        } else {
            self.scan_single_quoted()?
        };
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_plain();
        self.tokens.push_back(token);
        Ok(())
    }

    // --- scalar scanning

    fn scan_plain(&mut self) -> Token<'s> {
        let start = self.mark();
        let start_byte = self.pos.byte;
        let mut end = start;
        let mut end_byte = start_byte;

        loop {
            if self.ch() == Some('#') {
                break;
            }
            let mut length = 0;
            loop {
                let ch = self.ch_at(length);
                let stop = match ch {
                    None | Some(' ' | '\t' | '\r' | '\n') => true,
                    Some(':') => {
                        let next = self.ch_at(length + 1);
                        is_blank_or_break(next)
                            || (self.flow_level > 0
                                && matches!(next, Some(',' | '[' | ']' | '{' | '}')))
                    }
                    Some(',' | '?' | '[' | ']' | '{' | '}') if self.flow_level > 0 => true,
                    _ => false,
                };
                if stop {
                    break;
                }
                length += 1;
            }
            if length == 0 {
                break;
            }
            self.advance_by(length);
            end = self.mark();
            end_byte = self.pos.byte;

            // The scalar may continue after spaces on the same line.
            let mut spaces = false;
            while self.ch() == Some(' ') {
                self.advance();
                spaces = true;
            }
            if !spaces || matches!(self.ch(), None | Some('#' | '\t' | '\r' | '\n')) {
                break;
            }
        }

        let text = &self.src[start_byte..end_byte];
        Token::new(TokenKind::Scalar(Cow::Borrowed(text)), start, end)
    }

    fn scan_single_quoted(&mut self) -> Result<Token<'s>> {
        let start = self.mark();
        self.advance();
        let text_start = self.pos.byte;
        let mut owned: Option<String> = None;

        loop {
            match self.ch() {
                None | Some('\r' | '\n') => {
                    return Err(Error::UnterminatedScalar { location: start });
                }
                Some('\'') => {
                    if self.ch_at(1) == Some('\'') {
                        if owned.is_none() {
                            owned = Some(self.src[text_start..self.pos.byte].to_owned());
                        }
                        if let Some(buf) = owned.as_mut() {
                            buf.push('\'');
                        }
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(ch) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(ch);
                    }
                    self.advance();
                }
            }
        }

        let content_end = self.pos.byte;
        self.advance();
        let end = self.mark();
        let text = match owned {
            Some(text) => Cow::Owned(text),
            None => Cow::Borrowed(&self.src[text_start..content_end]),
        };
        Ok(Token::new(TokenKind::Scalar(text), start, end))
    }

    fn scan_double_quoted(&mut self) -> Result<Token<'s>> {
        let start = self.mark();
        self.advance();
        let text_start = self.pos.byte;
        let mut owned: Option<String> = None;

        loop {
            match self.ch() {
                None | Some('\r' | '\n') => {
                    return Err(Error::UnterminatedScalar { location: start });
                }
                Some('"') => break,
                Some('\\') => {
                    if owned.is_none() {
                        owned = Some(self.src[text_start..self.pos.byte].to_owned());
                    }
                    let escape = self.mark();
                    self.advance();
                    let decoded = match self.ch() {
                        Some(ch @ ('x' | 'u' | 'U')) => {
                            let width = match ch {
                                'x' => 2,
                                'u' => 4,
                                _ => 8,
                            };
                            self.advance();
                            self.scan_hex(width, escape)?
                        }
                        Some(ch) => {
                            let decoded = match ch {
                                '0' => '\0',
                                'a' => '\x07',
                                'b' => '\x08',
                                't' | '\t' => '\t',
                                'n' => '\n',
                                'v' => '\x0b',
                                'f' => '\x0c',
                                'r' => '\r',
                                'e' => '\x1b',
                                ' ' => ' ',
                                '"' => '"',
                                '\\' => '\\',
                                '/' => '/',
                                'N' => '\u{85}',
                                '_' => '\u{a0}',
                                'L' => '\u{2028}',
                                'P' => '\u{2029}',
                                _ => return Err(Error::InvalidEscape { location: escape }),
                            };
                            self.advance();
                            decoded
                        }
                        None => return Err(Error::UnterminatedScalar { location: start }),
                    };
                    if let Some(buf) = owned.as_mut() {
                        buf.push(decoded);
                    }
                }
                Some(ch) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(ch);
                    }
                    self.advance();
                }
            }
        }

        let content_end = self.pos.byte;
        self.advance();
        let end = self.mark();
        let text = match owned {
            Some(text) => Cow::Owned(text),
            None => Cow::Borrowed(&self.src[text_start..content_end]),
        };
        Ok(Token::new(TokenKind::Scalar(text), start, end))
    }

    fn scan_hex(&mut self, width: usize, escape: Location) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..width {
            let Some(digit) = self.ch().and_then(|ch| ch.to_digit(16)) else {
                return Err(Error::InvalidEscape { location: escape });
            };
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code).ok_or(Error::InvalidEscape { location: escape })
    }
}

impl<'s> TokenSource<'s> for Scanner<'s> {
    fn peek(&mut self) -> Result<Option<&Token<'s>>> {
        self.ensure_tokens()?;
        Ok(self.tokens.front())
    }

    fn take(&mut self) -> Result<Option<Token<'s>>> {
        self.ensure_tokens()?;
        match self.tokens.pop_front() {
            Some(token) => {
                self.tokens_taken += 1;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }
}

// ---

/// Blank, line break or end of input: the set that terminates plain scalars
/// and validates `-`, `?` and `:` indicators.
#[inline]
fn is_blank_or_break(ch: Option<char>) -> bool {
    matches!(ch, None | Some(' ' | '\t' | '\r' | '\n'))
}
