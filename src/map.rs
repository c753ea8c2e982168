//! The source map walk: recursive descent over a positioned token stream,
//! producing one pointer/span entry per value with the entry of a compound
//! value preceding the entries of its children.

// std imports
use std::borrow::Cow;

// local imports
use crate::{
    error::{Error, Expected, Result},
    scanning::Scanner,
    token::{Token, TokenKind, TokenSource},
    types::{Entry, Pointer, SourceMap},
};

// ---

/// Calculates the source map of a document given as source text, using the
/// bundled scanner.
pub fn calculate(source: &str) -> Result<SourceMap> {
    let mut tokens = Scanner::new(source);
    let map = compute(&mut tokens)?;
    log::debug!("computed source map with {} entries", map.len());
    Ok(map)
}

/// Calculates the source map of a document given as a token stream.
///
/// Consumes the leading stream start and document start tokens if present,
/// then walks the outermost value. Trailing tokens are left unconsumed.
pub fn compute<'s, T: TokenSource<'s>>(tokens: &mut T) -> Result<SourceMap> {
    for framing in [TokenKind::StreamStart, TokenKind::DocumentStart] {
        if matches!(tokens.peek()?, Some(token) if token.kind == framing) {
            tokens.take()?;
        }
    }
    value(tokens)
}

/// Calculates the source map of any value.
///
/// Dispatches on the kind of the next token without consuming it; the
/// returned sub-map identifies the value itself by the empty pointer and
/// all of its descendants by pointers relative to it.
pub fn value<'s, T: TokenSource<'s>>(tokens: &mut T) -> Result<SourceMap> {
    let (is_sequence, is_mapping) = match tokens.peek()? {
        Some(token) => (token.kind.starts_sequence(), token.kind.starts_mapping()),
        None => (false, false),
    };
    if is_sequence {
        sequence(tokens)
    } else if is_mapping {
        mapping(tokens)
    } else {
        primitive(tokens)
    }
}

/// Calculates the source map of a sequence value.
///
/// The closing token must match the opened form: a flow sequence ends with
/// the flow sequence end token, a block sequence with the generic block end.
pub fn sequence<'s, T: TokenSource<'s>>(tokens: &mut T) -> Result<SourceMap> {
    let token = next_token(tokens, Expected::SequenceStart)?;
    let flow = match token.kind {
        TokenKind::FlowSequenceStart => true,
        TokenKind::BlockSequenceStart => false,
        _ => return Err(unexpected(Expected::SequenceStart, &token)),
    };
    let value_start = token.start;

    let mut children = SourceMap::new();
    let mut index = 0usize;
    loop {
        let done = match tokens.peek()? {
            Some(token) => token.kind.closes_sequence(),
            None => true,
        };
        if done {
            break;
        }

        // A block entry marker carries no value of its own.
        if matches!(tokens.peek()?, Some(token) if token.kind == TokenKind::BlockEntry) {
            tokens.take()?;
        }

        for (pointer, entry) in value(tokens)? {
            children.push((format!("/{index}{pointer}"), entry));
        }
        index += 1;

        if matches!(tokens.peek()?, Some(token) if token.kind == TokenKind::FlowEntry) {
            tokens.take()?;
        }
    }

    let token = next_token(tokens, Expected::SequenceEnd)?;
    let closed = match token.kind {
        TokenKind::FlowSequenceEnd => flow,
        TokenKind::BlockEnd => !flow,
        _ => false,
    };
    if !closed {
        return Err(unexpected(Expected::SequenceEnd, &token));
    }

    let mut map = SourceMap::with_capacity(children.len() + 1);
    map.push((Pointer::new(), Entry::new(value_start, token.end)));
    map.extend(children);
    Ok(map)
}

/// Calculates the source map of a mapping value.
///
/// Key pointer segments are escaped per JSON Pointer rules. As with
/// sequences, the closing token must match the opened form.
pub fn mapping<'s, T: TokenSource<'s>>(tokens: &mut T) -> Result<SourceMap> {
    let token = next_token(tokens, Expected::MappingStart)?;
    let flow = match token.kind {
        TokenKind::FlowMappingStart => true,
        TokenKind::BlockMappingStart => false,
        _ => return Err(unexpected(Expected::MappingStart, &token)),
    };
    let value_start = token.start;

    let mut children = SourceMap::new();
    loop {
        let done = match tokens.peek()? {
            Some(token) => token.kind.closes_mapping(),
            None => true,
        };
        if done {
            break;
        }

        let token = next_token(tokens, Expected::Key)?;
        if token.kind != TokenKind::Key {
            return Err(unexpected(Expected::Key, &token));
        }

        let token = next_token(tokens, Expected::Scalar)?;
        let TokenKind::Scalar(text) = token.kind else {
            return Err(unexpected(Expected::Scalar, &token));
        };
        let key = escape(&text);
        let (key_start, key_end) = (token.start, token.end);

        let token = next_token(tokens, Expected::Value)?;
        if token.kind != TokenKind::Value {
            return Err(unexpected(Expected::Value, &token));
        }

        let sub = value(tokens)?;
        // The sub-map always starts with the value's own entry; its span
        // becomes the keyed entry's value span.
        let child = sub[0].1;
        children.push((format!("/{key}"), child.with_key(key_start, key_end)));
        children.extend(
            sub.into_iter()
                .skip(1)
                .map(|(pointer, entry)| (format!("/{key}{pointer}"), entry)),
        );

        if matches!(tokens.peek()?, Some(token) if token.kind == TokenKind::FlowEntry) {
            tokens.take()?;
        }
    }

    let token = next_token(tokens, Expected::MappingEnd)?;
    let closed = match token.kind {
        TokenKind::FlowMappingEnd => flow,
        TokenKind::BlockEnd => !flow,
        _ => false,
    };
    if !closed {
        return Err(unexpected(Expected::MappingEnd, &token));
    }

    let mut map = SourceMap::with_capacity(children.len() + 1);
    map.push((Pointer::new(), Entry::new(value_start, token.end)));
    map.extend(children);
    Ok(map)
}

/// Calculates the source map of a primitive value: a single entry spanning
/// the scalar token.
pub fn primitive<'s, T: TokenSource<'s>>(tokens: &mut T) -> Result<SourceMap> {
    let token = next_token(tokens, Expected::Scalar)?;
    let TokenKind::Scalar(_) = token.kind else {
        return Err(unexpected(Expected::Scalar, &token));
    };
    Ok(vec![(Pointer::new(), Entry::new(token.start, token.end))])
}

// ---

fn next_token<'s, T: TokenSource<'s>>(tokens: &mut T, expected: Expected) -> Result<Token<'s>> {
    tokens.take()?.ok_or(Error::UnexpectedEnd { expected })
}

fn unexpected(expected: Expected, token: &Token) -> Error {
    Error::UnexpectedToken {
        expected,
        found: token.kind.to_string(),
        location: token.start,
    }
}

fn escape(key: &str) -> Cow<'_, str> {
    if key.contains(['~', '/']) {
        Cow::Owned(key.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(key)
    }
}
