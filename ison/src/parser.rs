// SPDX-License-Identifier: Apache-2.0

//! Pushdown automaton that turns a [`TokenStream`] into a [`Value`] tree.
//!
//! Nothing here recurses: nesting lives on three explicit stacks. The
//! marker stack records which grammatical context is open. The root stack
//! saves the enclosing map and its pending key whenever an object opens,
//! and the list stack saves the enclosing list whenever an array opens.

use std::io::BufRead;

use log::{debug, trace};

use crate::array::Array;
use crate::config::ParserConfig;
use crate::dict::Dict;
use crate::hash_key::HashKey;
use crate::parse_error::{ParseError, Position, SyntaxError};
use crate::tokenizer::{Literal, TokenKind, TokenStream, Tokenizer};
use crate::value::{List, Value};

/// Grammar context markers kept on the parse stack.
///
/// `ObjectOpen` with no pending key awaits a key, with a pending key it
/// awaits a colon. `ColonSeen` and `ArrayOpen` await a value.
/// `ValueComplete` awaits a comma or the matching close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    ObjectOpen,
    ArrayOpen,
    ColonSeen,
    ValueComplete,
}

#[derive(Debug)]
struct PendingKey {
    text: String,
    position: Position,
}

/// Parses documents with a fixed [`ParserConfig`].
///
/// ```
/// use ison::{Parser, ParserConfig};
///
/// let parser = Parser::new(ParserConfig::new().with_max_depth(8));
/// let value = parser.parse(r#"{"tags": ["a", "b"]}"#).unwrap();
/// assert_eq!(value.lookup("tags").unwrap().as_list().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// A tokenizer set up the way this parser expects.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::with_comments(self.config.allow_comments)
    }

    pub fn parse(&self, text: &str) -> Result<Value, ParseError> {
        self.parse_chunks([text])
    }

    /// Parses a document delivered in pieces. Chunk boundaries may fall
    /// anywhere, including inside a token or a multi-byte character.
    pub fn parse_chunks<I>(&self, chunks: I) -> Result<Value, ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut tokenizer = self.tokenizer();
        for chunk in chunks {
            tokenizer.feed(chunk.as_ref())?;
        }
        self.parse_tokens(tokenizer.finish()?)
    }

    /// Reads and parses a document one line at a time.
    pub fn parse_reader<R: BufRead>(&self, mut reader: R) -> Result<Value, ParseError> {
        let mut tokenizer = self.tokenizer();
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line).map_err(|e| {
                debug!("Reader failed: {e}");
                ParseError::from(e)
            })?;
            if read == 0 {
                break;
            }
            tokenizer.feed(&line)?;
        }
        self.parse_tokens(tokenizer.finish()?)
    }

    /// Builds the tree from an already tokenized document.
    pub fn parse_tokens(&self, mut stream: TokenStream) -> Result<Value, ParseError> {
        Automaton::new(self.config.max_depth, self.config.map_key()).run(&mut stream)
    }
}

/// State of one parse. Dropping it releases any partially built tree.
struct Automaton {
    markers: Array<Marker>,
    roots: Array<(Option<Dict>, Option<PendingKey>)>,
    lists: Array<Option<List>>,
    current_root: Option<Dict>,
    current_list: Option<List>,
    key: Option<PendingKey>,
    result: Option<Value>,
    depth: usize,
    max_depth: Option<usize>,
    hash_key: HashKey,
}

impl Automaton {
    fn new(max_depth: Option<usize>, hash_key: HashKey) -> Self {
        Self {
            markers: Array::new(),
            roots: Array::new(),
            lists: Array::new(),
            current_root: None,
            current_list: None,
            key: None,
            result: None,
            depth: 0,
            max_depth,
            hash_key,
        }
    }

    fn run(mut self, stream: &mut TokenStream) -> Result<Value, ParseError> {
        loop {
            let token = stream.next_token();
            let at = token.position;
            trace!("{:?} at {} (stack {:?})", token.kind, at, self.top());
            match token.kind {
                TokenKind::ObjectOpen => self.open_object(at)?,
                TokenKind::ObjectClose => self.close_object(at)?,
                TokenKind::ArrayOpen => self.open_array(at)?,
                TokenKind::ArrayClose => self.close_array(at)?,
                TokenKind::Colon => self.colon(at)?,
                TokenKind::Comma => self.comma(at, stream.peek_kind())?,
                TokenKind::String => {
                    let Some(Literal::Text(text)) = stream.next_literal() else {
                        return fail(SyntaxError::UnexpectedToken(TokenKind::String), at);
                    };
                    self.string(text, at)?;
                }
                TokenKind::Null => self.scalar(Value::Null, at)?,
                TokenKind::Number | TokenKind::Boolean => {
                    // null carries no literal, so only these two consume one.
                    let value = match stream.next_literal() {
                        Some(Literal::Number(n)) => Value::Float(n),
                        Some(Literal::Boolean(b)) => Value::Boolean(b),
                        _ => return fail(SyntaxError::UnexpectedToken(token.kind), at),
                    };
                    self.scalar(value, at)?;
                }
                TokenKind::End => return self.finish(at),
            }
        }
    }

    fn top(&self) -> Option<Marker> {
        self.markers.last().copied()
    }

    fn pop_marker(&mut self) {
        let _ = self.markers.pop();
    }

    /// Checks that a container may open here and enters it.
    fn enter(&mut self, kind: TokenKind, at: Position) -> Result<(), ParseError> {
        match self.top() {
            None if self.result.is_some() => return fail(SyntaxError::TrailingContent, at),
            None | Some(Marker::ColonSeen) | Some(Marker::ArrayOpen) => {}
            Some(Marker::ObjectOpen) | Some(Marker::ValueComplete) => {
                return fail(SyntaxError::UnexpectedToken(kind), at)
            }
        }
        if let Some(limit) = self.max_depth {
            if self.depth >= limit {
                return fail(SyntaxError::MaxDepthReached(limit), at);
            }
        }
        self.depth += 1;
        Ok(())
    }

    /// Checks that `close` matches the innermost open container.
    fn leave(&mut self, open: Marker, close: TokenKind, at: Position) -> Result<(), ParseError> {
        if self.top() == Some(Marker::ValueComplete) {
            self.pop_marker();
        }
        match self.top() {
            Some(top) if top == open => {
                if open == Marker::ObjectOpen && self.key.is_some() {
                    return fail(SyntaxError::MissingValue, at);
                }
                self.pop_marker();
                self.depth -= 1;
                Ok(())
            }
            Some(Marker::ColonSeen) => fail(SyntaxError::MissingValue, at),
            Some(_) => fail(SyntaxError::UnexpectedToken(close), at),
            None => fail(SyntaxError::UnmatchedClose(close), at),
        }
    }

    fn open_object(&mut self, at: Position) -> Result<(), ParseError> {
        self.enter(TokenKind::ObjectOpen, at)?;
        self.markers.push(Marker::ObjectOpen);
        self.roots
            .push((self.current_root.take(), self.key.take()));
        self.current_root = Some(Dict::with_key(self.hash_key));
        Ok(())
    }

    fn close_object(&mut self, at: Position) -> Result<(), ParseError> {
        self.leave(Marker::ObjectOpen, TokenKind::ObjectClose, at)?;
        let closed = self.current_root.take().unwrap_or_default();
        // The enclosing map and the key the closed object belongs under.
        if let Ok((root, key)) = self.roots.pop() {
            self.current_root = root;
            self.key = key;
        }
        self.complete(Value::Dict(closed), at)
    }

    fn open_array(&mut self, at: Position) -> Result<(), ParseError> {
        self.enter(TokenKind::ArrayOpen, at)?;
        self.markers.push(Marker::ArrayOpen);
        self.lists.push(self.current_list.take());
        self.current_list = Some(List::new());
        Ok(())
    }

    fn close_array(&mut self, at: Position) -> Result<(), ParseError> {
        self.leave(Marker::ArrayOpen, TokenKind::ArrayClose, at)?;
        let closed = self.current_list.take().unwrap_or_default();
        if let Ok(list) = self.lists.pop() {
            self.current_list = list;
        }
        self.complete(Value::List(closed), at)
    }

    /// Hands a finished container to its parent, or keeps it as the
    /// document root when nothing encloses it.
    fn complete(&mut self, value: Value, at: Position) -> Result<(), ParseError> {
        if self.markers.is_empty() {
            self.result = Some(value);
            return Ok(());
        }
        self.insert(value, at)
    }

    fn colon(&mut self, at: Position) -> Result<(), ParseError> {
        if self.top() == Some(Marker::ObjectOpen) && self.key.is_some() {
            self.markers.push(Marker::ColonSeen);
            return Ok(());
        }
        fail(SyntaxError::UnexpectedToken(TokenKind::Colon), at)
    }

    fn comma(&mut self, at: Position, next: TokenKind) -> Result<(), ParseError> {
        if self.top() != Some(Marker::ValueComplete) {
            return fail(SyntaxError::UnexpectedToken(TokenKind::Comma), at);
        }
        self.pop_marker();
        match (self.top(), next) {
            (Some(Marker::ObjectOpen), TokenKind::ObjectClose)
            | (Some(Marker::ArrayOpen), TokenKind::ArrayClose) => {
                fail(SyntaxError::TrailingComma, at)
            }
            (Some(Marker::ObjectOpen), _) | (Some(Marker::ArrayOpen), _) => Ok(()),
            _ => fail(SyntaxError::UnexpectedToken(TokenKind::Comma), at),
        }
    }

    fn string(&mut self, text: String, at: Position) -> Result<(), ParseError> {
        if self.top() == Some(Marker::ObjectOpen) {
            if self.key.is_some() {
                return fail(SyntaxError::UnexpectedToken(TokenKind::String), at);
            }
            self.key = Some(PendingKey { text, position: at });
            return Ok(());
        }
        self.scalar(Value::Text(text), at)
    }

    fn scalar(&mut self, value: Value, at: Position) -> Result<(), ParseError> {
        match self.top() {
            None if self.result.is_some() => fail(SyntaxError::TrailingContent, at),
            None => fail(SyntaxError::ScalarRoot, at),
            Some(_) => self.insert(value, at),
        }
    }

    /// Stores `value` in the context on top of the stack.
    fn insert(&mut self, value: Value, at: Position) -> Result<(), ParseError> {
        match self.top() {
            Some(Marker::ColonSeen) => {
                let (Some(root), Some(key)) = (self.current_root.as_mut(), self.key.take()) else {
                    return fail(SyntaxError::MissingValue, at);
                };
                if let Err(rejected) = root.add(&key.text, value) {
                    return Err(ParseError::DuplicateKey {
                        key: rejected.key,
                        position: key.position,
                    });
                }
                self.pop_marker();
            }
            Some(Marker::ArrayOpen) => {
                let Some(list) = self.current_list.as_mut() else {
                    return fail(SyntaxError::UnexpectedToken(token_kind(&value)), at);
                };
                list.push(value);
            }
            _ => return fail(SyntaxError::UnexpectedToken(token_kind(&value)), at),
        }
        self.markers.push(Marker::ValueComplete);
        Ok(())
    }

    fn finish(mut self, at: Position) -> Result<Value, ParseError> {
        if !self.markers.is_empty() {
            return fail(SyntaxError::UnterminatedStructure, at);
        }
        match self.result.take() {
            Some(value) => Ok(value),
            None => {
                debug!("No value before end of input");
                Err(ParseError::EmptyDocument)
            }
        }
    }
}

/// The token a value was read from, for error reports.
fn token_kind(value: &Value) -> TokenKind {
    match value {
        Value::Dict(_) => TokenKind::ObjectOpen,
        Value::List(_) => TokenKind::ArrayOpen,
        Value::Text(_) => TokenKind::String,
        Value::Boolean(_) => TokenKind::Boolean,
        Value::Null => TokenKind::Null,
        _ => TokenKind::Number,
    }
}

fn fail<T>(kind: SyntaxError, position: Position) -> Result<T, ParseError> {
    debug!("{} at {}", kind, position);
    Err(ParseError::syntax(kind, position))
}
