// SPDX-License-Identifier: Apache-2.0

//! Byte-at-a-time tokenizer.
//!
//! Input can arrive in arbitrary chunks: all scanning state lives in
//! [`Tokenizer`], so a string, number or literal may straddle a chunk
//! boundary. The output is a [`TokenStream`] of token kinds plus a parallel
//! sequence of literal values for the tokens that carry one.

use log::{debug, trace};

use crate::parse_error::{LexicalError, ParseError, Position};

/// Kinds of lexical tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Comma,
    Colon,
    String,
    Number,
    Boolean,
    Null,
    /// End-of-stream sentinel, always the last token.
    End,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TokenKind::ObjectOpen => "'{'",
            TokenKind::ObjectClose => "'}'",
            TokenKind::ArrayOpen => "'['",
            TokenKind::ArrayClose => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::End => "end of input",
        };
        f.write_str(s)
    }
}

/// A token kind and where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

/// The value carried by a string, number or boolean token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
    Boolean(bool),
}

/// Tokens and their literal values, each read once, front to back.
#[derive(Debug)]
pub struct TokenStream {
    tokens: core::iter::Peekable<std::vec::IntoIter<Token>>,
    literals: std::vec::IntoIter<Literal>,
    end: Position,
}

impl TokenStream {
    /// Takes the next token. Once the stream is exhausted this keeps
    /// returning the `End` sentinel.
    pub fn next_token(&mut self) -> Token {
        self.tokens.next().unwrap_or(Token {
            kind: TokenKind::End,
            position: self.end,
        })
    }

    /// Kind of the token `next_token` would return.
    pub fn peek_kind(&mut self) -> TokenKind {
        self.tokens
            .peek()
            .map_or(TokenKind::End, |token| token.kind)
    }

    /// Takes the next literal value.
    pub fn next_literal(&mut self) -> Option<Literal> {
        self.literals.next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    String(Str),
    Number(Num),
    Word(WordProgress),
    Comment(Comment),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Str {
    Normal,
    Escaping,
    /// Inside `\uXXXX`, `digits` hex digits read so far.
    Unicode { digits: u8, unit: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Sign,
    LeadingZero,
    BeforeDecimalPoint,
    Decimal,
    AfterDecimalPoint,
    Exponent,
    ExponentSign,
    AfterExponent,
}

impl Num {
    /// The next state after `byte`, or `None` when `byte` cannot extend
    /// the number.
    const fn advance(self, byte: u8) -> Option<Num> {
        match (self, byte) {
            (Num::Sign, b'0') => Some(Num::LeadingZero),
            (Num::Sign, b'1'..=b'9') => Some(Num::BeforeDecimalPoint),
            (Num::LeadingZero | Num::BeforeDecimalPoint, b'.') => Some(Num::Decimal),
            (Num::BeforeDecimalPoint, b'0'..=b'9') => Some(Num::BeforeDecimalPoint),
            (
                Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint,
                b'e' | b'E',
            ) => Some(Num::Exponent),
            (Num::Decimal | Num::AfterDecimalPoint, b'0'..=b'9') => Some(Num::AfterDecimalPoint),
            (Num::Exponent, b'+' | b'-') => Some(Num::ExponentSign),
            (Num::Exponent | Num::ExponentSign | Num::AfterExponent, b'0'..=b'9') => {
                Some(Num::AfterExponent)
            }
            _ => None,
        }
    }

    /// Whether the text so far is a whole number literal.
    const fn is_complete(self) -> bool {
        matches!(
            self,
            Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint | Num::AfterExponent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Word {
    True,
    False,
    Null,
}

impl Word {
    const fn as_bytes(self) -> &'static [u8] {
        match self {
            Word::True => b"true",
            Word::False => b"false",
            Word::Null => b"null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WordProgress {
    word: Word,
    matched: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comment {
    /// One `/` seen.
    Slash,
    /// Inside `// ...`, until end of line.
    Body,
}

/// Incremental tokenizer. Feed it chunks, then call [`finish`](Self::finish).
///
/// ```
/// use ison::{Tokenizer, TokenKind};
///
/// let mut tokenizer = Tokenizer::new();
/// tokenizer.feed(br#"{"a": tr"#).unwrap();
/// tokenizer.feed(b"ue}").unwrap();
/// let mut stream = tokenizer.finish().unwrap();
/// assert_eq!(stream.next_token().kind, TokenKind::ObjectOpen);
/// assert_eq!(stream.next_token().kind, TokenKind::String);
/// ```
#[derive(Debug)]
pub struct Tokenizer {
    state: State,
    /// Position of the next byte to be consumed.
    line: u32,
    column: u32,
    token_start: Position,
    /// String or number bytes of the token in progress.
    scratch: Vec<u8>,
    /// High half of a surrogate pair waiting for its low half.
    pending_high: Option<u16>,
    allow_comments: bool,
    tokens: Vec<Token>,
    literals: Vec<Literal>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Creates a tokenizer; `//` comments are accepted when the `comments`
    /// feature is on.
    pub fn new() -> Self {
        Self::with_comments(cfg!(feature = "comments"))
    }

    pub fn with_comments(allow_comments: bool) -> Self {
        Tokenizer {
            state: State::Idle,
            line: 1,
            column: 1,
            token_start: Position::new(1, 1),
            scratch: Vec::new(),
            pending_high: None,
            allow_comments,
            tokens: Vec::new(),
            literals: Vec::new(),
        }
    }

    /// Scans one chunk. After an error the tokenizer must be discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        for &byte in chunk {
            self.consume(byte)?;
            if byte == b'\n' {
                self.line = self.line.saturating_add(1);
                self.column = 1;
            } else {
                self.column = self.column.saturating_add(1);
            }
        }
        Ok(())
    }

    /// Completes any token cut off by the end of input and appends the
    /// `End` sentinel.
    pub fn finish(mut self) -> Result<TokenStream, ParseError> {
        match self.state {
            State::Idle | State::Comment(Comment::Body) => {}
            State::Number(num) if num.is_complete() => self.finish_number()?,
            State::Number(_) => return self.fail(LexicalError::InvalidNumber, self.token_start),
            State::Comment(Comment::Slash) => {
                return self.fail(LexicalError::InvalidCharacter(b'/'), self.token_start)
            }
            State::String(_) | State::Word(_) => {
                return self.fail(LexicalError::UnexpectedEndOfInput, self.here())
            }
        }
        if self.tokens.is_empty() {
            debug!("No tokens in input");
            return Err(ParseError::EmptyDocument);
        }
        let end = self.here();
        self.tokens.push(Token {
            kind: TokenKind::End,
            position: end,
        });
        trace!(
            "Tokenized {} tokens, {} literals",
            self.tokens.len(),
            self.literals.len()
        );
        Ok(TokenStream {
            tokens: self.tokens.into_iter().peekable(),
            literals: self.literals.into_iter(),
            end,
        })
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn fail<T>(&self, kind: LexicalError, position: Position) -> Result<T, ParseError> {
        debug!("{} at {}", kind, position);
        Err(ParseError::lexical(kind, position))
    }

    fn emit(&mut self, kind: TokenKind) {
        let position = match kind {
            TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                self.token_start
            }
            _ => self.here(),
        };
        trace!("{:?} at {}", kind, position);
        self.tokens.push(Token { kind, position });
    }

    fn consume(&mut self, byte: u8) -> Result<(), ParseError> {
        // A number has no terminator of its own: the first byte that cannot
        // extend it ends it and is then scanned as usual.
        if let State::Number(num) = self.state {
            if let Some(next) = num.advance(byte) {
                self.scratch.push(byte);
                self.state = State::Number(next);
                return Ok(());
            }
            if !num.is_complete() {
                return self.fail(LexicalError::InvalidNumber, self.here());
            }
            self.finish_number()?;
        }

        match self.state {
            State::Idle => self.start_token(byte),
            State::String(s) => self.string_byte(s, byte),
            State::Word(progress) => self.word_byte(progress, byte),
            State::Comment(Comment::Slash) => {
                if byte != b'/' {
                    return self.fail(LexicalError::InvalidCharacter(b'/'), self.token_start);
                }
                self.state = State::Comment(Comment::Body);
                Ok(())
            }
            State::Comment(Comment::Body) => {
                if byte == b'\n' {
                    self.state = State::Idle;
                }
                Ok(())
            }
            State::Number(_) => Ok(()),
        }
    }

    fn start_token(&mut self, byte: u8) -> Result<(), ParseError> {
        self.token_start = self.here();
        match byte {
            b'{' => self.emit(TokenKind::ObjectOpen),
            b'}' => self.emit(TokenKind::ObjectClose),
            b'[' => self.emit(TokenKind::ArrayOpen),
            b']' => self.emit(TokenKind::ArrayClose),
            b',' => self.emit(TokenKind::Comma),
            b':' => self.emit(TokenKind::Colon),
            b' ' | b'\t' | b'\r' | b'\n' => {}
            b'"' => {
                self.scratch.clear();
                self.state = State::String(Str::Normal);
            }
            b'-' => self.start_number(byte, Num::Sign),
            b'+' if cfg!(not(feature = "strict-numbers")) => self.start_number(byte, Num::Sign),
            b'0' => self.start_number(byte, Num::LeadingZero),
            b'1'..=b'9' => self.start_number(byte, Num::BeforeDecimalPoint),
            b't' => self.start_word(Word::True),
            b'f' => self.start_word(Word::False),
            b'n' => self.start_word(Word::Null),
            b'/' if self.allow_comments => self.state = State::Comment(Comment::Slash),
            _ => return self.fail(LexicalError::InvalidCharacter(byte), self.here()),
        }
        Ok(())
    }

    fn start_number(&mut self, byte: u8, num: Num) {
        self.scratch.clear();
        self.scratch.push(byte);
        self.state = State::Number(num);
    }

    fn start_word(&mut self, word: Word) {
        self.state = State::Word(WordProgress { word, matched: 1 });
    }

    fn finish_number(&mut self) -> Result<(), ParseError> {
        self.state = State::Idle;
        let number = core::str::from_utf8(&self.scratch)
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|n| n.is_finite());
        match number {
            Some(number) => {
                self.emit(TokenKind::Number);
                self.literals.push(Literal::Number(number));
                Ok(())
            }
            None => self.fail(LexicalError::InvalidNumber, self.token_start),
        }
    }

    fn word_byte(&mut self, progress: WordProgress, byte: u8) -> Result<(), ParseError> {
        let expected = progress.word.as_bytes();
        if expected.get(progress.matched) != Some(&byte) {
            return self.fail(LexicalError::InvalidLiteral, self.token_start);
        }
        let matched = progress.matched + 1;
        if matched < expected.len() {
            self.state = State::Word(WordProgress { matched, ..progress });
            return Ok(());
        }
        self.state = State::Idle;
        match progress.word {
            Word::True | Word::False => {
                self.emit(TokenKind::Boolean);
                self.literals
                    .push(Literal::Boolean(progress.word == Word::True));
            }
            Word::Null => self.emit(TokenKind::Null),
        }
        Ok(())
    }

    fn string_byte(&mut self, state: Str, byte: u8) -> Result<(), ParseError> {
        if self.pending_high.is_some() {
            // A high surrogate must be followed directly by `\u`.
            let continues_pair = matches!(
                (state, byte),
                (Str::Normal, b'\\') | (Str::Escaping, b'u') | (Str::Unicode { .. }, _)
            );
            if !continues_pair {
                return self.fail(LexicalError::InvalidUnicodeCodepoint, self.here());
            }
        }

        match state {
            Str::Normal => match byte {
                b'"' => self.finish_string()?,
                b'\\' => self.state = State::String(Str::Escaping),
                0x00..=0x1F => {
                    return self.fail(LexicalError::UnescapedControlCharacter(byte), self.here())
                }
                _ => self.scratch.push(byte),
            },
            Str::Escaping => {
                let unescaped = match byte {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'b' => 0x08,
                    b'f' => 0x0C,
                    b'\\' => b'\\',
                    b'"' => b'"',
                    b'/' => b'/',
                    b'u' => {
                        self.state = State::String(Str::Unicode { digits: 0, unit: 0 });
                        return Ok(());
                    }
                    _ => return self.fail(LexicalError::InvalidEscapeSequence(byte), self.here()),
                };
                self.scratch.push(unescaped);
                self.state = State::String(Str::Normal);
            }
            Str::Unicode { digits, unit } => {
                let Some(nibble) = (byte as char).to_digit(16) else {
                    return self.fail(LexicalError::InvalidUnicodeHex(byte), self.here());
                };
                let unit = (unit << 4) | nibble as u16;
                if digits < 3 {
                    self.state = State::String(Str::Unicode {
                        digits: digits + 1,
                        unit,
                    });
                } else {
                    self.push_code_unit(unit)?;
                    self.state = State::String(Str::Normal);
                }
            }
        }
        Ok(())
    }

    /// Appends one decoded UTF-16 code unit, pairing surrogates.
    fn push_code_unit(&mut self, unit: u16) -> Result<(), ParseError> {
        let code_point = match (self.pending_high.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.pending_high = Some(unit);
                return Ok(());
            }
            (Some(high), 0xDC00..=0xDFFF) => {
                0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00)
            }
            (None, 0xDC00..=0xDFFF) | (Some(_), _) => {
                return self.fail(LexicalError::InvalidUnicodeCodepoint, self.here());
            }
            (None, _) => u32::from(unit),
        };
        let Some(ch) = char::from_u32(code_point) else {
            return self.fail(LexicalError::InvalidUnicodeCodepoint, self.here());
        };
        let mut buf = [0u8; 4];
        self.scratch
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn finish_string(&mut self) -> Result<(), ParseError> {
        self.state = State::Idle;
        let bytes = core::mem::take(&mut self.scratch);
        match String::from_utf8(bytes) {
            Ok(text) => {
                self.emit(TokenKind::String);
                self.literals.push(Literal::Text(text));
                Ok(())
            }
            Err(_) => self.fail(LexicalError::InvalidUtf8, self.token_start),
        }
    }
}

/// Tokenizes a complete document held in memory.
pub fn tokenize(input: &[u8]) -> Result<TokenStream, ParseError> {
    let mut tokenizer = Tokenizer::new();
    tokenizer.feed(input)?;
    tokenizer.finish()
}
