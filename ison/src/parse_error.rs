// SPDX-License-Identifier: Apache-2.0

use crate::tokenizer::TokenKind;
use crate::value::Value;

/// A location in the source text. Lines and columns are 1-based; the column
/// counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Problems found while scanning characters into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalError {
    /// A character that cannot start any token.
    InvalidCharacter(u8),
    /// A backslash followed by something other than a known escape.
    InvalidEscapeSequence(u8),
    /// A `\u` escape with a non-hex digit.
    InvalidUnicodeHex(u8),
    /// Valid hex but not a valid scalar value (lone or misordered surrogate).
    InvalidUnicodeCodepoint,
    /// Malformed or out-of-range number literal.
    InvalidNumber,
    /// A raw control character inside a string literal.
    UnescapedControlCharacter(u8),
    /// String bytes that do not form valid UTF-8.
    InvalidUtf8,
    /// A `true`, `false` or `null` literal that was not completed.
    InvalidLiteral,
    /// Input ended inside a string, escape or literal.
    UnexpectedEndOfInput,
}

/// Tokens that are well formed but appear in the wrong place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// A token that the current context does not accept.
    UnexpectedToken(TokenKind),
    /// `}` or `]` with no matching opener.
    UnmatchedClose(TokenKind),
    /// A comma directly before `}` or `]`.
    TrailingComma,
    /// An object key with no value, as in `{"a"}` or `{"a":}`.
    MissingValue,
    /// Input ended while an object or array was still open.
    UnterminatedStructure,
    /// More content after the top-level value was closed.
    TrailingContent,
    /// A scalar where the document root should be an object or array.
    ScalarRoot,
    /// Nesting went past [`ParserConfig::max_depth`](crate::ParserConfig).
    MaxDepthReached(usize),
}

/// Errors that can occur during JSON parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Bad character, escape or number.
    Lexical {
        kind: LexicalError,
        position: Position,
    },
    /// A token in the wrong grammatical context.
    Syntax {
        kind: SyntaxError,
        position: Position,
    },
    /// An object literal repeated a key.
    DuplicateKey { key: String, position: Position },
    /// The source held no tokens at all.
    EmptyDocument,
    /// Error from the underlying reader (I/O error, not end-of-stream)
    ReaderError(std::io::ErrorKind),
}

impl ParseError {
    pub(crate) const fn lexical(kind: LexicalError, position: Position) -> Self {
        ParseError::Lexical { kind, position }
    }

    pub(crate) const fn syntax(kind: SyntaxError, position: Position) -> Self {
        ParseError::Syntax { kind, position }
    }

    /// Where the error was detected, when it is tied to the source text.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lexical { position, .. }
            | ParseError::Syntax { position, .. }
            | ParseError::DuplicateKey { position, .. } => Some(*position),
            ParseError::EmptyDocument | ParseError::ReaderError(_) => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::ReaderError(err.kind())
    }
}

impl core::fmt::Display for LexicalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LexicalError::InvalidCharacter(c) => write!(f, "Invalid character {:?}", *c as char),
            LexicalError::InvalidEscapeSequence(c) => {
                write!(f, "Invalid escape sequence \\{}", *c as char)
            }
            LexicalError::InvalidUnicodeHex(c) => {
                write!(f, "Invalid hex digit {:?} in unicode escape", *c as char)
            }
            LexicalError::UnescapedControlCharacter(c) => {
                write!(f, "Unescaped control character 0x{c:02x} in string")
            }
            LexicalError::InvalidUnicodeCodepoint => {
                f.write_str("Unicode escape is not a valid code point")
            }
            LexicalError::InvalidNumber => f.write_str("Invalid number"),
            LexicalError::InvalidUtf8 => f.write_str("String is not valid UTF-8"),
            LexicalError::InvalidLiteral => f.write_str("Expected true, false or null"),
            LexicalError::UnexpectedEndOfInput => f.write_str("Unexpected end of input"),
        }
    }
}

impl core::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SyntaxError::UnexpectedToken(t) => write!(f, "Unexpected {t}"),
            SyntaxError::UnmatchedClose(t) => write!(f, "Unexpected {t} without matching opener"),
            SyntaxError::MaxDepthReached(d) => write!(f, "Nesting deeper than {d} levels"),
            SyntaxError::TrailingComma => f.write_str("Trailing comma before closing bracket"),
            SyntaxError::MissingValue => f.write_str("Object key without a value"),
            SyntaxError::UnterminatedStructure => {
                f.write_str("Input ended inside an object or array")
            }
            SyntaxError::TrailingContent => f.write_str("Unexpected content after document"),
            SyntaxError::ScalarRoot => f.write_str("Document root must be an object or array"),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::Lexical { kind, position } => write!(f, "{kind} at {position}"),
            ParseError::Syntax { kind, position } => write!(f, "{kind} at {position}"),
            ParseError::DuplicateKey { key, position } => {
                write!(f, "Duplicate key {key:?} at {position}")
            }
            ParseError::EmptyDocument => f.write_str("Empty document"),
            ParseError::ReaderError(kind) => write!(f, "Reader failed: {kind}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Container misuse: asking for an element that is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    IndexOutOfRange { index: usize, len: usize },
    EmptyContainer,
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} out of bounds (size: {len})")
            }
            AccessError::EmptyContainer => f.write_str("Container is empty"),
        }
    }
}

impl std::error::Error for AccessError {}

/// Returned by [`Dict::add`](crate::Dict::add) when the key is already
/// present. The rejected value is handed back untouched.
#[derive(Debug, PartialEq)]
pub struct DuplicateKey {
    pub key: String,
    pub value: Value,
}

impl core::fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Duplicate key {:?}", self.key)
    }
}

impl std::error::Error for DuplicateKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_positions() {
        let error = ParseError::syntax(SyntaxError::TrailingComma, Position::new(3, 7));
        assert_eq!(error.position(), Some(Position::new(3, 7)));
        assert_eq!(ParseError::EmptyDocument.position(), None);
    }

    #[test]
    fn test_display_mentions_position() {
        let error = ParseError::lexical(LexicalError::InvalidCharacter(b'x'), Position::new(1, 2));
        assert_eq!(error.to_string(), "Invalid character 'x' at line 1 column 2");

        let error = ParseError::syntax(
            SyntaxError::UnmatchedClose(TokenKind::ObjectClose),
            Position::new(2, 1),
        );
        assert_eq!(
            error.to_string(),
            "Unexpected '}' without matching opener at line 2 column 1"
        );
    }

    #[test]
    fn test_messages_are_prose() {
        let lexical = [
            LexicalError::InvalidCharacter(b'x'),
            LexicalError::InvalidEscapeSequence(b'q'),
            LexicalError::InvalidUnicodeHex(b'g'),
            LexicalError::InvalidUnicodeCodepoint,
            LexicalError::InvalidNumber,
            LexicalError::UnescapedControlCharacter(1),
            LexicalError::InvalidUtf8,
            LexicalError::InvalidLiteral,
            LexicalError::UnexpectedEndOfInput,
        ];
        for kind in lexical {
            let message = kind.to_string();
            assert!(!message.contains(&format!("{kind:?}")), "{message}");
        }
        let syntax = [
            SyntaxError::UnexpectedToken(TokenKind::Comma),
            SyntaxError::UnmatchedClose(TokenKind::ArrayClose),
            SyntaxError::TrailingComma,
            SyntaxError::MissingValue,
            SyntaxError::UnterminatedStructure,
            SyntaxError::TrailingContent,
            SyntaxError::ScalarRoot,
            SyntaxError::MaxDepthReached(3),
        ];
        for kind in syntax {
            let message = kind.to_string();
            assert!(!message.contains(&format!("{kind:?}")), "{message}");
        }
        assert_eq!(
            SyntaxError::UnterminatedStructure.to_string(),
            "Input ended inside an object or array"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "gone");
        let error: ParseError = io.into();
        assert_eq!(
            error,
            ParseError::ReaderError(std::io::ErrorKind::UnexpectedEof)
        );
    }
}
