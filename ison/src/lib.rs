// SPDX-License-Identifier: Apache-2.0

//! A small JSON reader that builds an owned tree of [`Value`]s.
//!
//! Objects become [`Dict`]s, a fixed 32-bucket hash map keyed with
//! SipHash, and arrays become [`List`]s. Parsing is a single
//! non-recursive pass, so nesting depth is bounded only by memory unless
//! [`ParserConfig::max_depth`] says otherwise.
//!
//! ```
//! let value = ison::parse(r#"{"name": "ison", "tags": ["json", "reader"]}"#).unwrap();
//! assert_eq!(ison::lookup(&value, "name").and_then(|v| v.as_str()), Some("ison"));
//! assert_eq!(ison::value_kind(&value), ison::ValueKind::Dict);
//! ```
//!
//! Call [`init`] once at startup to draw the hash secret up front; otherwise
//! the first map created does it.

mod array;
pub use array::{Array, GROWTH_INCREMENT};

mod config;
pub use config::ParserConfig;

mod dict;
pub use dict::{Dict, BUCKET_COUNT};

mod hash_key;
pub use hash_key::{init, init_with_key, HashKey, InitError};

mod parse_error;
pub use parse_error::{AccessError, DuplicateKey, LexicalError, ParseError, Position, SyntaxError};

mod parser;
pub use parser::Parser;

mod tokenizer;
pub use tokenizer::{tokenize, Literal, Token, TokenKind, TokenStream, Tokenizer};

mod value;
pub use value::{List, Opaque, Value, ValueKind};

/// Parses a complete document with the default configuration.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    Parser::default().parse(text)
}

/// Parses with an explicit configuration.
pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Value, ParseError> {
    Parser::new(*config).parse(text)
}

/// Parses a document delivered in arbitrary pieces.
pub fn parse_chunks<I>(chunks: I) -> Result<Value, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    Parser::default().parse_chunks(chunks)
}

/// Parses a document read line by line from `reader`.
pub fn parse_reader<R: std::io::BufRead>(reader: R) -> Result<Value, ParseError> {
    Parser::default().parse_reader(reader)
}

/// The value under `key` when `node` is a map; `None` for every other kind.
pub fn lookup<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    node.lookup(key)
}

pub fn value_kind(node: &Value) -> ValueKind {
    node.kind()
}
