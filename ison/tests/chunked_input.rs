// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufReader, Read};

use ison::{ParseError, Value};
use test_log::test;

const DOCUMENT: &str = r#"{
  "name": "café ünïcode",
  "count": -12.5e-1,
  "flags": [true, false, null],
  "nested": {"deeper": [{"x": 1}, {"y": "😀"}]},
  "empty": {}
}"#;

#[test]
fn test_every_split_point_yields_same_tree() {
    let whole = ison::parse(DOCUMENT).unwrap();
    let bytes = DOCUMENT.as_bytes();
    for split in 0..=bytes.len() {
        let parsed = ison::parse_chunks([&bytes[..split], &bytes[split..]])
            .unwrap_or_else(|e| panic!("split at {split}: {e}"));
        assert_eq!(parsed, whole, "split at {split}");
    }
}

#[test]
fn test_one_byte_chunks() {
    let whole = ison::parse(DOCUMENT).unwrap();
    let parsed = ison::parse_chunks(DOCUMENT.as_bytes().chunks(1)).unwrap();
    assert_eq!(parsed, whole);
}

#[test]
fn test_chunk_errors_match_whole_input_errors() {
    let text = "[1, 2,\n 3,]";
    let expected = ison::parse(text).unwrap_err();
    for split in 0..=text.len() {
        let err = ison::parse_chunks([&text.as_bytes()[..split], &text.as_bytes()[split..]])
            .unwrap_err();
        assert_eq!(err, expected, "split at {split}");
    }
}

#[test]
fn test_no_chunks_is_empty_document() {
    let chunks: Vec<&[u8]> = Vec::new();
    assert_eq!(ison::parse_chunks(chunks), Err(ParseError::EmptyDocument));
}

#[test]
fn test_reader_matches_string_parse() {
    let whole = ison::parse(DOCUMENT).unwrap();
    let parsed = ison::parse_reader(BufReader::with_capacity(3, DOCUMENT.as_bytes())).unwrap();
    assert_eq!(parsed, whole);
}

#[test]
fn test_reader_without_trailing_newline() {
    let value = ison::parse_reader("[1]".as_bytes()).unwrap();
    assert_eq!(value.as_list().unwrap().get(0), Ok(&Value::Float(1.0)));
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

#[test]
fn test_reader_failure_is_reported() {
    let reader = BufReader::new("[1,\n2".as_bytes().chain(FailingReader));
    assert_eq!(
        ison::parse_reader(reader),
        Err(ParseError::ReaderError(io::ErrorKind::ConnectionReset))
    );
}
