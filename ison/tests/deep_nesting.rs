// SPDX-License-Identifier: Apache-2.0

use ison::{ParseError, ParserConfig, SyntaxError, Value};
use test_log::test;

const DEPTH: usize = 100_000;

#[test]
fn test_deep_arrays_parse_and_drop() {
    let text = format!("{}{}", "[".repeat(DEPTH), "]".repeat(DEPTH));
    let value = ison::parse(&text).unwrap();
    assert!(value.as_list().is_some());
    drop(value);
}

#[test]
fn test_deep_objects_parse_and_drop() {
    let text = format!("{}null{}", r#"{"a":"#.repeat(DEPTH), "}".repeat(DEPTH));
    let value = ison::parse(&text).unwrap();
    let mut current = &value;
    let mut levels = 0;
    while let Some(next) = current.lookup("a") {
        current = next;
        levels += 1;
    }
    assert_eq!(levels, DEPTH);
    assert!(current.is_null());
}

#[test]
fn test_deep_alternating_nesting() {
    let text = format!("{}1{}", r#"[{"k":"#.repeat(DEPTH / 2), "}]".repeat(DEPTH / 2));
    let value = ison::parse(&text).unwrap();
    let mut current = &value;
    let mut levels = 0;
    while let Value::List(list) = current {
        current = list.get(0).unwrap().lookup("k").unwrap();
        levels += 1;
    }
    assert_eq!(levels, DEPTH / 2);
    assert_eq!(current, &Value::Float(1.0));
}

#[test]
fn test_deep_unterminated_input_is_released() {
    let text = format!("{}[1]", "[".repeat(DEPTH));
    assert!(matches!(
        ison::parse(&text),
        Err(ParseError::Syntax {
            kind: SyntaxError::UnterminatedStructure,
            ..
        })
    ));
}

#[test]
fn test_depth_limit_stops_runaway_nesting() {
    let text = "[".repeat(DEPTH);
    let config = ParserConfig::new().with_max_depth(64);
    assert!(matches!(
        ison::parse_with(&text, &config),
        Err(ParseError::Syntax {
            kind: SyntaxError::MaxDepthReached(64),
            ..
        })
    ));
}

#[test]
fn test_deep_trees_compare_and_format() {
    let text = format!("{}{}", "[".repeat(DEPTH), "]".repeat(DEPTH));
    let first = ison::parse(&text).unwrap();
    let second = ison::parse(&text).unwrap();
    assert!(first == second);

    let objects = format!("{}1{}", r#"{"a":"#.repeat(DEPTH), "}".repeat(DEPTH));
    let changed = format!("{}2{}", r#"{"a":"#.repeat(DEPTH), "}".repeat(DEPTH));
    assert!(ison::parse(&objects).unwrap() == ison::parse(&objects).unwrap());
    assert!(ison::parse(&objects).unwrap() != ison::parse(&changed).unwrap());

    assert_eq!(format!("{first:?}"), "List(List { len: 1 })");
}
