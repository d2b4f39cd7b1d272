// Example demonstrating parsing and walking a document

use ison::{ParseError, Value};

fn describe(value: &Value) -> String {
    match value {
        Value::Dict(dict) => format!("object with {} keys", dict.len()),
        Value::List(list) => format!("array of {}", list.len()),
        Value::Text(s) => format!("string {s:?}"),
        Value::Float(n) => format!("number {n}"),
        Value::Boolean(b) => format!("bool {b}"),
        Value::Null => "null".to_string(),
        other => format!("{:?}", other.kind()),
    }
}

fn main() -> Result<(), ParseError> {
    env_logger::init();

    let json = r#"{"name": "value", "number": 42, "flag": true, "items": [1, "two", null]}"#;
    println!("Input: {}", json);

    let value = ison::parse(json)?;
    if let Some(dict) = value.as_dict() {
        for (key, item) in dict.iter() {
            println!("{key}: {}", describe(item));
        }
    }

    match ison::parse(r#"{"a": 1,}"#) {
        Ok(_) => println!("Unexpectedly parsed"),
        Err(e) => println!("Rejected as expected: {e}"),
    }
    Ok(())
}
