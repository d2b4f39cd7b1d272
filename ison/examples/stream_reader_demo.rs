// Example reading a document from stdin or a file, line by line

use std::fs::File;
use std::io::{self, BufReader};

use ison::{Parser, ParserConfig};

fn main() {
    env_logger::init();

    let config = ParserConfig::new().with_max_depth(512);
    let parser = Parser::new(config);

    let result = match std::env::args().nth(1) {
        Some(path) => match File::open(&path) {
            Ok(file) => parser.parse_reader(BufReader::new(file)),
            Err(e) => {
                eprintln!("Cannot open {path}: {e}");
                std::process::exit(2);
            }
        },
        None => parser.parse_reader(io::stdin().lock()),
    };

    match result {
        Ok(value) => println!("Parsed a {:?}", value.kind()),
        Err(e) => {
            eprintln!("Parse failed: {e}");
            std::process::exit(1);
        }
    }
}
