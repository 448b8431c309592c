use std::env;
use std::fs;
use std::process;

use scoretok::{array_to_performance, decode_to_chord_array, encode_events, CodecConfig, NoteEvent};

const USAGE: &str = "Usage: scoretok encode <notes.json> [--config <config.yaml>]
       scoretok decode <tokens.txt> [--config <config.yaml>] [--strict]";

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error reading file '{}': {}", path, e)),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        fail(USAGE);
    }

    let command = args[1].as_str();
    let input_path = &args[2];
    let mut config_path: Option<&String> = None;
    let mut strict = false;

    // Parse flags
    let mut rest = args[3..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--config" => match rest.next() {
                Some(path) => config_path = Some(path),
                None => fail(USAGE),
            },
            "--strict" => strict = true,
            _ => fail(&format!("Unknown option '{}'\n{}", flag, USAGE)),
        }
    }

    let config = match config_path {
        Some(path) => match CodecConfig::from_yaml(&read(path)) {
            Ok(config) => config,
            Err(e) => fail(&format!("Error in config '{}': {}", path, e)),
        },
        None => CodecConfig::default(),
    };

    match command {
        "encode" => {
            let events: Vec<NoteEvent> = match serde_json::from_str(&read(input_path)) {
                Ok(events) => events,
                Err(e) => fail(&format!("Error parsing notes '{}': {}", input_path, e)),
            };
            match encode_events(&events, &config) {
                Ok(tokens) => println!("{}", tokens),
                Err(e) => fail(&format!("Encoding error: {}", e)),
            }
        }
        "decode" => {
            let (arr, report) = decode_to_chord_array(&read(input_path), &config);
            if !report.is_clean() {
                eprintln!("Dropped {} malformed note(s)", report.skipped.len());
                if strict {
                    if let Err(e) = report.into_result() {
                        fail(&format!("Decoding error: {}", e));
                    }
                }
            }
            let events = array_to_performance(&arr, &config).note_events();
            match serde_json::to_string_pretty(&events) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(&format!("Error writing notes: {}", e)),
            }
        }
        _ => fail(USAGE),
    }
}
