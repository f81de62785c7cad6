//! This crate ships no rotating-file sink, but any `io::Write`, including a
//! plain `std::fs::File`, works as a destination. This exercises that path
//! against a real filesystem file instead of an in-memory buffer.

use std::fs::OpenOptions;
use std::io::Read;
use std::sync::Arc;

use signalstack::{Config, Ctx, Levels, LevelFilter, Logger, TextWriterConfig};

#[test]
fn text_sink_writes_committed_lines_to_a_real_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .expect("open log file");

    let writer = Arc::new(TextWriterConfig::new(file).with_colorizer(Box::new(signalstack::NoColor)));
    let cfg = Arc::new(Config::new(Arc::new(Levels::new()), LevelFilter::all(), vec![writer]));
    let logger = Logger::new(cfg);
    let ctx = Ctx::new();

    logger.info(&ctx, "first line").log();
    logger.warn(&ctx, "second line").log();

    let mut contents = String::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();

    assert!(contents.contains("first line"));
    assert!(contents.contains("second line"));
    assert_eq!(contents.lines().count(), 2);
}
